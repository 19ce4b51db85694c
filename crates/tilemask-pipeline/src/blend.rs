//! Whole-image prediction and reconciliation with the tiled mosaic.
//!
//! The whole-image pass sees global context but loses fine detail from
//! downsizing; the tiled pass preserves detail but can show per-tile
//! boundary noise. Intersecting the two binarized masks keeps only
//! foreground both passes agree on, filtering tile-boundary false
//! positives without reintroducing the whole pass's low resolution.

use image::{GrayImage, RgbaImage, imageops};

use crate::mask::{self, DEFAULT_SCALE};
use crate::predict::Predictor;
use crate::types::{BlendConfig, PipelineError};

/// Predict a mask for the entire image in one pass.
///
/// Resizes the image to the predictor's fixed input size, predicts
/// once, normalizes (and binarizes, when configured and single-class),
/// then resizes the mask back to the image's full resolution.
///
/// # Errors
///
/// Returns [`PipelineError::ShapeMismatch`] if the predictor output
/// dimensions disagree with its fixed input size.
pub fn whole_image_mask<P: Predictor>(
    image: &RgbaImage,
    predictor: &P,
    cfg: &BlendConfig,
) -> Result<GrayImage, PipelineError> {
    let (input_w, input_h) = predictor.input_size();
    let filter = cfg.resample.to_image_filter();

    let resized = imageops::resize(image, input_w, input_h, filter);
    let raw = predictor.predict(&resized);
    if (raw.width(), raw.height()) != (input_w, input_h) {
        return Err(PipelineError::ShapeMismatch {
            expected_width: input_w,
            expected_height: input_h,
            actual_width: raw.width(),
            actual_height: raw.height(),
        });
    }

    let whole = mask::normalize(&raw, DEFAULT_SCALE);
    let whole = gated_binarize(&whole, cfg, predictor.classes());
    Ok(imageops::resize(
        &whole,
        image.width(),
        image.height(),
        filter,
    ))
}

/// Reconcile the whole-image mask with the tiled canvas.
///
/// With `bitwise_blend` set, a pixel survives as foreground only if
/// both passes agree (bitwise AND, then the configured binarization).
/// Otherwise the tiled mosaic stands verbatim. Both masks must share
/// dimensions; the orchestrator guarantees this.
#[must_use = "returns the reconciled mask"]
pub fn reconcile(
    whole: &GrayImage,
    canvas: GrayImage,
    cfg: &BlendConfig,
    classes: u32,
) -> GrayImage {
    if cfg.bitwise_blend {
        let agreed = mask::bitwise_and(whole, &canvas);
        gated_binarize(&agreed, cfg, classes)
    } else {
        canvas
    }
}

/// Binarize only when configured and the predictor is single-class;
/// multi-class masks pass through unchanged (per-class argmax is a
/// model concern, not a stitching concern).
fn gated_binarize(mask_image: &GrayImage, cfg: &BlendConfig, classes: u32) -> GrayImage {
    if cfg.binarize && classes == 1 {
        mask::binarize(mask_image, cfg.threshold)
    } else {
        mask_image.clone()
    }
}
