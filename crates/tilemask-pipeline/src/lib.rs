//! tilemask-pipeline: Pure tiled segmentation inference (sans-IO).
//!
//! Decomposes an oversized image into overlapping fixed-size tiles,
//! runs a size-constrained predictor on each tile and on the whole
//! downsized image, and reassembles the per-tile outputs into a
//! full-resolution mask without seam artifacts:
//! plan grid -> per-tile crop/resize/predict/trim/paste ->
//! whole-image pass -> bitwise reconciliation.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! pixel buffers and a caller-supplied [`Predictor`]. All filesystem
//! interaction lives in `tilemask-io`.

pub mod blend;
pub mod compose;
pub mod geometry;
pub mod mask;
pub mod predict;
pub mod stitch;
pub mod types;

pub use predict::{Predictor, PredictorKind, RawMask, ReferencePredictor};
pub use stitch::{TileArtifact, TileSink};
pub use types::{
    BlendConfig, GrayImage, Margins, PipelineError, PixelBox, ResampleFilter, RgbaImage, TileSpec,
};

/// Run one full tiled inference pass over an image.
///
/// # Pipeline steps
///
/// 1. Resolve the tile edge length (`split_size`, defaulting to the
///    predictor input width) and plan the tile grid
/// 2. Concurrently: predict the whole downsized image, and stitch the
///    per-tile predictions into a full-resolution canvas
/// 3. Reconcile the two masks (bitwise AND + binarization, or the
///    tiled mosaic verbatim)
///
/// The whole-image pass and the tile set are joined before
/// reconciliation; a failure on any tile fails the whole image, since
/// a partially filled canvas must never be produced.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the predictor reports a
/// zero input dimension or the resolved split size is zero.
/// Returns [`PipelineError::ShapeMismatch`] if any prediction's
/// dimensions disagree with the fixed input size.
/// Returns [`PipelineError::Sink`] if a debug sink fails to record.
pub fn infer<P: Predictor>(
    image: &RgbaImage,
    predictor: &P,
    cfg: &BlendConfig,
    sink: Option<&dyn TileSink>,
) -> Result<GrayImage, PipelineError> {
    let (input_w, input_h) = predictor.input_size();
    if input_w == 0 || input_h == 0 {
        return Err(PipelineError::InvalidConfig(format!(
            "predictor input size must be positive, got {input_w}x{input_h}"
        )));
    }

    let split_size = cfg.resolved_split_size(input_w);
    let specs = geometry::plan_grid(image.width(), image.height(), split_size, cfg.overlap_margin)?;

    let (whole, canvas) = rayon::join(
        || blend::whole_image_mask(image, predictor, cfg),
        || stitch::stitch(image, &specs, predictor, cfg, sink),
    );

    Ok(blend::reconcile(&whole?, canvas?, cfg, predictor.classes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ResampleFilter;

    /// Predictor marking the darker half of its input as foreground.
    struct DarkHalfPredictor {
        size: u32,
    }

    impl Predictor for DarkHalfPredictor {
        fn input_size(&self) -> (u32, u32) {
            (self.size, self.size)
        }

        fn predict(&self, input: &RgbaImage) -> RawMask {
            let gray = image::imageops::grayscale(input);
            let data = gray
                .pixels()
                .map(|p| if p.0[0] < 128 { 1.0 } else { 0.0 })
                .collect();
            RawMask::from_raw(gray.width(), gray.height(), data).unwrap()
        }
    }

    fn nearest_cfg() -> BlendConfig {
        BlendConfig {
            resample: ResampleFilter::Nearest,
            ..BlendConfig::default()
        }
    }

    #[test]
    fn zero_input_size_is_invalid_config() {
        struct Degenerate;
        impl Predictor for Degenerate {
            fn input_size(&self) -> (u32, u32) {
                (0, 0)
            }
            fn predict(&self, _input: &RgbaImage) -> RawMask {
                RawMask::from_raw(0, 0, vec![]).unwrap()
            }
        }
        let image = RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 255]));
        let result = infer(&image, &Degenerate, &nearest_cfg(), None);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn output_matches_source_dimensions() {
        let image = RgbaImage::from_pixel(50, 30, image::Rgba([0, 0, 0, 255]));
        let predictor = DarkHalfPredictor { size: 16 };
        let out = infer(&image, &predictor, &nearest_cfg(), None).unwrap();
        assert_eq!(out.dimensions(), (50, 30));
    }

    #[test]
    fn dark_region_is_segmented_across_tiles() {
        // Left half dark, right half light; tile grid cuts through
        // both regions. Both passes agree, so the AND keeps the dark
        // half as foreground.
        let image = RgbaImage::from_fn(64, 32, |x, _| {
            if x < 32 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let predictor = DarkHalfPredictor { size: 16 };
        let out = infer(&image, &predictor, &nearest_cfg(), None).unwrap();

        assert_eq!(out.get_pixel(5, 5).0[0], 255);
        assert_eq!(out.get_pixel(30, 16).0[0], 255);
        assert_eq!(out.get_pixel(40, 5).0[0], 0);
        assert_eq!(out.get_pixel(63, 31).0[0], 0);
    }

    #[test]
    fn binarized_output_is_two_valued() {
        let image = RgbaImage::from_fn(40, 40, |x, y| {
            let v = ((x * 13 + y * 29) % 256) as u8;
            image::Rgba([v, v, v, 255])
        });
        let predictor = DarkHalfPredictor { size: 8 };
        let out = infer(&image, &predictor, &nearest_cfg(), None).unwrap();
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
