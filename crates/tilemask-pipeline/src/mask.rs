//! Mask normalization, binarization, and bitwise reconciliation.
//!
//! Converts raw predictor confidences into 8-bit single-channel masks
//! and applies the strict foreground/background threshold. The bitwise
//! AND is the agreement rule the blender uses to reconcile the
//! whole-image pass with the tiled mosaic.

use image::{GrayImage, Luma};

use crate::predict::RawMask;

/// Scale factor mapping `[0, 1]` confidences to mask bytes.
pub const DEFAULT_SCALE: f32 = 255.0;

/// Convert a raw confidence map into an 8-bit mask.
///
/// Each confidence is multiplied by `scale` and truncated to `u8`,
/// clamped to `[0, 255]` so out-of-range predictor output cannot wrap.
#[must_use = "returns the normalized mask"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn normalize(raw: &RawMask, scale: f32) -> GrayImage {
    let data = raw
        .data()
        .iter()
        .map(|&v| (v * scale).clamp(0.0, 255.0) as u8)
        .collect();
    // Length is width * height by RawMask construction.
    GrayImage::from_raw(raw.width(), raw.height(), data)
        .unwrap_or_else(|| GrayImage::new(raw.width(), raw.height()))
}

/// Threshold a mask into a strict foreground/background map.
///
/// Every value below `threshold` becomes 0, every value at or above it
/// becomes 255. Idempotent for any threshold in `(0, 255]`.
#[must_use = "returns the binarized mask"]
pub fn binarize(mask: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get_pixel(x, y).0[0] < threshold {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// Per-pixel bitwise AND of two same-sized masks.
///
/// On binarized 0/255 masks this is the agreement rule: a pixel stays
/// foreground only if both inputs mark it foreground.
#[must_use = "returns the combined mask"]
pub fn bitwise_and(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y).0[0] & b.get_pixel(x, y).0[0]])
    })
}
