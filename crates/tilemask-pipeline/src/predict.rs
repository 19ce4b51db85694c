//! Predictor contract: fixed-input-size segmentation inference.
//!
//! This module defines the [`Predictor`] trait the stitcher and blender
//! call into, and the [`PredictorKind`] registry for selecting a
//! built-in reference predictor at configuration time.
//!
//! The trained network itself is a collaborator, not part of this
//! crate; any model can plug in by implementing [`Predictor`]. The
//! reference predictors exist so the full tiling/stitching/blending
//! engine can run end-to-end deterministically without model weights.

use image::{GrayImage, RgbaImage};

/// Canny thresholds used by the edge reference predictor.
const EDGE_CANNY_LOW: f32 = 50.0;
const EDGE_CANNY_HIGH: f32 = 150.0;

/// Raw single-channel confidence map produced by a predictor.
///
/// Values are per-pixel foreground confidences in `[0, 1]`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl RawMask {
    /// Construct a mask from raw row-major confidence values.
    ///
    /// Returns `None` if `data.len() != width * height`.
    #[must_use]
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        if data.len() == (width as usize) * (height as usize) {
            Some(Self {
                width,
                height,
                data,
            })
        } else {
            None
        }
    }

    /// Mask width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major confidence values.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// A fixed-input-size image segmentation predictor.
///
/// Implementations must be deterministic for a fixed input: the blender
/// relies on the whole-image pass and the tile passes being
/// reproducible. `Sync` is required because tiles are predicted from
/// parallel workers sharing one predictor reference.
pub trait Predictor: Sync {
    /// The fixed `(width, height)` the predictor accepts as input and
    /// emits as output.
    fn input_size(&self) -> (u32, u32);

    /// Number of output classes. Binarization is applied only to
    /// single-class masks; multi-class masks pass through unchanged.
    fn classes(&self) -> u32 {
        1
    }

    /// Run inference on an image already resized to [`input_size`].
    ///
    /// The returned mask must have exactly the input dimensions; the
    /// stitcher rejects any other shape with a `ShapeMismatch` error
    /// rather than silently reshaping.
    ///
    /// [`input_size`]: Predictor::input_size
    fn predict(&self, input: &RgbaImage) -> RawMask;
}

/// Selects which built-in reference predictor to use.
///
/// Resolved once at configuration-load time into a statically known
/// implementation — predictors are never looked up by name at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PredictorKind {
    /// Inverted luminance as foreground confidence: dark pixels score
    /// high. Useful for segmenting dark structures on light backgrounds.
    #[default]
    Luminance,
    /// Canny edge map as a hard 0/1 confidence: edge pixels are
    /// foreground.
    Edge,
}

impl PredictorKind {
    /// Build the predictor for a fixed input size.
    #[must_use]
    pub const fn build(self, width: u32, height: u32) -> ReferencePredictor {
        ReferencePredictor {
            kind: self,
            width,
            height,
        }
    }
}

/// A built-in deterministic predictor produced by [`PredictorKind::build`].
#[derive(Debug, Clone, Copy)]
pub struct ReferencePredictor {
    kind: PredictorKind,
    width: u32,
    height: u32,
}

impl Predictor for ReferencePredictor {
    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn predict(&self, input: &RgbaImage) -> RawMask {
        let gray = image::imageops::grayscale(input);
        let data = match self.kind {
            PredictorKind::Luminance => inverted_luminance(&gray),
            PredictorKind::Edge => edge_confidence(&gray),
        };
        Self::to_mask(&gray, data)
    }
}

impl ReferencePredictor {
    fn to_mask(gray: &GrayImage, data: Vec<f32>) -> RawMask {
        // data comes from a per-pixel map over gray, so the length
        // always matches; fall back to an all-background mask rather
        // than panicking if that ever changes.
        let (w, h) = gray.dimensions();
        RawMask::from_raw(w, h, data).unwrap_or_else(|| RawMask {
            width: w,
            height: h,
            data: vec![0.0; (w as usize) * (h as usize)],
        })
    }
}

/// Foreground confidence `1 - luma / 255` per pixel.
fn inverted_luminance(gray: &GrayImage) -> Vec<f32> {
    gray.pixels()
        .map(|p| 1.0 - f32::from(p.0[0]) / 255.0)
        .collect()
}

/// Hard 0/1 confidence from a Canny edge map.
fn edge_confidence(gray: &GrayImage) -> Vec<f32> {
    let edges = imageproc::edges::canny(gray, EDGE_CANNY_LOW, EDGE_CANNY_HIGH);
    edges
        .pixels()
        .map(|p| if p.0[0] > 0 { 1.0 } else { 0.0 })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn raw_mask_rejects_wrong_length() {
        assert!(RawMask::from_raw(4, 4, vec![0.0; 15]).is_none());
        assert!(RawMask::from_raw(4, 4, vec![0.0; 16]).is_some());
    }

    #[test]
    fn default_kind_is_luminance() {
        assert_eq!(PredictorKind::default(), PredictorKind::Luminance);
    }

    #[test]
    fn luminance_predictor_output_matches_input_size() {
        let predictor = PredictorKind::Luminance.build(16, 8);
        assert_eq!(predictor.input_size(), (16, 8));
        assert_eq!(predictor.classes(), 1);

        let input = RgbaImage::from_pixel(16, 8, image::Rgba([0, 0, 0, 255]));
        let mask = predictor.predict(&input);
        assert_eq!((mask.width(), mask.height()), (16, 8));
    }

    #[test]
    fn luminance_is_inverted() {
        let predictor = PredictorKind::Luminance.build(2, 1);
        let mut input = RgbaImage::new(2, 1);
        input.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
        input.put_pixel(1, 0, image::Rgba([255, 255, 255, 255]));

        let mask = predictor.predict(&input);
        assert!((mask.data()[0] - 1.0).abs() < 1e-6, "black is foreground");
        assert!(mask.data()[1].abs() < 1e-6, "white is background");
    }

    #[test]
    fn edge_predictor_emits_hard_confidences() {
        let predictor = PredictorKind::Edge.build(20, 20);
        let input = RgbaImage::from_fn(20, 20, |x, _| {
            if x < 10 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let mask = predictor.predict(&input);
        assert!(
            mask.data().iter().all(|&v| v == 0.0 || v == 1.0),
            "edge confidences must be exactly 0 or 1"
        );
        assert!(
            mask.data().iter().any(|&v| v == 1.0),
            "sharp boundary should produce edge pixels"
        );
    }

    #[test]
    fn predictors_are_deterministic() {
        let predictor = PredictorKind::Edge.build(16, 16);
        let input = RgbaImage::from_fn(16, 16, |x, y| {
            image::Rgba([(x * 16) as u8, (y * 16) as u8, 0, 255])
        });
        assert_eq!(predictor.predict(&input), predictor.predict(&input));
    }
}
