//! Shared types for the tiled segmentation pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference mask
/// buffers without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference decoded
/// source images without depending on `image` directly.
pub use image::RgbaImage;

/// Default binarization threshold (confidence byte).
pub const DEFAULT_THRESHOLD: u8 = 60;

/// An axis-aligned pixel rectangle, half-open: `[left, right) x [top, bottom)`.
///
/// Invariant: `left <= right` and `top <= bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    /// Inclusive left edge.
    pub left: u32,
    /// Inclusive top edge.
    pub top: u32,
    /// Exclusive right edge.
    pub right: u32,
    /// Exclusive bottom edge.
    pub bottom: u32,
}

impl PixelBox {
    /// Create a new box.
    #[must_use]
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width of the box in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Height of the box in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Returns `true` if the box covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.left == self.right || self.top == self.bottom
    }

    /// Returns `true` if the pixel `(x, y)` lies inside the box.
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Returns `true` if the two boxes share at least one pixel.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// Overlap margins actually applied to one tile, after clipping at
/// image edges. A side touching the image border gets margin `0`;
/// clipping one side never enlarges another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// One tile of the inference grid.
///
/// Produced by [`crate::geometry::plan_grid`] in row-major order. The
/// `paste` boxes of all tiles from one plan tile the source image
/// exactly: no gaps, no overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    /// Grid row index.
    pub row: u32,
    /// Grid column index.
    pub col: u32,
    /// Crop rectangle in source-image coordinates, margins included,
    /// clipped to the image bounds.
    pub crop: PixelBox,
    /// Margins actually applied to `crop` (edge-clipped).
    pub margins: Margins,
    /// Margin-free interior of the predicted mask, in crop-local
    /// coordinates. Applied after the mask is resized back to the
    /// crop's pixel dimensions.
    pub trim: PixelBox,
    /// Destination of the trimmed mask on the canvas, in source-image
    /// coordinates. Same dimensions as `trim`.
    pub paste: PixelBox,
}

/// Resampling filter used when resizing crops to the predictor input
/// size and masks back to crop size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResampleFilter {
    /// Nearest-neighbor: fastest, blocky artifacts. Identity for
    /// same-size resizes.
    Nearest,
    /// Bilinear interpolation: fast, decent quality.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom): moderate speed, good quality.
    CatmullRom,
    /// Lanczos with 3 lobes: slowest, sharpest.
    Lanczos3,
}

impl ResampleFilter {
    /// Convert to the `image` crate's `FilterType`.
    #[must_use]
    pub const fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            Self::Nearest => image::imageops::FilterType::Nearest,
            Self::Triangle => image::imageops::FilterType::Triangle,
            Self::CatmullRom => image::imageops::FilterType::CatmullRom,
            Self::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Configuration for one tiled inference pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendConfig {
    /// Tile edge length in pixels. `0` means "use the predictor's
    /// input width", resolved once per inference call.
    pub split_size: u32,

    /// Extra context pixels added to each side of a tile crop before
    /// prediction and trimmed afterwards. Clipped independently per
    /// side at image edges.
    pub overlap_margin: u32,

    /// Whether to threshold masks into strict 0/255 foreground maps.
    /// Only meaningful for single-class predictors.
    pub binarize: bool,

    /// Binarization threshold: values below become 0, values at or
    /// above become 255.
    pub threshold: u8,

    /// Whether to reconcile the whole-image mask and the tiled mosaic
    /// with a bitwise AND. When `false`, the mosaic stands verbatim.
    pub bitwise_blend: bool,

    /// Canvas fill value for regions before any tile is pasted.
    pub background: u8,

    /// Resampling filter for crop/mask resizes.
    pub resample: ResampleFilter,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            split_size: 0,
            overlap_margin: 0,
            binarize: true,
            threshold: DEFAULT_THRESHOLD,
            bitwise_blend: true,
            background: 0,
            resample: ResampleFilter::default(),
        }
    }
}

impl BlendConfig {
    /// The tile edge length to use for a predictor with the given
    /// input width: the configured `split_size`, or the input width
    /// when `split_size` is 0.
    #[must_use]
    pub const fn resolved_split_size(&self, input_width: u32) -> u32 {
        if self.split_size == 0 {
            input_width
        } else {
            self.split_size
        }
    }
}

/// Errors that can occur inside the inference pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The predictor returned a mask whose dimensions disagree with
    /// the fixed input size it was given. Never silently reshaped.
    #[error(
        "predictor returned a {actual_width}x{actual_height} mask, \
         expected {expected_width}x{expected_height}"
    )]
    ShapeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// A debug-artifact sink failed to record a tile.
    #[error("failed to record tile debug artifact: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}
