//! Tile grid planning: crop, trim, and paste geometry for one image.
//!
//! Splits a `width x height` image into a row-major grid of
//! `split_size`-edged tiles, each optionally enlarged by an overlap
//! margin for prediction context. Margins are clipped independently per
//! side at image edges and never redistributed: an edge tile simply
//! gets no margin on the clipped side.
//!
//! The trimmed paste boxes of the returned [`TileSpec`]s tile the image
//! exactly — no gaps, no overlaps — which is what lets the stitcher
//! paste results without blending.

use crate::types::{Margins, PipelineError, PixelBox, TileSpec};

/// Compute the tile grid for an image.
///
/// Tiles are emitted row-major. A degenerate final row or column whose
/// base box starts at or beyond the image edge (possible only for
/// zero-sized images, given ceiling division) is dropped rather than
/// clamped, so no zero-area prediction is ever requested.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `split_size` is zero.
pub fn plan_grid(
    width: u32,
    height: u32,
    split_size: u32,
    overlap_margin: u32,
) -> Result<Vec<TileSpec>, PipelineError> {
    if split_size == 0 {
        return Err(PipelineError::InvalidConfig(
            "split_size must be positive".to_string(),
        ));
    }

    let rows = height.div_ceil(split_size);
    let cols = width.div_ceil(split_size);

    let mut specs = Vec::with_capacity((rows as usize) * (cols as usize));
    for row in 0..rows {
        for col in 0..cols {
            let left = col * split_size;
            let top = row * split_size;
            if left >= width || top >= height {
                continue;
            }
            let right = left + split_size;
            let bottom = top + split_size;

            // A margin is dropped entirely on any side where it would
            // cross the image border; it is never shrunk or shifted.
            let margins = Margins {
                left: if left >= overlap_margin {
                    overlap_margin
                } else {
                    0
                },
                top: if top >= overlap_margin {
                    overlap_margin
                } else {
                    0
                },
                right: if right + overlap_margin <= width {
                    overlap_margin
                } else {
                    0
                },
                bottom: if bottom + overlap_margin <= height {
                    overlap_margin
                } else {
                    0
                },
            };

            // The final row/column base box may itself extend past the
            // image; clip the crop to the image bounds.
            let crop = PixelBox::new(
                left - margins.left,
                top - margins.top,
                (right + margins.right).min(width),
                (bottom + margins.bottom).min(height),
            );

            // Margin-free interior in crop-local coordinates. The min
            // handles crops clipped smaller than split_size + margin.
            let trim = PixelBox::new(
                margins.left,
                margins.top,
                (margins.left + split_size).min(crop.width()),
                (margins.top + split_size).min(crop.height()),
            );

            let paste = PixelBox::new(left, top, left + trim.width(), top + trim.height());

            specs.push(TileSpec {
                row,
                col,
                crop,
                margins,
                trim,
                paste,
            });
        }
    }
    Ok(specs)
}
