//! Tile stitching: per-tile inference and canvas assembly.
//!
//! Drives crop → resize → predict → resize-back → margin-trim → paste
//! for every tile of a planned grid. Tiles are predicted in parallel;
//! because the planner guarantees disjoint paste boxes, the trimmed
//! results are applied to the exclusively-owned canvas as direct
//! overwrites with no blending.

use image::{GrayImage, Luma, RgbaImage, imageops};
use rayon::prelude::*;

use crate::mask::{self, DEFAULT_SCALE};
use crate::predict::Predictor;
use crate::types::{BlendConfig, PipelineError, TileSpec};

/// Per-tile debug artifacts offered to a [`TileSink`]: the model-sized
/// input crop and the untrimmed predicted mask at the same resolution.
#[derive(Debug)]
pub struct TileArtifact<'a> {
    /// Grid row index.
    pub row: u32,
    /// Grid column index.
    pub col: u32,
    /// The tile crop, resized to the predictor input size.
    pub input: &'a RgbaImage,
    /// The normalized mask at predictor input resolution, before the
    /// resize-back and margin trim.
    pub mask: &'a GrayImage,
}

/// Observer for per-tile debug artifacts.
///
/// Purely observational: recording happens before trimming and has no
/// effect on the canvas. Implementations live outside this crate (the
/// filesystem sink is in `tilemask-io`) so the core stays sans-IO.
/// `Sync` because tiles are recorded from parallel workers.
pub trait TileSink: Sync {
    /// Record one tile's artifacts.
    ///
    /// # Errors
    ///
    /// Any error is surfaced as [`PipelineError::Sink`] and aborts the
    /// image's inference.
    fn record(&self, artifact: &TileArtifact<'_>)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Run per-tile inference and assemble the full-resolution canvas.
///
/// The canvas starts filled with `cfg.background` and receives each
/// tile's trimmed mask at its paste position. Tile order in the output
/// is deterministic regardless of parallel scheduling.
///
/// # Errors
///
/// Returns [`PipelineError::ShapeMismatch`] if the predictor emits a
/// mask whose dimensions disagree with its fixed input size; the whole
/// image fails rather than leaving a partially filled canvas. Sink
/// failures surface as [`PipelineError::Sink`].
pub fn stitch<P: Predictor>(
    image: &RgbaImage,
    specs: &[TileSpec],
    predictor: &P,
    cfg: &BlendConfig,
    sink: Option<&dyn TileSink>,
) -> Result<GrayImage, PipelineError> {
    let mut canvas = GrayImage::from_pixel(image.width(), image.height(), Luma([cfg.background]));

    // Predict all tiles in parallel, then paste sequentially. Paste
    // boxes are disjoint, so ordering only matters for determinism of
    // the traversal, which collect() preserves.
    let trimmed: Vec<(TileSpec, GrayImage)> = specs
        .par_iter()
        .map(|spec| predict_tile(image, *spec, predictor, cfg, sink).map(|m| (*spec, m)))
        .collect::<Result<_, _>>()?;

    for (spec, tile_mask) in trimmed {
        imageops::replace(
            &mut canvas,
            &tile_mask,
            i64::from(spec.paste.left),
            i64::from(spec.paste.top),
        );
    }
    Ok(canvas)
}

/// Produce one tile's trimmed mask at paste-box resolution.
fn predict_tile<P: Predictor>(
    image: &RgbaImage,
    spec: TileSpec,
    predictor: &P,
    cfg: &BlendConfig,
    sink: Option<&dyn TileSink>,
) -> Result<GrayImage, PipelineError> {
    let (input_w, input_h) = predictor.input_size();
    let filter = cfg.resample.to_image_filter();

    let crop = imageops::crop_imm(
        image,
        spec.crop.left,
        spec.crop.top,
        spec.crop.width(),
        spec.crop.height(),
    )
    .to_image();
    let resized = imageops::resize(&crop, input_w, input_h, filter);

    let raw = predictor.predict(&resized);
    if (raw.width(), raw.height()) != (input_w, input_h) {
        return Err(PipelineError::ShapeMismatch {
            expected_width: input_w,
            expected_height: input_h,
            actual_width: raw.width(),
            actual_height: raw.height(),
        });
    }
    let tile_mask = mask::normalize(&raw, DEFAULT_SCALE);

    if let Some(sink) = sink {
        sink.record(&TileArtifact {
            row: spec.row,
            col: spec.col,
            input: &resized,
            mask: &tile_mask,
        })
        .map_err(PipelineError::Sink)?;
    }

    // Resize back to the crop's pixel dimensions, then drop the margins.
    let full = imageops::resize(&tile_mask, spec.crop.width(), spec.crop.height(), filter);
    let trimmed = imageops::crop_imm(
        &full,
        spec.trim.left,
        spec.trim.top,
        spec.trim.width(),
        spec.trim.height(),
    )
    .to_image();
    Ok(trimmed)
}
