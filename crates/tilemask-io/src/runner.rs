//! Per-directory inference runner.
//!
//! Drives one inference pass per input image: load, infer, write the
//! mask, optionally write the merged visualization and per-tile debug
//! artifacts. Passes are independent; a predictor shape mismatch skips
//! that image with a diagnostic while the run continues, whereas setup
//! and output errors abort the whole run.

use std::path::PathBuf;

use tracing::{info, warn};

use tilemask_pipeline::{
    BlendConfig, PipelineError, Predictor, TileSink, compose, infer,
};

use crate::error::IoError;
use crate::output::{self, FsTileSink};
use crate::sources;

/// Configuration for one run over an input directory.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory enumerated for input images.
    pub input_dir: PathBuf,
    /// Directory receiving one mask per input image.
    pub output_dir: PathBuf,
    /// When set, receives merged mask-over-source visualizations.
    /// Recreated from scratch each run.
    pub merged_dir: Option<PathBuf>,
    /// When set, receives per-tile debug artifacts. Recreated from
    /// scratch each run.
    pub debug_dir: Option<PathBuf>,
    /// Gaussian blur sigma applied to the source in merged
    /// visualizations; `None` or non-positive disables the blur.
    pub blur_sigma: Option<f32>,
    /// Tiling and blending parameters.
    pub blend: BlendConfig,
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Images inferred and written.
    pub processed: usize,
    /// Images skipped after a predictor shape mismatch.
    pub skipped: usize,
}

/// Run tiled inference over every image in the input directory.
///
/// # Errors
///
/// Returns [`IoError::MissingInput`] / [`IoError::ImageLoad`] for
/// unreadable inputs, [`IoError::OutputIo`] / [`IoError::ImageSave`]
/// for output failures, and [`IoError::Pipeline`] for configuration
/// errors — all fatal for the run. A per-image `ShapeMismatch` is
/// logged and counted in [`RunSummary::skipped`] instead.
pub fn run<P: Predictor>(cfg: &RunConfig, predictor: &P) -> Result<RunSummary, IoError> {
    let images = sources::list_images(&cfg.input_dir)?;
    if images.is_empty() {
        warn!(input = %cfg.input_dir.display(), "no input images found");
    }

    output::ensure_dir(&cfg.output_dir)?;
    if let Some(dir) = &cfg.merged_dir {
        output::prepare_dir(dir)?;
    }
    if let Some(dir) = &cfg.debug_dir {
        output::prepare_dir(dir)?;
    }

    let mut processed = 0;
    let mut skipped = 0;
    for path in &images {
        let image = sources::load_image(path)?;
        info!(
            input = %path.display(),
            width = image.width(),
            height = image.height(),
            "running tiled inference"
        );

        let sink = match &cfg.debug_dir {
            Some(root) => Some(FsTileSink::create(root, path)?),
            None => None,
        };
        let sink_ref = sink.as_ref().map(|s| s as &dyn TileSink);

        let mask = match infer(&image, predictor, &cfg.blend, sink_ref) {
            Ok(mask) => mask,
            Err(err @ PipelineError::ShapeMismatch { .. }) => {
                // One malformed prediction must not corrupt this
                // image's canvas nor abort unrelated images.
                warn!(input = %path.display(), error = %err, "skipping image");
                skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let written = output::save_mask(&mask, &cfg.output_dir, path)?;
        info!(output = %written.display(), "wrote mask");

        if let Some(dir) = &cfg.merged_dir {
            let merged = compose::merge_overlay(&image, &mask, cfg.blur_sigma);
            let written = output::save_merged(&merged, dir, path)?;
            info!(output = %written.display(), "wrote merged visualization");
        }
        processed += 1;
    }

    info!(processed, skipped, "run complete");
    Ok(RunSummary { processed, skipped })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tilemask_pipeline::{PredictorKind, RawMask, RgbaImage};

    fn write_test_image(dir: &std::path::Path, name: &str, width: u32, height: u32) {
        // Dark square on a light background.
        let img = RgbaImage::from_fn(width, height, |x, y| {
            if x < width / 2 && y < height / 2 {
                image::Rgba([10, 10, 10, 255])
            } else {
                image::Rgba([245, 245, 245, 255])
            }
        });
        img.save(dir.join(name)).unwrap();
    }

    fn base_config(input: &std::path::Path, output: &std::path::Path) -> RunConfig {
        RunConfig {
            input_dir: input.to_path_buf(),
            output_dir: output.to_path_buf(),
            merged_dir: None,
            debug_dir: None,
            blur_sigma: None,
            blend: BlendConfig::default(),
        }
    }

    #[test]
    fn processes_every_input_image() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        let output = root.path().join("out");
        std::fs::create_dir(&input).unwrap();
        write_test_image(&input, "a.png", 40, 30);
        write_test_image(&input, "b.png", 24, 24);
        std::fs::write(input.join("ignored.txt"), b"x").unwrap();

        let predictor = PredictorKind::Luminance.build(16, 16);
        let summary = run(&base_config(&input, &output), &predictor).unwrap();

        assert_eq!(
            summary,
            RunSummary {
                processed: 2,
                skipped: 0
            }
        );
        assert!(output.join("a.png").is_file());
        assert!(output.join("b.png").is_file());
    }

    #[test]
    fn missing_input_directory_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let cfg = base_config(&root.path().join("absent"), &root.path().join("out"));
        let predictor = PredictorKind::Luminance.build(16, 16);
        assert!(matches!(
            run(&cfg, &predictor),
            Err(IoError::MissingInput { .. })
        ));
    }

    #[test]
    fn corrupt_image_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("bad.png"), b"not a png").unwrap();

        let cfg = base_config(&input, &root.path().join("out"));
        let predictor = PredictorKind::Luminance.build(16, 16);
        assert!(matches!(
            run(&cfg, &predictor),
            Err(IoError::ImageLoad { .. })
        ));
    }

    #[test]
    fn shape_mismatch_skips_image_and_continues() {
        struct Broken;
        impl Predictor for Broken {
            fn input_size(&self) -> (u32, u32) {
                (16, 16)
            }
            fn predict(&self, _input: &RgbaImage) -> RawMask {
                RawMask::from_raw(8, 8, vec![0.0; 64]).unwrap()
            }
        }

        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        let output = root.path().join("out");
        std::fs::create_dir(&input).unwrap();
        write_test_image(&input, "a.png", 32, 32);
        write_test_image(&input, "b.png", 32, 32);

        let summary = run(&base_config(&input, &output), &Broken).unwrap();
        assert_eq!(
            summary,
            RunSummary {
                processed: 0,
                skipped: 2
            }
        );
        // No partially assembled canvas may be written.
        assert!(!output.join("a.png").exists());
        assert!(!output.join("b.png").exists());
    }

    #[test]
    fn merged_and_debug_outputs_are_written() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        let output = root.path().join("out");
        let merged = root.path().join("merged");
        let debug = root.path().join("debug");
        std::fs::create_dir(&input).unwrap();
        write_test_image(&input, "a.png", 40, 24);

        let cfg = RunConfig {
            merged_dir: Some(merged.clone()),
            debug_dir: Some(debug.clone()),
            blur_sigma: Some(1.0),
            ..base_config(&input, &output)
        };
        let predictor = PredictorKind::Luminance.build(16, 16);
        let summary = run(&cfg, &predictor).unwrap();

        assert_eq!(summary.processed, 1);
        assert!(merged.join("a.png").is_file());
        // 40x24 at split 16: 3 columns, 2 rows of debug tiles.
        assert!(debug.join("a.png/images/0x0.png").is_file());
        assert!(debug.join("a.png/images/1x2.png").is_file());
        assert!(debug.join("a.png/masks/1x2.png").is_file());
    }

    #[test]
    fn stale_merged_outputs_are_discarded() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        let merged = root.path().join("merged");
        std::fs::create_dir(&input).unwrap();
        std::fs::create_dir(&merged).unwrap();
        std::fs::write(merged.join("stale.png"), b"old").unwrap();
        write_test_image(&input, "a.png", 20, 20);

        let cfg = RunConfig {
            merged_dir: Some(merged.clone()),
            ..base_config(&input, &root.path().join("out"))
        };
        let predictor = PredictorKind::Luminance.build(16, 16);
        run(&cfg, &predictor).unwrap();

        assert!(!merged.join("stale.png").exists());
        assert!(merged.join("a.png").is_file());
    }
}
