//! tilemask CLI - seam-free tiled segmentation inference over a
//! directory of images.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tilemask_io::RunConfig;
use tilemask_pipeline::{BlendConfig, PredictorKind, ResampleFilter};

/// Segment oversized images by overlapping tiled inference, blending
/// the tiled mosaic with a whole-image pass to suppress seam artifacts.
#[derive(Parser, Debug)]
#[command(name = "tilemask")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory of input images (.png, .jpg, .tif, .bmp).
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory receiving one mask per input image.
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Reference predictor to run.
    #[arg(long, value_enum, default_value = "luminance")]
    predictor: PredictorArg,

    /// Predictor input edge length in pixels (square input).
    #[arg(long, default_value_t = 256, value_name = "PIXELS")]
    input_size: u32,

    /// Tile edge length. Defaults to the predictor input size.
    #[arg(long, value_name = "PIXELS")]
    split_size: Option<u32>,

    /// Overlap margin added to each side of a tile crop for context,
    /// trimmed again before pasting.
    #[arg(long, default_value_t = 0, value_name = "PIXELS")]
    overlap: u32,

    /// Binarization threshold: mask values below become 0, values at
    /// or above become 255.
    #[arg(long, default_value_t = 60)]
    threshold: u8,

    /// Keep raw confidence values instead of thresholding to 0/255.
    #[arg(long)]
    no_binarize: bool,

    /// Keep the tiled mosaic verbatim instead of AND-ing it with the
    /// whole-image pass.
    #[arg(long)]
    no_bitwise_blend: bool,

    /// Canvas background fill value.
    #[arg(long, default_value_t = 0)]
    background: u8,

    /// Directory for merged mask-over-source visualizations.
    #[arg(long, value_name = "DIR")]
    merged_dir: Option<PathBuf>,

    /// Gaussian blur sigma applied to the source in merged
    /// visualizations.
    #[arg(long, value_name = "SIGMA")]
    blur: Option<f32>,

    /// Directory for per-tile debug artifacts
    /// (`{basename}/images/{row}x{col}.png` and `.../masks/...`).
    #[arg(long, value_name = "DIR")]
    debug_dir: Option<PathBuf>,
}

/// CLI-facing predictor selector, resolved once into a statically
/// known implementation.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PredictorArg {
    /// Inverted luminance as foreground confidence.
    Luminance,
    /// Canny edge map as a hard 0/1 confidence.
    Edge,
}

impl From<PredictorArg> for PredictorKind {
    fn from(arg: PredictorArg) -> Self {
        match arg {
            PredictorArg::Luminance => Self::Luminance,
            PredictorArg::Edge => Self::Edge,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let blend = BlendConfig {
        split_size: args.split_size.unwrap_or(0),
        overlap_margin: args.overlap,
        binarize: !args.no_binarize,
        threshold: args.threshold,
        bitwise_blend: !args.no_bitwise_blend,
        background: args.background,
        resample: ResampleFilter::default(),
    };
    let predictor = PredictorKind::from(args.predictor).build(args.input_size, args.input_size);

    let cfg = RunConfig {
        input_dir: args.input_dir,
        output_dir: args.output_dir,
        merged_dir: args.merged_dir,
        debug_dir: args.debug_dir,
        blur_sigma: args.blur,
        blend,
    };

    let summary = tilemask_io::run(&cfg, &predictor)
        .with_context(|| format!("inference run over {} failed", cfg.input_dir.display()))?;

    tracing::info!(
        processed = summary.processed,
        skipped = summary.skipped,
        "tilemask finished"
    );
    Ok(())
}
