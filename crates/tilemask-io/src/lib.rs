//! tilemask-io: filesystem shell for the tiled inference pipeline.
//!
//! Enumerates input images, feeds them through `tilemask-pipeline`,
//! and persists masks, merged visualizations, and per-tile debug
//! artifacts. All filesystem knowledge lives here; the pipeline crate
//! stays sans-IO.

pub mod error;
pub mod output;
pub mod runner;
pub mod sources;

pub use error::IoError;
pub use output::FsTileSink;
pub use runner::{RunConfig, RunSummary, run};
pub use sources::IMAGE_EXTENSIONS;
