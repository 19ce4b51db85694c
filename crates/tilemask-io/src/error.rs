//! Error types for filesystem-facing operations.

use std::path::PathBuf;

use thiserror::Error;

use tilemask_pipeline::PipelineError;

/// Errors surfaced by the I/O shell.
///
/// `MissingInput` and `ImageLoad` indicate setup problems and are
/// fatal for the whole run; `ShapeMismatch` (carried inside
/// [`Pipeline`](Self::Pipeline)) is handled per-image by the runner.
#[derive(Debug, Error)]
pub enum IoError {
    /// The input directory is missing or unreadable.
    #[error("input directory {path} is missing or unreadable: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input image file could not be read or decoded.
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// An output directory or file could not be created or written.
    #[error("failed to write output {path}: {source}")]
    OutputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output image could not be encoded.
    #[error("failed to save image {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A failure inside the inference pipeline.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_display_includes_path() {
        let err = IoError::MissingInput {
            path: PathBuf::from("/nope"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn pipeline_errors_convert_transparently() {
        let err: IoError = PipelineError::InvalidConfig("split_size must be positive".into()).into();
        assert_eq!(
            err.to_string(),
            "invalid pipeline configuration: split_size must be positive",
        );
    }
}
