//! Output directory management, mask persistence, and the filesystem
//! debug sink.
//!
//! Output masks keep the basename of their source image. Merged and
//! debug directories use remove-then-recreate semantics: an existing
//! directory from an earlier run is discarded, and a concurrent
//! "already exists" is benign, never an error.

use std::path::{Path, PathBuf};

use tilemask_pipeline::{GrayImage, RgbaImage, TileArtifact, TileSink};

use crate::error::IoError;

/// Remove `dir` if present, then create it (and any missing parents).
///
/// # Errors
///
/// Returns [`IoError::OutputIo`] if removal or creation fails for any
/// reason other than the directory already being absent or present.
pub fn prepare_dir(dir: &Path) -> Result<(), IoError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(IoError::OutputIo {
                path: dir.to_path_buf(),
                source,
            });
        }
    }
    std::fs::create_dir_all(dir).map_err(|source| IoError::OutputIo {
        path: dir.to_path_buf(),
        source,
    })
}

/// Create `dir` and any missing parents, keeping existing contents.
///
/// # Errors
///
/// Returns [`IoError::OutputIo`] on failure.
pub fn ensure_dir(dir: &Path) -> Result<(), IoError> {
    std::fs::create_dir_all(dir).map_err(|source| IoError::OutputIo {
        path: dir.to_path_buf(),
        source,
    })
}

/// Save a mask under `dir`, named after the source image's basename.
///
/// Returns the path written.
///
/// # Errors
///
/// Returns [`IoError::ImageSave`] if encoding or writing fails, and
/// [`IoError::OutputIo`] if the source path has no file name.
pub fn save_mask(mask: &GrayImage, dir: &Path, source: &Path) -> Result<PathBuf, IoError> {
    let path = dir.join(basename(source)?);
    mask.save(&path).map_err(|source| IoError::ImageSave {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Save a merged visualization under `dir`, named after the source
/// image's basename.
///
/// # Errors
///
/// Returns [`IoError::ImageSave`] if encoding or writing fails, and
/// [`IoError::OutputIo`] if the source path has no file name.
pub fn save_merged(merged: &RgbaImage, dir: &Path, source: &Path) -> Result<PathBuf, IoError> {
    let path = dir.join(basename(source)?);
    merged.save(&path).map_err(|source| IoError::ImageSave {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn basename(source: &Path) -> Result<&std::ffi::OsStr, IoError> {
    source.file_name().ok_or_else(|| IoError::OutputIo {
        path: source.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name"),
    })
}

/// Filesystem [`TileSink`] writing per-tile debug artifacts.
///
/// Layout, keyed by grid position:
///
/// ```text
/// {debug_root}/{image basename}/images/{row}x{col}.png
/// {debug_root}/{image basename}/masks/{row}x{col}.png
/// ```
#[derive(Debug)]
pub struct FsTileSink {
    images_dir: PathBuf,
    masks_dir: PathBuf,
}

impl FsTileSink {
    /// Create the debug directories for one image, discarding any
    /// artifacts from an earlier run.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputIo`] if the directories cannot be
    /// created.
    pub fn create(debug_root: &Path, source: &Path) -> Result<Self, IoError> {
        let image_root = debug_root.join(basename(source)?);
        let images_dir = image_root.join("images");
        let masks_dir = image_root.join("masks");
        prepare_dir(&images_dir)?;
        prepare_dir(&masks_dir)?;
        Ok(Self {
            images_dir,
            masks_dir,
        })
    }
}

impl TileSink for FsTileSink {
    fn record(
        &self,
        artifact: &TileArtifact<'_>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let name = format!("{}x{}.png", artifact.row, artifact.col);
        artifact.input.save(self.images_dir.join(&name))?;
        artifact.mask.save(self.masks_dir.join(&name))?;
        Ok(())
    }
}
