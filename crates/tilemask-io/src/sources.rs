//! Input enumeration and image decoding.
//!
//! Enumerates segmentation inputs from a directory by extension and
//! decodes them to RGBA for the pipeline. Enumeration order is sorted
//! so runs are deterministic regardless of directory iteration order.

use std::path::{Path, PathBuf};

use tilemask_pipeline::RgbaImage;

use crate::error::IoError;

/// File extensions treated as input images (case-insensitive).
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "tif", "bmp"];

/// List the image files in `dir`, sorted by path.
///
/// Non-image entries and subdirectories are ignored.
///
/// # Errors
///
/// Returns [`IoError::MissingInput`] if the directory does not exist
/// or cannot be read.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let entries = std::fs::read_dir(dir).map_err(|source| IoError::MissingInput {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IoError::MissingInput {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Decode an image file to RGBA.
///
/// # Errors
///
/// Returns [`IoError::ImageLoad`] if the file cannot be read or
/// decoded; per the error policy this is fatal for the run, not
/// skipped.
pub fn load_image(path: &Path) -> Result<RgbaImage, IoError> {
    let img = image::open(path).map_err(|source| IoError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
