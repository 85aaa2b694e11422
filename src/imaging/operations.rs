//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::rotation_for_orientation;
use super::params::{Quality, ThumbnailParams};
use crate::types::{ExifInfo, ImageRecord, Rotation};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Build the [`ImageRecord`] for one image file.
///
/// Reads the header for dimensions and EXIF for camera facts. Sideways
/// orientations swap width and height so the record holds the upright size.
pub fn extract_image_record(backend: &impl ImageBackend, path: &Path, filename: &str) -> Result<ImageRecord> {
    let (width, height) = get_dimensions(backend, path)?;
    let exif = backend.read_exif(path)?;
    let (rotation, swap) = rotation_for_orientation(exif.orientation);
    let (width, height) = if swap { (height, width) } else { (width, height) };

    tracing::debug!(
        filename,
        width,
        height,
        ?rotation,
        time = ?exif.time,
        "extracted image metadata"
    );

    Ok(ImageRecord {
        filename: filename.to_string(),
        width,
        height,
        exif: ExifInfo {
            make: exif.make,
            model: exif.model,
            time: exif.time,
        },
        rotation,
    })
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(
    source: &Path,
    output: &Path,
    size: u32,
    rotation: Rotation,
    quality: Quality,
) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        size,
        rotation,
        quality,
    }
}
