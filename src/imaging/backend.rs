//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: identify, read_exif, and thumbnail.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! and `kamadak-exif` crates.

use super::params::ThumbnailParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Raw EXIF facts, before orientation is turned into a rotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifData {
    pub make: Option<String>,
    pub model: Option<String>,
    /// Capture time in epoch milliseconds.
    pub time: Option<i64>,
    /// EXIF orientation code (1-8).
    pub orientation: Option<u32>,
}

/// Trait for image processing backends.
///
/// The rest of the codebase only talks to this trait, so tests can swap in
/// a recording mock.
pub trait ImageBackend: Sync {
    /// Get stored pixel dimensions from the image header.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Read EXIF. Missing or malformed EXIF yields an empty [`ExifData`];
    /// only I/O failures are errors.
    fn read_exif(&self, path: &Path) -> Result<ExifData, BackendError>;

    /// Execute a thumbnail operation (bounding-box fit + rotation + JPEG).
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
