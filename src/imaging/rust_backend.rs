//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | EXIF | `kamadak-exif` via [`exif_reader::read_exif`](super::exif_reader::read_exif) |
//! | Decode | `image` crate JPEG decoder |
//! | Resize | `image::DynamicImage::resize_exact` with `Triangle` (linear) filter |
//! | Rotate | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Encode | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, Dimensions, ExifData, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::ThumbnailParams;
use crate::types::Rotation;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Turn stored pixels upright. Angles are counter-clockwise, the `image`
/// crate rotates clockwise.
fn rotate(img: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::None => img,
        Rotation::Rotate90 => img.rotate270(),
        Rotation::Rotate180 => img.rotate180(),
        Rotation::Rotate270 => img.rotate90(),
    }
}

/// Encode as baseline JPEG, creating or truncating `path`.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| match e {
            image::ImageError::IoError(io) => BackendError::Io(io),
            other => BackendError::ProcessingFailed(format!("JPEG encode failed: {}", other)),
        })?;
    // Dropping the writer would swallow a failed final write
    writer.flush().map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| match e {
            image::ImageError::IoError(io) => BackendError::Io(io),
            other => BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                other
            )),
        })?;
        Ok(Dimensions { width, height })
    }

    fn read_exif(&self, path: &Path) -> Result<ExifData, BackendError> {
        super::exif_reader::read_exif(path)
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        if params.size == 0 {
            return Err(BackendError::ProcessingFailed(
                "Thumbnail size must be positive".into(),
            ));
        }
        let img = load_image(&params.source)?;

        let (width, height) = calculate_fit_dimensions((img.width(), img.height()), params.size);
        let fitted = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Triangle)
        };

        let upright = rotate(fitted, params.rotation);
        save_jpeg(&upright, &params.output, params.quality.value())
    }
}
