//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **EXIF** | `kamadak-exif` (make, model, capture time, orientation) |
//! | **Thumbnail** | bounding-box fit with `Triangle` filter + rotate + JPEG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math and orientation
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
mod exif_reader;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ExifData, ImageBackend};
pub use calculations::{calculate_fit_dimensions, rotation_for_orientation};
pub use exif_reader::parse_exif_datetime;
pub use operations::{extract_image_record, plan_thumbnail};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
