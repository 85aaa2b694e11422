//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::types::Rotation;

/// Calculate the dimensions of an image fitted into a square bounding box.
///
/// The aspect ratio is preserved and images already inside the box are
/// never upscaled.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bound` - Edge of the bounding box in pixels
///
/// # Returns
/// * `(width, height)` - Fitted dimensions, each at least 1
pub fn calculate_fit_dimensions(source: (u32, u32), bound: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w <= bound && src_h <= bound {
        return source;
    }

    let src_aspect = src_w as f64 / src_h as f64;
    if src_w >= src_h {
        // Landscape or square: width hits the box
        let h = (bound as f64 / src_aspect).round() as u32;
        (bound, h.max(1))
    } else {
        // Portrait: height hits the box
        let w = (bound as f64 * src_aspect).round() as u32;
        (w.max(1), bound)
    }
}

/// Map an EXIF orientation code to the rotation that turns the stored
/// pixels upright, and whether width and height swap.
///
/// Mirrored codes (2, 4, 5, 7) collapse onto their non-mirrored neighbours;
/// the mirror itself is not undone.
pub fn rotation_for_orientation(orientation: Option<u32>) -> (Rotation, bool) {
    match orientation {
        Some(3 | 4) => (Rotation::Rotate180, false),
        Some(5 | 6) => (Rotation::Rotate270, true),
        Some(7 | 8) => (Rotation::Rotate90, true),
        _ => (Rotation::None, false),
    }
}
