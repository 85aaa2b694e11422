//! Shared test utilities for the mfgallery test suite.
//!
//! Provides synthetic JPEG writers (optionally carrying EXIF), a small
//! gallery-tree builder and lookup helpers for the scan-phase [`Folder`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_jpeg(tmp.path(), "2020_Trip/a.jpg", 64, 48);
//! let root = read_folder(tmp.path(), false).unwrap();
//! let trip = find_child(&root, "2020_Trip");
//! assert_eq!(trip.image_files, ["a.jpg"]);
//! ```

use std::io::Cursor;
use std::path::{Path, PathBuf};

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::types::Folder;

// =========================================================================
// Synthetic images
// =========================================================================

/// EXIF tags to embed into a synthetic JPEG. Unset tags are left out.
#[derive(Debug, Clone, Default)]
pub struct TestExif {
    pub make: Option<&'static str>,
    pub model: Option<&'static str>,
    pub date_time: Option<&'static str>,
    pub date_time_original: Option<&'static str>,
    pub offset_time: Option<&'static str>,
    pub offset_time_original: Option<&'static str>,
    pub orientation: Option<u16>,
}

fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, encode_jpeg(width, height)).unwrap();
}

/// Create a small valid JPEG file carrying an EXIF APP1 segment.
pub fn create_test_jpeg_with_exif(path: &Path, width: u32, height: u32, tags: &TestExif) {
    let ascii = |tag: Tag, text: &str| Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    };

    let mut fields = Vec::new();
    let text_tags = [
        (Tag::Make, tags.make),
        (Tag::Model, tags.model),
        (Tag::DateTime, tags.date_time),
        (Tag::DateTimeOriginal, tags.date_time_original),
        (Tag::OffsetTime, tags.offset_time),
        (Tag::OffsetTimeOriginal, tags.offset_time_original),
    ];
    for (tag, text) in text_tags {
        if let Some(text) = text {
            fields.push(ascii(tag, text));
        }
    }
    if let Some(orientation) = tags.orientation {
        fields.push(Field {
            tag: Tag::Orientation,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![orientation]),
        });
    }

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    // APP1 right after SOI: marker, big-endian length (incl. itself), "Exif\0\0", TIFF
    let jpeg = encode_jpeg(width, height);
    let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();
    let mut bytes = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    bytes.extend_from_slice(&jpeg[..2]);
    bytes.extend_from_slice(&[0xFF, 0xE1]);
    bytes.extend_from_slice(&segment_len.to_be_bytes());
    bytes.extend_from_slice(b"Exif\0\0");
    bytes.extend_from_slice(&tiff);
    bytes.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, bytes).unwrap();
}

// =========================================================================
// Tree fixtures
// =========================================================================

/// Write a plain JPEG at `root/relative`, creating parent directories.
pub fn write_jpeg(root: &Path, relative: &str, width: u32, height: u32) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    create_test_jpeg(&path, width, height);
    path
}

/// Write a JPEG with EXIF at `root/relative`, creating parent directories.
pub fn write_jpeg_with_exif(root: &Path, relative: &str, tags: &TestExif) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    create_test_jpeg_with_exif(&path, 64, 48, tags);
    path
}

/// Write an arbitrary file at `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

// =========================================================================
// Folder lookups
// =========================================================================

/// Find a direct child folder by directory name. Panics if not found.
pub fn find_child<'a>(folder: &'a Folder, name: &str) -> &'a Folder {
    folder
        .children
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| {
            let names = child_names(folder);
            panic!("folder '{name}' not found in '{}'. Available: {names:?}", folder.name)
        })
}

/// Directory names of the direct children, in tree order.
pub fn child_names(folder: &Folder) -> Vec<&str> {
    folder.children.iter().map(|c| c.name.as_str()).collect()
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap()
}
