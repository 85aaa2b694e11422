//! Sidecar generation.
//!
//! Stage 4 of the mfgallery pipeline. Writes one `gallery_meta.json` per
//! folder, children before their parent, and optionally a JSONP feed for a
//! casting receiver next to it.
//!
//! ## Sidecar format
//!
//! ```json
//! {
//!   "meta": {"title": "Summer Trip", "time": 1584230400000, "description": ""},
//!   "images": [
//!     {"filename": "a.jpg", "width": 3000, "height": 4000,
//!      "exif": {"make": "Canon", "model": "EOS 5D", "time": 1584265000000},
//!      "rotation": "rotate270"}
//!   ],
//!   "subDirs": [
//!     {"foldername": "2020-03-16_Day_Two", "title": "Day Two",
//!      "time": 1584316800000, "cover": "b.jpg", "imageCount": 12}
//!   ]
//! }
//! ```
//!
//! The file is written compact; the layout above is for reading only.
//! `rotation` is left out for upright images.
//!
//! ## Casting feed
//!
//! ```text
//! ifsImagesDataCallback([{"filename":".thumbs/1280-a.jpg","width":3000,"height":4000,"time":1584265000000}]);
//! ```

use crate::sorting::{ImageOrder, sort_images, sort_sub_dirs};
use crate::types::{Folder, ImageRecord, META_NAME, META_NAME_CAST, thumbnail_name};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Opening of the casting feed; the receiver defines this function.
pub const CAST_PREFIX: &str = "ifsImagesDataCallback(";
pub const CAST_SUFFIX: &str = ");";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No metadata for {filename} in {folder}")]
    MissingMetadata { folder: PathBuf, filename: String },
}

/// Contents of one `gallery_meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryMeta {
    pub meta: MetaInfo,
    pub images: Vec<ImageRecord>,
    #[serde(rename = "subDirs")]
    pub sub_dirs: Vec<SubDirSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    pub title: String,
    pub time: Option<i64>,
    /// Empty when the folder has no description.
    pub description: String,
}

/// Summary of a child folder as listed by its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubDirSummary {
    #[serde(rename = "foldername")]
    pub folder_name: String,
    pub title: String,
    pub time: Option<i64>,
    pub cover: Option<String>,
    /// Images in the child and everything below it.
    #[serde(rename = "imageCount")]
    pub image_count: usize,
}

/// One entry of the casting feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastImage {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub time: Option<i64>,
}

/// Assemble the sidecar of a single folder.
pub fn build_meta(folder: &Folder, order: ImageOrder) -> Result<GalleryMeta, GenerateError> {
    let mut images = folder
        .image_files
        .iter()
        .map(|filename| {
            folder.image_metadata.get(filename).cloned().ok_or_else(|| {
                GenerateError::MissingMetadata {
                    folder: folder.full_path.clone(),
                    filename: filename.clone(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    sort_images(order, &mut images);

    let mut sub_dirs: Vec<SubDirSummary> = folder.children.iter().map(summarize).collect();
    sort_sub_dirs(&mut sub_dirs);

    Ok(GalleryMeta {
        meta: MetaInfo {
            title: folder.display_title().to_string(),
            time: folder.time,
            description: folder.config.description.clone().unwrap_or_default(),
        },
        images,
        sub_dirs,
    })
}

fn summarize(child: &Folder) -> SubDirSummary {
    SubDirSummary {
        folder_name: child.name.clone(),
        title: child.display_title().to_string(),
        time: child.time,
        cover: child.cover().map(String::from),
        image_count: child.image_count(),
    }
}

/// Render the casting feed for `images` at thumbnail size `size`.
pub fn cast_feed(images: &[ImageRecord], size: u32) -> Result<String, GenerateError> {
    let entries: Vec<CastImage> = images
        .iter()
        .map(|image| CastImage {
            filename: thumbnail_name(size, &image.filename),
            width: image.width,
            height: image.height,
            time: image.exif.time,
        })
        .collect();
    Ok(format!(
        "{CAST_PREFIX}{}{CAST_SUFFIX}",
        serde_json::to_string(&entries)?
    ))
}

/// Write sidecars for `folder` and everything below it.
///
/// Returns the number of folders written.
pub fn write_meta_files(
    folder: &Folder,
    order: ImageOrder,
    cast_size: Option<u32>,
) -> Result<usize, GenerateError> {
    let mut written = 0;
    for child in &folder.children {
        written += write_meta_files(child, order, cast_size)?;
    }

    let meta = build_meta(folder, order)?;
    let path = folder.full_path.join(META_NAME);
    fs::write(&path, serde_json::to_vec(&meta)?)?;
    tracing::info!(path = %path.display(), images = meta.images.len(), "wrote {META_NAME}");

    if let Some(size) = cast_size {
        let path = folder.full_path.join(META_NAME_CAST);
        fs::write(&path, cast_feed(&meta.images, size)?)?;
        tracing::debug!(path = %path.display(), "wrote {META_NAME_CAST}");
    }

    Ok(written + 1)
}
