//! The gallery data model shared by every pipeline stage.
//!
//! A [`Folder`] mirrors one directory of the source tree and owns its
//! subfolders by value. Each image in a folder is described by an
//! [`ImageRecord`], which is either freshly extracted or recovered from the
//! sidecar written by a previous run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Hidden per-folder directory holding the generated thumbnails.
pub const THUMB_DIR: &str = ".thumbs";

/// Per-folder sidecar written by the generate stage and read back on reruns.
pub const META_NAME: &str = "gallery_meta.json";

/// Per-folder companion feed for a casting device (JSONP).
pub const META_NAME_CAST: &str = "gallery_meta_cc.jsonp.js";

/// Optional per-folder overrides.
pub const CONTENT_INI: &str = "content.ini";

/// Rotation that turns the stored pixels upright.
///
/// Angles are counter-clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    None,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    pub fn is_none(&self) -> bool {
        matches!(self, Rotation::None)
    }
}

/// Camera facts taken from EXIF. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExifInfo {
    pub make: Option<String>,
    pub model: Option<String>,
    /// Capture time in milliseconds since the Unix epoch.
    pub time: Option<i64>,
}

/// Derived facts about one image.
///
/// `width`/`height` are the upright dimensions: for images stored sideways
/// they are already swapped. `rotation` is persisted (only when set) so a
/// recovered record still rotates thumbnails for newly requested sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub exif: ExifInfo,
    #[serde(default, skip_serializing_if = "Rotation::is_none")]
    pub rotation: Rotation,
}

/// User overrides from a folder's `content.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderConfig {
    /// Album title. Defaults to the title derived from the folder name.
    pub title: Option<String>,
    /// Album description. Defaults to none.
    pub description: Option<String>,
    /// Cover image filename. Defaults to the first image in the folder.
    pub cover: Option<String>,
}

/// One directory level of the gallery.
#[derive(Debug, Clone, Default)]
pub struct Folder {
    pub full_path: PathBuf,
    pub name: String,
    /// Title derived from the folder name during reconciliation.
    pub title: String,
    /// Representative moment in epoch milliseconds.
    pub time: Option<i64>,
    pub config: FolderConfig,
    /// Image filenames in listing order.
    pub image_files: Vec<String>,
    pub image_metadata: HashMap<String, ImageRecord>,
    pub children: Vec<Folder>,
}

impl Folder {
    pub fn new(full_path: &Path) -> Self {
        let name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| full_path.to_string_lossy().into_owned());
        Self {
            full_path: full_path.to_path_buf(),
            name,
            ..Self::default()
        }
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.full_path.join(filename)
    }

    pub fn thumb_dir(&self) -> PathBuf {
        self.full_path.join(THUMB_DIR)
    }

    /// Title shown to visitors: config override, then the derived title,
    /// then the raw directory name.
    pub fn display_title(&self) -> &str {
        match self.config.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ if !self.title.is_empty() => &self.title,
            _ => &self.name,
        }
    }

    /// Configured cover, else the first image in listing order.
    pub fn cover(&self) -> Option<&str> {
        match self.config.cover.as_deref() {
            Some(cover) if !cover.is_empty() => Some(cover),
            _ => self.image_files.first().map(String::as_str),
        }
    }

    /// Number of images in this folder and every folder below it.
    pub fn image_count(&self) -> usize {
        self.image_files.len()
            + self
                .children
                .iter()
                .map(Folder::image_count)
                .sum::<usize>()
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in crate::output::format_tree(self) {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Relative path of a thumbnail inside its folder, e.g. `.thumbs/400-a.jpg`.
pub fn thumbnail_name(size: u32, filename: &str) -> String {
    format!("{THUMB_DIR}/{size}-{filename}")
}
