//! Filesystem scanning.
//!
//! Stage 1 of the mfgallery pipeline. Walks the gallery directory and builds
//! the [`Folder`] tree that later stages fill in and write out.
//!
//! ## Directory Structure
//!
//! ```text
//! photos/                              # Gallery root
//! ├── gallery.toml                     # Run configuration (optional)
//! ├── 2020-03-15_Summer_Trip/
//! │   ├── content.ini                  # Title/description/cover overrides (optional)
//! │   ├── IMG_0001.JPG
//! │   ├── IMG_0002.jpeg
//! │   ├── gallery_meta.json            # Written by a previous run
//! │   ├── .thumbs/                     # Generated thumbnails (ignored)
//! │   └── 2020-03-16_Day_Two/          # Nesting is arbitrary
//! │       └── IMG_0100.jpg
//! └── Misc/
//!     └── scan.jpg
//! ```
//!
//! ## Rules
//!
//! - Entries whose name starts with `.` are skipped, files and directories
//!   alike. This hides `.thumbs`.
//! - Entries whose name is not valid UTF-8 are skipped with a warning, since
//!   sidecars store names as JSON strings.
//! - Every other directory becomes a child [`Folder`], sorted by name.
//! - Files with a case-insensitive `.jpg`/`.jpeg` suffix are images, kept in
//!   name order.
//! - `content.ini` fills [`Folder::config`].
//! - A `gallery_meta.json` from an earlier run seeds
//!   [`Folder::image_metadata`] so those images are not read again, unless
//!   `force_update` is set. Records for images that no longer exist are
//!   carried along but never written.

use crate::config::{self, ConfigError};
use crate::types::{CONTENT_INI, Folder, ImageRecord, META_NAME};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid JSON in {path}: {source}")]
    Sidecar {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The part of a previous sidecar the scanner cares about.
#[derive(Debug, Deserialize)]
struct PriorSidecar {
    #[serde(default)]
    images: Vec<ImageRecord>,
}

/// Recursively read `path` into a [`Folder`] tree.
pub fn read_folder(path: &Path, force_update: bool) -> Result<Folder, ScanError> {
    let mut folder = Folder::new(path);

    for entry in collect_entries(path)? {
        let name = entry
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .unwrap_or_default();

        if entry.is_dir() {
            folder.children.push(read_folder(&entry, force_update)?);
        } else if name == CONTENT_INI {
            tracing::info!(folder = %path.display(), "content.ini found");
            folder.config = config::load_folder_config(&entry)?;
        } else if name == META_NAME {
            if force_update {
                continue;
            }
            tracing::info!(folder = %path.display(), "previous {META_NAME} found");
            for record in read_prior_records(&entry)? {
                folder.image_metadata.insert(record.filename.clone(), record);
            }
        } else if is_image(&name) {
            folder.image_files.push(name);
        }
    }

    Ok(folder)
}

/// Non-hidden, UTF-8 named directory entries sorted by name.
fn collect_entries(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            tracing::warn!(path = %entry.path().display(), "skipping entry with non UTF-8 name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

fn is_image(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".jpeg")
}

fn read_prior_records(path: &Path) -> Result<Vec<ImageRecord>, ScanError> {
    let bytes = fs::read(path)?;
    let prior: PriorSidecar =
        serde_json::from_slice(&bytes).map_err(|source| ScanError::Sidecar {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(prior.images)
}
