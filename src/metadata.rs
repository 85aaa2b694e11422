//! Metadata reconciliation.
//!
//! Stage 2 of the mfgallery pipeline. After scanning, some images already
//! carry a record recovered from the previous sidecar and the rest have
//! none. [`reconcile`] extracts the missing ones and then derives each
//! folder's title and time.
//!
//! ## Folder time
//!
//! Resolved per folder, first match wins:
//!
//! - **Folder name date**: `2020-03-15_Trip` dates the folder 2020-03-15
//!   (see [`naming`](crate::naming)).
//! - **Own images**: the newest (or, with [`FolderTimePolicy::Oldest`], the
//!   oldest) EXIF time among the folder's own images.
//! - **Unset** otherwise.
//!
//! Once its children are reconciled, a folder's time is raised to the
//! newest child time, so a parent is never older than anything below it.

use crate::imaging::{BackendError, ImageBackend, extract_image_record};
use crate::naming::parse_folder_name;
use crate::types::Folder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read image {path}: {source}")]
    Extract {
        path: PathBuf,
        source: BackendError,
    },
}

/// Which of a folder's own image times represents an undated folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FolderTimePolicy {
    #[default]
    Newest,
    Oldest,
}

impl FolderTimePolicy {
    fn pick(self, current: Option<i64>, candidate: i64) -> i64 {
        match (self, current) {
            (_, None) => candidate,
            (FolderTimePolicy::Newest, Some(t)) => t.max(candidate),
            (FolderTimePolicy::Oldest, Some(t)) => t.min(candidate),
        }
    }
}

/// Fill in missing image records and derive title and time, recursively.
///
/// Records already present (recovered from a sidecar) are kept as they are.
pub fn reconcile(
    folder: &mut Folder,
    backend: &impl ImageBackend,
    policy: FolderTimePolicy,
) -> Result<(), MetadataError> {
    let mut own_time = None;
    for filename in &folder.image_files {
        if !folder.image_metadata.contains_key(filename) {
            let path = folder.file_path(filename);
            let record = extract_image_record(backend, &path, filename)
                .map_err(|source| MetadataError::Extract { path, source })?;
            folder.image_metadata.insert(filename.clone(), record);
        }
        if let Some(time) = folder.image_metadata[filename].exif.time {
            own_time = Some(policy.pick(own_time, time));
        }
    }

    let parsed = parse_folder_name(&folder.name);
    folder.time = parsed.timestamp_millis().or(own_time);
    folder.title = parsed.title;

    for child in &mut folder.children {
        reconcile(child, backend, policy)?;
        if let Some(child_time) = child.time {
            folder.time = Some(folder.time.map_or(child_time, |t| t.max(child_time)));
        }
    }

    tracing::debug!(
        folder = %folder.full_path.display(),
        title = %folder.title,
        time = ?folder.time,
        "folder reconciled"
    );
    Ok(())
}
