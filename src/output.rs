//! CLI output formatting.
//!
//! Every formatter here is pure: it turns data into display lines and
//! leaves printing to the caller. The binary prints thumbnail progress from
//! a dedicated thread as events arrive.
//!
//! # Output Format
//!
//! ## Data model (`--debug`)
//!
//! ```text
//! photos (1 photos)
//!     Source: /home/me/photos
//!     Time: 2020-03-16 00:00:00 UTC
//!     Summer Trip (12 photos)
//!         Source: /home/me/photos/2020-03-15_Summer_Trip
//!         Time: 2020-03-16 00:00:00 UTC
//!         Cover: IMG_0042.jpg
//! ```
//!
//! ## Thumbnails
//!
//! ```text
//! Summer Trip (24 thumbnails queued)
//!     200px: IMG_0001.jpg (worker 3)
//!     1280px: IMG_0001.jpg (worker 1)
//! Thumbnail worker 1 finished. Jobs done: 12.
//! ```

use crate::pipeline::BuildSummary;
use crate::process::ProcessEvent;
use crate::types::Folder;
use chrono::DateTime;
use std::path::Path;

/// Four spaces per level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Epoch milliseconds as a UTC timestamp.
fn format_time(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

// ============================================================================
// Data model
// ============================================================================

/// Format the folder tree, one header line per folder with indented
/// context lines.
pub fn format_tree(folder: &Folder) -> Vec<String> {
    let mut lines = Vec::new();
    push_folder(folder, 0, &mut lines);
    lines
}

fn push_folder(folder: &Folder, depth: usize, lines: &mut Vec<String>) {
    let pad = indent(depth);
    lines.push(format!(
        "{pad}{} ({} photos)",
        folder.display_title(),
        folder.image_files.len()
    ));
    lines.push(format!("{pad}    Source: {}", folder.full_path.display()));
    if let Some(time) = folder.time {
        lines.push(format!("{pad}    Time: {}", format_time(time)));
    }
    if let Some(description) = &folder.config.description {
        lines.push(format!("{pad}    Description: {description}"));
    }
    if let Some(cover) = &folder.config.cover {
        lines.push(format!("{pad}    Cover: {cover}"));
    }
    let known = folder
        .image_files
        .iter()
        .filter(|f| folder.image_metadata.contains_key(*f))
        .count();
    if known < folder.image_files.len() {
        lines.push(format!(
            "{pad}    Metadata: {known} of {}",
            folder.image_files.len()
        ));
    }

    for child in &folder.children {
        push_folder(child, depth + 1, lines);
    }
}

// ============================================================================
// Thumbnails
// ============================================================================

/// Format a single thumbnail progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::FolderQueued { folder, jobs } => {
            vec![format!("{folder} ({jobs} thumbnails queued)")]
        }
        ProcessEvent::ThumbnailRendered {
            worker,
            size,
            source,
        } => {
            let filename = Path::new(source)
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.clone());
            vec![format!("{}{size}px: {filename} (worker {worker})", indent(1))]
        }
        ProcessEvent::WorkerFinished { worker, jobs_done } => {
            vec![format!(
                "Thumbnail worker {worker} finished. Jobs done: {jobs_done}."
            )]
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Final lines printed after a successful run.
pub fn format_summary(summary: &BuildSummary) -> Vec<String> {
    vec![
        format!(
            "{} folders, {} images",
            summary.folders, summary.images
        ),
        format!("{}", summary.thumbnails),
    ]
}
