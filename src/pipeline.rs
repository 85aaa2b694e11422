//! The full run: scan → reconcile → thumbnails → sidecars.
//!
//! Each stage has its own error type; [`BuildError`] wraps them so callers
//! can use `?` across the whole run. A failing stage stops the run. Sidecars
//! already written by then stay on disk, and a rerun picks up from there.

use crate::config::{GalleryConfig, effective_threads};
use crate::generate::{self, GenerateError};
use crate::imaging::{ImageBackend, Quality};
use crate::metadata::{self, FolderTimePolicy, MetadataError};
use crate::process::{self, ProcessError, ProcessEvent, ThumbnailConfig, ThumbnailStats};
use crate::scan::{self, ScanError};
use crate::sorting::ImageOrder;
use std::path::PathBuf;
use std::sync::mpsc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("At least one thumbnail size is required")]
    NoSizes,
}

/// Everything one run needs, resolved from flags and `gallery.toml`.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub root: PathBuf,
    /// Thumbnail sizes, casting size included.
    pub sizes: Vec<u32>,
    pub order: ImageOrder,
    pub cast_size: Option<u32>,
    pub force_update: bool,
    pub workers: usize,
    pub folder_time: FolderTimePolicy,
    pub quality: Quality,
}

impl BuildOptions {
    pub fn from_config(root: PathBuf, config: &GalleryConfig, force_update: bool) -> Self {
        Self {
            root,
            sizes: config.thumbnail_sizes(),
            order: config.order,
            cast_size: config.cc_size,
            force_update,
            workers: effective_threads(config.max_threads),
            folder_time: config.folder_time,
            quality: Quality::new(config.quality),
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    /// Folders that received a sidecar.
    pub folders: usize,
    /// Images in the whole tree.
    pub images: usize,
    pub thumbnails: ThumbnailStats,
}

/// Run the whole pipeline over `options.root`.
pub fn build(
    options: &BuildOptions,
    backend: &impl ImageBackend,
    events: Option<mpsc::Sender<ProcessEvent>>,
) -> Result<BuildSummary, BuildError> {
    if options.sizes.is_empty() {
        return Err(BuildError::NoSizes);
    }

    tracing::info!(root = %options.root.display(), "reading gallery");
    let mut root = scan::read_folder(&options.root, options.force_update)?;

    metadata::reconcile(&mut root, backend, options.folder_time)?;
    tracing::debug!("data model:\n{root}");

    let thumbnails = process::update_thumbnails(
        &root,
        &ThumbnailConfig {
            sizes: options.sizes.clone(),
            workers: options.workers,
            quality: options.quality,
        },
        backend,
        events,
    )?;

    let folders = generate::write_meta_files(&root, options.order, options.cast_size)?;

    Ok(BuildSummary {
        folders,
        images: root.image_count(),
        thumbnails,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::*;
    use crate::types::{META_NAME, META_NAME_CAST};
    use tempfile::TempDir;

    fn options(root: &std::path::Path, sizes: &[u32]) -> BuildOptions {
        BuildOptions {
            root: root.to_path_buf(),
            sizes: sizes.to_vec(),
            order: ImageOrder::default(),
            cast_size: None,
            force_update: false,
            workers: 2,
            folder_time: FolderTimePolicy::default(),
            quality: Quality::default(),
        }
    }

    #[test]
    fn options_from_config_include_cast_size() {
        let config = GalleryConfig {
            sizes: vec![200],
            cc_size: Some(1280),
            max_threads: Some(3),
            quality: 90,
            ..GalleryConfig::default()
        };
        let opts = BuildOptions::from_config("/g".into(), &config, true);
        assert_eq!(opts.sizes, vec![200, 1280]);
        assert_eq!(opts.cast_size, Some(1280));
        assert_eq!(opts.workers, 3);
        assert_eq!(opts.quality.value(), 90);
        assert!(opts.force_update);
    }

    #[test]
    fn no_sizes_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = build(&options(tmp.path(), &[]), &MockBackend::new(), None);
        assert!(matches!(result, Err(BuildError::NoSizes)));
    }

    #[test]
    fn full_run_with_mock_backend() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.jpg", "");
        write_file(tmp.path(), "2020-01-01_New_Year/b.jpg", "");
        write_file(tmp.path(), "2020-01-01_New_Year/c.jpg", "");

        let mut opts = options(tmp.path(), &[100, 200]);
        opts.cast_size = Some(200);
        let summary = build(&opts, &MockBackend::new(), None).unwrap();

        assert_eq!(summary.folders, 2);
        assert_eq!(summary.images, 3);
        assert_eq!(summary.thumbnails.rendered, 6);
        assert!(tmp.path().join(META_NAME).exists());
        assert!(tmp.path().join(META_NAME_CAST).exists());

        let root = read_json(&tmp.path().join(META_NAME));
        assert_eq!(root["subDirs"][0]["title"], "New Year");
        assert_eq!(root["subDirs"][0]["imageCount"], 2);
        // Root adopts the child's folder date
        assert_eq!(root["meta"]["time"], 1_577_836_800_000_i64);
    }

    #[test]
    fn rerun_reuses_sidecar_records() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.jpg", "");
        let opts = options(tmp.path(), &[100]);

        build(&opts, &MockBackend::new(), None).unwrap();

        write_file(tmp.path(), "b.jpg", "");
        let backend = MockBackend::new();
        let summary = build(&opts, &backend, None).unwrap();

        let b = tmp.path().join("b.jpg").to_string_lossy().to_string();
        assert_eq!(backend.exif_reads(), vec![b]);
        assert_eq!(summary.thumbnails.rendered, 1);
    }

    #[test]
    fn force_update_extracts_everything_again() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.jpg", "");
        let mut opts = options(tmp.path(), &[100]);
        build(&opts, &MockBackend::new(), None).unwrap();

        opts.force_update = true;
        let backend = MockBackend::new();
        build(&opts, &backend, None).unwrap();
        assert_eq!(backend.exif_reads().len(), 1);
    }

    #[test]
    fn scan_errors_propagate() {
        let result = build(
            &options(std::path::Path::new("/nonexistent/gallery"), &[100]),
            &MockBackend::new(),
            None,
        );
        assert!(matches!(result, Err(BuildError::Scan(_))));
    }
}
