//! # mfgallery
//!
//! Builds the data a static photo gallery front-end needs: per-folder JSON
//! sidecars describing images and sub-folders, plus resized JPEG thumbnails.
//! Your filesystem is the data source: directories become albums, JPEG files
//! become images, and a folder named `2020-03-15_Summer_Trip` is dated and
//! titled by its name.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! ```text
//! 1. Scan        gallery/  →  Folder tree     (listing + prior sidecar records)
//! 2. Reconcile   tree      →  tree            (EXIF for new images, titles, times)
//! 3. Process     tree      →  .thumbs/        (one JPEG per image and size)
//! 4. Generate    tree      →  gallery_meta.json (+ casting feed)
//! ```
//!
//! Runs are incremental. The sidecar written by stage 4 seeds stage 1 of the
//! next run, so only new images are decoded for metadata, and thumbnails
//! that already exist on disk are never rendered again. An interrupted run
//! is repaired by running again.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: lists folders and images, loads `content.ini`, recovers prior records |
//! | [`metadata`] | Stage 2: extracts missing records, derives folder titles and times |
//! | [`process`] | Stage 3: renders missing thumbnails on a fixed worker pool |
//! | [`generate`] | Stage 4: writes sidecars and the JSONP casting feed |
//! | [`pipeline`] | Runs the four stages in order |
//! | [`config`] | `gallery.toml` run configuration and `content.ini` parsing |
//! | [`types`] | The folder tree and the persisted image record |
//! | [`naming`] | `YYYY-MM-DD_Title` folder name parser |
//! | [`sorting`] | Image and sub-folder ordering |
//! | [`imaging`] | Dimensions, EXIF and thumbnail rendering behind [`imaging::ImageBackend`] |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Sidecar As Cache
//!
//! There is no database. The sidecar each folder already publishes for the
//! front-end doubles as the metadata cache: records are recovered by
//! filename, and `--force-update` discards them.
//!
//! ## Existence Is Completion
//!
//! A thumbnail is done when its file exists. Jobs are only created for
//! missing files, so a rerun after a crash renders exactly what is missing.
//!
//! ## Parents Are Never Older Than Children
//!
//! After reconciling, each folder's time is raised to the newest time below
//! it. Sorting folders by time then surfaces the folders with recent photos
//! anywhere inside.

pub mod config;
pub mod generate;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod scan;
pub mod sorting;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
