//! Thumbnail generation.
//!
//! Stage 3 of the mfgallery pipeline. Fans out one job per image and size to
//! a fixed pool of workers.
//!
//! ## Output Structure
//!
//! ```text
//! 2020-03-15_Summer_Trip/
//! ├── IMG_0001.jpg
//! └── .thumbs/
//!     ├── 200-IMG_0001.jpg       # Fitted into a 200x200 box
//!     └── 1280-IMG_0001.jpg      # Fitted into a 1280x1280 box
//! ```
//!
//! A thumbnail whose file already exists is never queued, so reruns only
//! fill gaps. Delete `.thumbs/` to force regeneration.
//!
//! ## Worker pool
//!
//! The calling thread walks the tree depth-first and hands jobs to `W`
//! long-lived workers over a rendezvous channel, so at most `W` jobs are in
//! flight and nothing is buffered. The workers run in a dedicated rayon pool
//! and the call returns once every worker has finished its last job.
//!
//! The first render failure stops the walk. Workers drain whatever is still
//! being handed over without rendering it, and the failure is returned.

use crate::imaging::{BackendError, ImageBackend, Quality, plan_thumbnail};
use crate::types::{Folder, Rotation};
use crossbeam_channel::Sender;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid thumbnail size: {0}")]
    InvalidSize(u32),
    #[error("Failed to render {size}px thumbnail of {path}: {source}")]
    Render {
        path: PathBuf,
        size: u32,
        source: BackendError,
    },
    #[error("Failed to start thumbnail workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Bounding box edges, one thumbnail per size and image.
    pub sizes: Vec<u32>,
    /// Number of concurrent workers.
    pub workers: usize,
    pub quality: Quality,
}

/// One thumbnail to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailJob {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub size: u32,
    pub rotation: Rotation,
}

/// Progress events emitted while thumbnails are generated.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// All missing thumbnails of a folder have been handed to the workers.
    FolderQueued { folder: String, jobs: usize },
    /// A worker wrote one thumbnail.
    ThumbnailRendered {
        worker: usize,
        size: u32,
        source: String,
    },
    /// A worker saw the job channel close.
    WorkerFinished { worker: usize, jobs_done: usize },
}

/// Summary of one thumbnail run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThumbnailStats {
    /// Jobs handed to workers.
    pub queued: usize,
    /// Thumbnails actually written.
    pub rendered: usize,
    pub workers: usize,
}

impl fmt::Display for ThumbnailStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} thumbnails rendered by {} workers",
            self.rendered, self.workers
        )
    }
}

/// Shared state between the producer and the workers.
struct RunState {
    abort: AtomicBool,
    first_error: Mutex<Option<ProcessError>>,
    rendered: AtomicUsize,
}

impl RunState {
    fn new() -> Self {
        Self {
            abort: AtomicBool::new(false),
            first_error: Mutex::new(None),
            rendered: AtomicUsize::new(0),
        }
    }

    fn aborted(&self) -> bool {
        self.abort.load(Ordering::Acquire)
    }

    fn fail(&self, error: ProcessError) {
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_none() {
            *slot = Some(error);
        }
        self.abort.store(true, Ordering::Release);
    }

    fn take_error(self) -> Option<ProcessError> {
        self.first_error
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Generate every missing thumbnail below `root`.
///
/// Progress is reported through `events` when given; a dropped receiver is
/// ignored.
pub fn update_thumbnails(
    root: &Folder,
    config: &ThumbnailConfig,
    backend: &impl ImageBackend,
    events: Option<mpsc::Sender<ProcessEvent>>,
) -> Result<ThumbnailStats, ProcessError> {
    if let Some(&size) = config.sizes.iter().find(|s| **s == 0) {
        return Err(ProcessError::InvalidSize(size));
    }

    // One job per destination: a repeated size would race on the same file
    let mut sizes: Vec<u32> = Vec::with_capacity(config.sizes.len());
    for &size in &config.sizes {
        if !sizes.contains(&size) {
            sizes.push(size);
        }
    }

    let workers = config.workers.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("thumbnail-{}", i + 1))
        .build()?;

    let state = RunState::new();
    let (job_tx, job_rx) = crossbeam_channel::bounded::<ThumbnailJob>(0);

    let queued = pool.in_place_scope(|scope| {
        for worker in 1..=workers {
            let job_rx = job_rx.clone();
            let events = events.clone();
            let state = &state;
            let quality = config.quality;
            scope.spawn(move |_| {
                let mut jobs_done = 0;
                for job in job_rx.iter() {
                    if state.aborted() {
                        continue;
                    }
                    let params = plan_thumbnail(&job.source, &job.dest, job.size, job.rotation, quality);
                    match backend.thumbnail(&params) {
                        Ok(()) => {
                            jobs_done += 1;
                            state.rendered.fetch_add(1, Ordering::Relaxed);
                            tracing::debug!(worker, size = job.size, dest = %job.dest.display(), "thumbnail written");
                            if let Some(tx) = &events {
                                let _ = tx.send(ProcessEvent::ThumbnailRendered {
                                    worker,
                                    size: job.size,
                                    source: job.source.display().to_string(),
                                });
                            }
                        }
                        Err(source) => {
                            tracing::error!(worker, source = %job.source.display(), error = %source, "thumbnail failed");
                            state.fail(ProcessError::Render {
                                path: job.source,
                                size: job.size,
                                source,
                            });
                        }
                    }
                }
                tracing::debug!(worker, jobs_done, "thumbnail worker finished");
                if let Some(tx) = &events {
                    let _ = tx.send(ProcessEvent::WorkerFinished { worker, jobs_done });
                }
            });
        }
        drop(job_rx);

        let queued = enqueue_folder(root, &sizes, &job_tx, &state, events.as_ref());
        // Closing the channel lets every worker run out of jobs and return.
        drop(job_tx);
        queued
    });

    let rendered = state.rendered.load(Ordering::Relaxed);
    if let Some(error) = state.take_error() {
        return Err(error);
    }
    let queued = queued?;

    Ok(ThumbnailStats {
        queued,
        rendered,
        workers,
    })
}

/// Queue the missing thumbnails of `folder`, then of its children.
fn enqueue_folder(
    folder: &Folder,
    sizes: &[u32],
    jobs: &Sender<ThumbnailJob>,
    state: &RunState,
    events: Option<&mpsc::Sender<ProcessEvent>>,
) -> Result<usize, ProcessError> {
    let thumb_dir = folder.thumb_dir();
    fs::create_dir_all(&thumb_dir)?;

    let mut queued = 0;
    for filename in &folder.image_files {
        let rotation = folder
            .image_metadata
            .get(filename)
            .map(|record| record.rotation)
            .unwrap_or_default();

        for &size in sizes {
            let dest = thumb_dir.join(format!("{size}-{filename}"));
            if dest.exists() {
                continue;
            }
            if state.aborted() {
                return Ok(queued);
            }
            let job = ThumbnailJob {
                source: folder.file_path(filename),
                dest,
                size,
                rotation,
            };
            if jobs.send(job).is_err() {
                return Ok(queued);
            }
            queued += 1;
        }
    }

    if queued > 0
        && let Some(tx) = events
    {
        let _ = tx.send(ProcessEvent::FolderQueued {
            folder: folder.display_title().to_string(),
            jobs: queued,
        });
    }

    for child in &folder.children {
        if state.aborted() {
            break;
        }
        queued += enqueue_folder(child, sizes, jobs, state, events)?;
    }

    Ok(queued)
}
