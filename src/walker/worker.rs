//! Worker thread logic for the parallel upload walk
//!
//! Each worker:
//! - Pulls directory tasks from the shared work queue
//! - Lists the directory, pushing one task per subdirectory back onto the
//!   queue
//! - Uploads every regular file that passes the age filter, blocking on
//!   the remote call
//!
//! Per-item failures (unreadable directory, vanished file, failed upload)
//! are logged and counted, never propagated: one bad item must not abort
//! the traversal of its siblings.

use crate::config::UploadConfig;
use crate::error::{TaskOutcome, WorkerError};
use crate::keys;
use crate::scanner::{self, FileCandidate};
use crate::store::ObjectStore;
use crate::walker::queue::{ClaimGuard, DirTask, TaskReceiver, TaskSender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long a worker waits for a task before re-checking the shutdown flag
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Directories processed
    pub dirs_processed: AtomicU64,

    /// Directories skipped (unreadable)
    pub dirs_skipped: AtomicU64,

    /// Regular files seen
    pub files_seen: AtomicU64,

    /// Files uploaded
    pub files_uploaded: AtomicU64,

    /// Bytes uploaded (sum of source file sizes)
    pub bytes_uploaded: AtomicU64,

    /// Errors encountered (scan, metadata, upload)
    pub errors: AtomicU64,
}

impl WorkerStats {
    fn record_dir(&self) {
        self.dirs_processed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_dir_skip(&self) {
        self.dirs_skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_files_seen(&self, count: u64) {
        self.files_seen.fetch_add(count, Ordering::Relaxed);
    }

    fn record_upload(&self, bytes: u64) {
        self.files_uploaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// A worker thread processing directory tasks
pub struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        config: Arc<UploadConfig>,
        queue_rx: TaskReceiver,
        queue_tx: TaskSender,
        store: Arc<dyn ObjectStore>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self, WorkerError> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("uploader-{}", id))
            .spawn(move || {
                worker_loop(id, config, queue_rx, queue_tx, store, shutdown, stats_clone)
            })
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| WorkerError::Panicked { id: self.id })?;
        }
        Ok(())
    }
}

/// Main worker loop
fn worker_loop(
    id: usize,
    config: Arc<UploadConfig>,
    queue_rx: TaskReceiver,
    queue_tx: TaskSender,
    store: Arc<dyn ObjectStore>,
    shutdown: Arc<AtomicBool>,
    stats: Arc<WorkerStats>,
) {
    debug!(worker = id, "Worker starting");

    while !shutdown.load(Ordering::Relaxed) {
        let task = match queue_rx.recv_timeout(RECV_TIMEOUT) {
            Some(task) => task,
            None => continue, // timeout - check shutdown and retry
        };

        // Mark as actively working before the queued count drops
        let _guard = ClaimGuard::new(queue_rx.state());

        let outcome = process_directory(id, &task, &config, store.as_ref(), &queue_tx, &stats);

        match &outcome {
            TaskOutcome::Success {
                subdirs,
                files,
                uploads,
                ..
            } => {
                debug!(
                    worker = id,
                    path = %task.path.display(),
                    subdirs = subdirs,
                    files = files,
                    uploads = uploads,
                    "Directory processed"
                );
            }
            TaskOutcome::Skipped { path, reason } => {
                warn!(worker = id, path = %path.display(), reason = %reason, "Directory skipped");
            }
        }
    }

    debug!(
        worker = id,
        dirs = stats.dirs_processed.load(Ordering::Relaxed),
        uploads = stats.files_uploaded.load(Ordering::Relaxed),
        "Worker shutting down"
    );
}

/// Process a single directory task
fn process_directory(
    worker_id: usize,
    task: &DirTask,
    config: &UploadConfig,
    store: &dyn ObjectStore,
    queue_tx: &TaskSender,
    stats: &WorkerStats,
) -> TaskOutcome {
    let listing = match scanner::scan_directory(&task.path) {
        Ok(listing) => listing,
        Err(e) => {
            stats.record_error();
            stats.record_dir_skip();
            return TaskOutcome::Skipped {
                path: task.path.clone(),
                reason: e.to_string(),
            };
        }
    };

    let subdir_count = listing.subdirs.len();
    let file_count = listing.files.len();
    stats.record_files_seen(file_count as u64);

    // Fan out before uploading: discovered directories become work for the
    // whole pool while this worker is busy with its files.
    for subdir in listing.subdirs {
        if let Err(e) = queue_tx.submit(DirTask::new(subdir)) {
            warn!(worker = worker_id, error = %e, "Failed to enqueue subdirectory");
        }
    }

    let mut uploads = 0usize;
    for path in listing.files {
        let candidate = match FileCandidate::load(path) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(worker = worker_id, error = %e, "Skipping file");
                stats.record_error();
                continue;
            }
        };

        if !scanner::qualifies(candidate.modified, config.threshold) {
            continue;
        }

        let key = match keys::derive_key(&config.base_path, &candidate.path) {
            Ok(key) => key,
            Err(e) => {
                warn!(worker = worker_id, error = %e, "Skipping file");
                stats.record_error();
                continue;
            }
        };

        info!(
            worker = worker_id,
            "uploading {} to {}",
            candidate.path.display(),
            key
        );

        match store.upload(&key, &candidate.path) {
            Ok(()) => {
                stats.record_upload(candidate.size);
                uploads += 1;
            }
            Err(e) => {
                warn!(worker = worker_id, error = %e, "Upload failed");
                stats.record_error();
            }
        }
    }

    stats.record_dir();

    TaskOutcome::Success {
        path: task.path.clone(),
        subdirs: subdir_count,
        files: file_count,
        uploads,
    }
}

/// Aggregated statistics from all workers
#[derive(Debug, Default, Clone, Copy)]
pub struct RunTotals {
    pub dirs_processed: u64,
    pub dirs_skipped: u64,
    pub files_seen: u64,
    pub files_uploaded: u64,
    pub bytes_uploaded: u64,
    pub errors: u64,
}

/// Sum statistics across workers
pub fn aggregate_stats(workers: &[Worker]) -> RunTotals {
    let mut totals = RunTotals::default();

    for worker in workers {
        let stats = worker.stats();
        totals.dirs_processed += stats.dirs_processed.load(Ordering::Relaxed);
        totals.dirs_skipped += stats.dirs_skipped.load(Ordering::Relaxed);
        totals.files_seen += stats.files_seen.load(Ordering::Relaxed);
        totals.files_uploaded += stats.files_uploaded.load(Ordering::Relaxed);
        totals.bytes_uploaded += stats.bytes_uploaded.load(Ordering::Relaxed);
        totals.errors += stats.errors.load(Ordering::Relaxed);
    }

    totals
}
