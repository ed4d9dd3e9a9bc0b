//! Upload coordinator - orchestrates the parallel walk-and-upload run
//!
//! The coordinator is responsible for:
//! - Setting up the work queue and workers
//! - Seeding the queue with the start directory
//! - Detecting quiescence (no task queued, no task executing)
//! - Shutdown ordering: the stop flag is raised strictly after quiescence
//! - Final statistics

use crate::config::UploadConfig;
use crate::error::Result;
use crate::progress::ProgressReporter;
use crate::store::ObjectStore;
use crate::walker::queue::{DirTask, TaskQueue};
use crate::walker::worker::{aggregate_stats, Worker};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Sampling interval for the quiescence poll
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Consecutive quiescent samples required before declaring completion
const STABLE_CHECKS_REQUIRED: u32 = 3;

/// Poll iterations between pool-state log lines (~1s at 100ms polls)
const LOG_EVERY_N_POLLS: u32 = 10;

/// Result of a completed run
#[derive(Debug)]
pub struct UploadResult {
    /// Total directories scanned
    pub dirs_processed: u64,

    /// Directories skipped (unreadable)
    pub dirs_skipped: u64,

    /// Regular files seen
    pub files_seen: u64,

    /// Files uploaded
    pub files_uploaded: u64,

    /// Bytes uploaded
    pub bytes_uploaded: u64,

    /// Errors encountered (all non-fatal, see the log stream)
    pub errors: u64,

    /// Time taken for the run
    pub duration: Duration,

    /// Whether the run completed (vs was interrupted)
    pub completed: bool,
}

/// Coordinates the parallel walk-and-upload run
pub struct UploadCoordinator {
    /// Configuration
    config: Arc<UploadConfig>,

    /// Work queue for directory tasks
    queue: TaskQueue,

    /// Object store client shared by all workers
    store: Arc<dyn ObjectStore>,

    /// Worker threads
    workers: Vec<Worker>,

    /// Shutdown signal
    shutdown: Arc<AtomicBool>,
}

impl UploadCoordinator {
    /// Create a new coordinator
    pub fn new(config: UploadConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config: Arc::new(config),
            queue: TaskQueue::new(),
            store,
            workers: Vec::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the shutdown flag (for signal handlers)
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run the walk-and-upload
    pub fn run(mut self, progress: Option<&ProgressReporter>) -> Result<UploadResult> {
        let start_time = Instant::now();

        info!(
            start = %self.config.start_path.display(),
            bucket = %self.config.bucket,
            workers = self.config.worker_count,
            threshold = %self.config.threshold_utc(),
            "Starting upload run"
        );

        // Seed the queue with the start directory
        self.queue
            .sender()
            .submit(DirTask::new(self.config.start_path.clone()))?;

        self.spawn_workers()?;

        // Wait for quiescence (or interrupt)
        let completed = self.wait_for_quiescence(progress);

        // Shutdown is raised strictly after quiescence was observed, so no
        // queued task is ever discarded
        self.shutdown.store(true, Ordering::SeqCst);

        let totals = self.join_workers();
        let duration = start_time.elapsed();

        info!(
            tasks = self.queue.state().enqueued_total(),
            dirs = totals.dirs_processed,
            uploads = totals.files_uploaded,
            bytes = totals.bytes_uploaded,
            errors = totals.errors,
            duration_secs = duration.as_secs(),
            "Run finished"
        );

        Ok(UploadResult {
            dirs_processed: totals.dirs_processed,
            dirs_skipped: totals.dirs_skipped,
            files_seen: totals.files_seen,
            files_uploaded: totals.files_uploaded,
            bytes_uploaded: totals.bytes_uploaded,
            errors: totals.errors,
            duration,
            completed,
        })
    }

    /// Spawn worker threads
    fn spawn_workers(&mut self) -> Result<()> {
        for id in 0..self.config.worker_count {
            let worker = Worker::spawn(
                id,
                Arc::clone(&self.config),
                self.queue.receiver(),
                self.queue.sender(),
                Arc::clone(&self.store),
                Arc::clone(&self.shutdown),
            )?;

            self.workers.push(worker);
        }

        debug!(count = self.workers.len(), "Workers spawned");
        Ok(())
    }

    /// Poll the pool counters until quiescence or interrupt
    ///
    /// The only valid termination signal is a snapshot with zero queued
    /// tasks AND zero executing tasks; the counter protocol in the queue
    /// module guarantees such a snapshot is never observed while work is
    /// in flight. The stable-check repetition is kept on top as a cheap
    /// second opinion.
    fn wait_for_quiescence(&self, progress: Option<&ProgressReporter>) -> bool {
        let state = self.queue.state();
        let mut stable_count = 0u32;
        let mut polls = 0u32;

        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                info!("Interrupt received, stopping before quiescence");
                return false;
            }

            let active = state.active_count();
            let queued = state.queued_count();

            polls += 1;
            if polls % LOG_EVERY_N_POLLS == 0 {
                info!(active = active, queued = queued, "pool state");
            }

            if let Some(p) = progress {
                p.update(active, queued, &aggregate_stats(&self.workers));
            }

            if active == 0 && queued == 0 {
                stable_count += 1;
                if stable_count >= STABLE_CHECKS_REQUIRED {
                    return true;
                }
            } else {
                stable_count = 0;
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Join all worker threads and collect final stats
    fn join_workers(&mut self) -> crate::walker::worker::RunTotals {
        let totals = aggregate_stats(&self.workers);

        let workers = std::mem::take(&mut self.workers);
        for worker in workers {
            let id = worker.id();
            if let Err(e) = worker.join() {
                warn!(worker = id, error = %e, "Worker failed to join cleanly");
            }
        }

        totals
    }
}
