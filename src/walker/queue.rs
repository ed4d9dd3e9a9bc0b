//! Work queue for directory tasks
//!
//! The queue is logically unbounded: fan-out depth and width are
//! data-dependent, and a running task must be able to submit discovered
//! subdirectories without ever blocking. Alongside the channel live two
//! counters - queued and active - whose combined zero state is the only
//! valid traversal-complete signal.
//!
//! Counter protocol: submission increments `queued` before the send, and a
//! claim increments `active` before decrementing `queued`. Under that
//! ordering a sampler can never observe (0, 0) while a task is in flight,
//! no matter where it lands between the transitions.

use crate::error::WorkerError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A task to scan one directory
#[derive(Debug, Clone)]
pub struct DirTask {
    /// Absolute path of the directory
    pub path: PathBuf,
}

impl DirTask {
    /// Create a new directory task
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Shared pool counters
#[derive(Debug, Default)]
pub struct PoolState {
    /// Tasks submitted but not yet claimed by a worker
    queued: AtomicUsize,

    /// Tasks currently being processed
    active: AtomicUsize,

    /// Total tasks ever enqueued (for the run summary)
    enqueued_total: AtomicU64,
}

impl PoolState {
    /// Tasks waiting in the queue
    pub fn queued_count(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Tasks currently executing
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Total tasks ever submitted
    pub fn enqueued_total(&self) -> u64 {
        self.enqueued_total.load(Ordering::Relaxed)
    }

    /// True when nothing is queued and nothing is executing
    ///
    /// Checking either counter alone is insufficient: an executing task may
    /// still submit more work before it finishes.
    pub fn is_quiescent(&self) -> bool {
        self.active.load(Ordering::SeqCst) == 0 && self.queued.load(Ordering::SeqCst) == 0
    }
}

/// Unbounded work queue plus shared pool state
pub struct TaskQueue {
    sender: Sender<DirTask>,
    receiver: Receiver<DirTask>,
    state: Arc<PoolState>,
}

impl TaskQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();

        Self {
            sender,
            receiver,
            state: Arc::new(PoolState::default()),
        }
    }

    /// Get a submit handle (clone for each worker)
    pub fn sender(&self) -> TaskSender {
        TaskSender {
            sender: self.sender.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// Get a claim handle (clone for each worker)
    pub fn receiver(&self) -> TaskReceiver {
        TaskReceiver {
            receiver: self.receiver.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// Get the shared pool state
    pub fn state(&self) -> Arc<PoolState> {
        Arc::clone(&self.state)
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for submitting tasks
///
/// `submit` never blocks the submitter; the backlog is unbounded.
#[derive(Clone)]
pub struct TaskSender {
    sender: Sender<DirTask>,
    state: Arc<PoolState>,
}

impl TaskSender {
    /// Enqueue a task
    ///
    /// The queued counter is incremented before the send so a concurrent
    /// quiescence sample cannot miss the task. Fails only when the channel
    /// is disconnected, which the coordinator's ordering contract rules out
    /// before quiescence.
    pub fn submit(&self, task: DirTask) -> Result<(), WorkerError> {
        self.state.queued.fetch_add(1, Ordering::SeqCst);

        if self.sender.send(task).is_err() {
            self.state.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(WorkerError::QueueSendFailed);
        }

        self.state.enqueued_total.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Handle for claiming tasks
#[derive(Clone)]
pub struct TaskReceiver {
    receiver: Receiver<DirTask>,
    state: Arc<PoolState>,
}

impl TaskReceiver {
    /// Receive a task, waiting up to `timeout`
    ///
    /// The timeout keeps the worker loop responsive to the shutdown flag.
    /// Returns None on timeout or disconnect. The task is still counted as
    /// queued until the caller claims it with [`ClaimGuard::new`].
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DirTask> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Shared pool state (for claim guards and observation)
    pub fn state(&self) -> &Arc<PoolState> {
        &self.state
    }
}

/// RAII guard marking a task as executing
///
/// Construction moves one unit of work from queued to active; dropping it
/// retires the active unit. Must be created immediately after a successful
/// receive.
pub struct ClaimGuard<'a> {
    state: &'a PoolState,
}

impl<'a> ClaimGuard<'a> {
    /// Claim a received task: active rises before queued falls
    pub fn new(state: &'a PoolState) -> Self {
        state.active.fetch_add(1, Ordering::SeqCst);
        state.queued.fetch_sub(1, Ordering::SeqCst);
        Self { state }
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        self.state.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_and_claim() {
        let queue = TaskQueue::new();
        let sender = queue.sender();
        let receiver = queue.receiver();
        let state = queue.state();

        assert!(state.is_quiescent());

        sender.submit(DirTask::new(PathBuf::from("/data"))).unwrap();
        assert_eq!(state.queued_count(), 1);
        assert_eq!(state.active_count(), 0);
        assert!(!state.is_quiescent());

        let task = receiver.recv_timeout(Duration::from_millis(10)).unwrap();
        assert_eq!(task.path, PathBuf::from("/data"));

        // received but not yet claimed: still counted as queued
        assert_eq!(state.queued_count(), 1);

        {
            let _guard = ClaimGuard::new(&state);
            assert_eq!(state.queued_count(), 0);
            assert_eq!(state.active_count(), 1);
            assert!(!state.is_quiescent());
        }

        assert!(state.is_quiescent());
    }

    #[test]
    fn test_submit_never_blocks() {
        let queue = TaskQueue::new();
        let sender = queue.sender();

        for i in 0..10_000 {
            sender
                .submit(DirTask::new(PathBuf::from(format!("/dir/{i}"))))
                .unwrap();
        }

        assert_eq!(queue.state().queued_count(), 10_000);
        assert_eq!(queue.state().enqueued_total(), 10_000);
    }

    #[test]
    fn test_active_task_can_submit_more() {
        let queue = TaskQueue::new();
        let sender = queue.sender();
        let receiver = queue.receiver();
        let state = queue.state();

        sender.submit(DirTask::new(PathBuf::from("/root"))).unwrap();
        let _task = receiver.recv_timeout(Duration::from_millis(10)).unwrap();
        let guard = ClaimGuard::new(&state);

        // a running task discovers two subdirectories
        sender.submit(DirTask::new(PathBuf::from("/root/a"))).unwrap();
        sender.submit(DirTask::new(PathBuf::from("/root/b"))).unwrap();

        assert_eq!(state.queued_count(), 2);
        assert_eq!(state.active_count(), 1);

        drop(guard);

        // queue drained of the root but children remain: not quiescent
        assert!(!state.is_quiescent());
    }

    #[test]
    fn test_submit_after_disconnect_fails_cleanly() {
        let queue = TaskQueue::new();
        let sender = queue.sender();
        let state = queue.state();

        drop(queue);

        // receiver side gone; counter must roll back
        let err = sender.submit(DirTask::new(PathBuf::from("/late")));
        assert!(err.is_err());
        assert_eq!(state.queued_count(), 0);
    }

    #[test]
    fn test_recv_timeout_on_empty_queue() {
        let queue = TaskQueue::new();
        let receiver = queue.receiver();
        assert!(receiver.recv_timeout(Duration::from_millis(5)).is_none());
    }
}
