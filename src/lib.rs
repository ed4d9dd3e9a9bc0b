//! s3-uploader - Parallel recent-file uploader
//!
//! Walks a local directory tree with a fixed pool of worker threads and
//! uploads every file modified within a configurable recency window to an
//! S3 bucket, preserving the directory layout as object keys.
//!
//! # Features
//!
//! - **Self-expanding work queue**: every directory task may enqueue more
//!   tasks for the subdirectories it discovers; the queue is unbounded so
//!   submission never blocks a running task.
//!
//! - **Bounded concurrency**: a fixed worker pool (default 20) caps the
//!   number of in-flight scans and uploads regardless of tree shape.
//!
//! - **Quiescence detection**: the control thread samples two counters -
//!   queued tasks and executing tasks - and declares the run complete only
//!   when both are zero, which is the sole snapshot that rules out a
//!   still-running task submitting more work.
//!
//! - **Fault isolation**: unreadable directories, vanished files and
//!   failed uploads are logged and skipped; they never abort sibling or
//!   pending work.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                       Control Thread                            │
//! │   seed root task → poll (active, queued) → shutdown after      │
//! │                        quiescence                               │
//! └──────────────────────────────┬─────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼─────────────────────────────────┐
//! │                      Worker Threads                             │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐         ┌─────────┐    │
//! │  │Worker 1 │  │Worker 2 │  │Worker 3 │  ...    │Worker N │    │
//! │  └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘    │
//! │       │  scan dir, push subdirs, upload recent files │         │
//! │       └────────────┴──────┬─────┴────────────────────┘         │
//! │                           ▼                                     │
//! │              ┌──────────────────────────┐                       │
//! │              │  Task Queue (unbounded)  │                       │
//! │              │  + queued/active counters│                       │
//! │              └──────────────────────────┘                       │
//! └──────────────────────────────┬─────────────────────────────────┘
//!                                │ PutObject
//!                                ▼
//!                      ┌──────────────────┐
//!                      │    S3 Bucket     │
//!                      └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Upload files modified in the last 5 days
//! s3-uploader 5 AKIA... secret my-bucket /home/user/photos
//!
//! # Restrict to a subtree; keys stay relative to the base path
//! s3-uploader 2 AKIA... secret my-bucket /data pics/incoming
//! ```

pub mod config;
pub mod error;
pub mod keys;
pub mod progress;
pub mod scanner;
pub mod store;
pub mod walker;

pub use config::{CliArgs, UploadConfig};
pub use error::{Result, UploaderError};
pub use store::{ObjectStore, S3Store};
pub use walker::{UploadCoordinator, UploadResult};
