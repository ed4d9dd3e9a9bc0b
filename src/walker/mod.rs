//! Parallel walk-and-upload engine
//!
//! This module implements the concurrent traversal-and-dispatch core:
//! a self-expanding work queue consumed by a fixed pool of workers, where
//! each task may enqueue more tasks (subdirectories) or perform blocking
//! uploads, plus the quiescence detection that tells the control thread
//! when all work - including work generated after startup - has drained.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────────────────┐
//!                  │    UploadCoordinator     │
//!                  │  - seeds the root task   │
//!                  │  - polls pool counters   │
//!                  └────────────┬─────────────┘
//!                               │
//!        ┌──────────────────────┼──────────────────────┐
//!        │                      │                      │
//!  ┌─────▼─────┐          ┌─────▼─────┐          ┌─────▼─────┐
//!  │  Worker 1 │          │  Worker 2 │          │  Worker N │
//!  │ scan dir  │          │ scan dir  │          │ scan dir  │
//!  │ upload    │          │ upload    │          │ upload    │
//!  └─────┬─────┘          └─────┬─────┘          └─────┬─────┘
//!        │   subdirs back onto  │   the shared queue   │
//!        └──────────────────────┴──────────────────────┘
//! ```

pub mod coordinator;
pub mod queue;
pub mod worker;

pub use coordinator::{UploadCoordinator, UploadResult};
pub use queue::{DirTask, PoolState, TaskQueue};
pub use worker::{RunTotals, Worker, WorkerStats};
