//! Error types for s3-uploader
//!
//! This module defines the error hierarchy covering:
//! - Filesystem scan errors
//! - Object store (S3) errors
//! - Configuration and CLI errors
//! - Worker thread errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Per-item failures (one directory, one file, one upload) are handled
//!   where they occur and never unwind across task boundaries
//! - Preserve enough context in each variant to make the log line actionable

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the s3-uploader application
#[derive(Error, Debug)]
pub enum UploaderError {
    /// Filesystem scan errors
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// Object store errors
    #[error("object store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem scan errors
///
/// Every variant here is non-fatal by policy: the affected directory or
/// file is logged and skipped, siblings are unaffected.
#[derive(Error, Debug, Clone)]
pub enum ScanError {
    /// Directory could not be listed (permissions, removed concurrently)
    #[error("failed to read directory '{path}': {reason}")]
    ReadDirFailed { path: PathBuf, reason: String },

    /// File metadata (modification time, size) could not be read
    #[error("failed to read metadata for '{path}': {reason}")]
    MetadataFailed { path: PathBuf, reason: String },
}

/// Destination key derivation errors
#[derive(Error, Debug, Clone)]
pub enum KeyError {
    /// The file path is not under the base directory. Tasks only generate
    /// paths by walking down from the base, so this indicates a bug in the
    /// caller rather than a user error; it is still surfaced as a per-file
    /// skip instead of a panic.
    #[error("path '{path}' is not under base directory '{base}'")]
    OutsideBase { base: PathBuf, path: PathBuf },
}

/// Object store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Client could not be constructed (fatal at startup)
    #[error("failed to initialize object store client: {reason}")]
    Init { reason: String },

    /// Local source file could not be read for upload
    #[error("failed to read source file '{path}': {reason}")]
    ReadSource { path: PathBuf, reason: String },

    /// Remote upload call failed
    #[error("failed to upload '{key}': {reason}")]
    UploadFailed { key: String, reason: String },
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Base path must be absolute (it is the key-derivation root)
    #[error("base path '{path}' must be absolute")]
    BasePathNotAbsolute { path: PathBuf },

    /// Base path missing or not a directory
    #[error("base path '{path}' is not an accessible directory: {reason}")]
    BasePathInvalid { path: PathBuf, reason: String },

    /// Start path (base + subfolder) missing or not a directory
    #[error("start path '{path}' is not an accessible directory: {reason}")]
    StartPathInvalid { path: PathBuf, reason: String },

    /// Recency window too large to represent as a timestamp
    #[error("recency window of {days} days is too large")]
    WindowTooLarge { days: u64 },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker thread could not be spawned
    #[error("failed to start worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked
    #[error("worker {id} panicked")]
    Panicked { id: usize },

    /// Task queue send failed (channel disconnected)
    #[error("failed to submit task: queue closed")]
    QueueSendFailed,
}

/// Result type alias for UploaderError
pub type Result<T> = std::result::Result<T, UploaderError>;

/// Outcome of processing a single directory task
///
/// Scan failures are skips by policy, so there is no failed variant: a
/// directory either gets processed (possibly with per-file errors counted
/// along the way) or is skipped wholesale.
#[derive(Debug)]
pub enum TaskOutcome {
    /// Directory was scanned and dispatched
    Success {
        path: PathBuf,
        subdirs: usize,
        files: usize,
        uploads: usize,
    },

    /// Directory was skipped (unreadable)
    Skipped { path: PathBuf, reason: String },
}

impl TaskOutcome {
    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success { .. })
    }

    /// Returns the path associated with this outcome
    pub fn path(&self) -> &PathBuf {
        match self {
            TaskOutcome::Success { path, .. } => path,
            TaskOutcome::Skipped { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let scan_err = ScanError::ReadDirFailed {
            path: PathBuf::from("/missing"),
            reason: "gone".into(),
        };
        let top: UploaderError = scan_err.into();
        assert!(matches!(top, UploaderError::Scan(_)));
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = TaskOutcome::Success {
            path: PathBuf::from("/data"),
            subdirs: 2,
            files: 3,
            uploads: 1,
        };
        assert!(ok.is_success());
        assert_eq!(ok.path(), &PathBuf::from("/data"));

        let skipped = TaskOutcome::Skipped {
            path: PathBuf::from("/data/locked"),
            reason: "permission denied".into(),
        };
        assert!(!skipped.is_success());
    }

    #[test]
    fn test_key_error_display() {
        let err = KeyError::OutsideBase {
            base: PathBuf::from("/data"),
            path: PathBuf::from("/other/file.jpg"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/other/file.jpg"));
        assert!(msg.contains("/data"));
    }
}
