//! Object store client boundary
//!
//! The traversal core treats the remote store as an opaque blocking call:
//! `upload(key, source)` either succeeds or fails, and a failure never
//! halts the traversal. The trait seam keeps the S3 SDK out of the walker
//! and lets tests substitute in-memory stores.

pub mod s3;

use crate::error::StoreError;
use std::path::Path;

/// A remote object store accepting (destination key, source file) uploads
///
/// `upload` blocks the calling worker until the remote call completes or
/// fails. Implementations must be shareable across worker threads.
pub trait ObjectStore: Send + Sync {
    /// Upload one local file under the given key
    fn upload(&self, key: &str, source: &Path) -> Result<(), StoreError>;
}

pub use s3::S3Store;
