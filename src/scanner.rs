//! Local filesystem scanning and the recency filter
//!
//! A scan lists the immediate children of one directory, partitioned into
//! subdirectories and regular files. Nothing here recurses; recursion is
//! driven by the work queue, one task per directory.
//!
//! Symbolic links are neither descended nor uploaded: the entry type is
//! read from the directory entry without following links, which also rules
//! out symlink cycles.

use crate::error::ScanError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;

/// Immediate children of a directory, partitioned by type
#[derive(Debug, Default)]
pub struct DirListing {
    /// Immediate subdirectories
    pub subdirs: Vec<PathBuf>,

    /// Immediate regular files
    pub files: Vec<PathBuf>,
}

/// A file considered for upload: path plus the metadata the age filter
/// and statistics need. Transient within one task execution.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    /// Absolute file path
    pub path: PathBuf,

    /// Last-modified timestamp
    pub modified: SystemTime,

    /// File size in bytes
    pub size: u64,
}

impl FileCandidate {
    /// Read the metadata for a file
    ///
    /// Fails when the file vanished or became unreadable since the listing
    /// (race with deletion); callers skip the file and continue.
    pub fn load(path: PathBuf) -> Result<Self, ScanError> {
        let meta = fs::metadata(&path).map_err(|e| ScanError::MetadataFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let modified = meta.modified().map_err(|e| ScanError::MetadataFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            path,
            modified,
            size: meta.len(),
        })
    }
}

/// List the immediate children of a directory
///
/// Entries whose type cannot be determined are skipped with a warning.
/// Symlinks and special files land in neither list.
pub fn scan_directory(path: &Path) -> Result<DirListing, ScanError> {
    let entries = fs::read_dir(path).map_err(|e| ScanError::ReadDirFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut listing = DirListing::default();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %path.display(), error = %e, "Unreadable directory entry");
                continue;
            }
        };

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Failed to read entry type");
                continue;
            }
        };

        if file_type.is_dir() {
            listing.subdirs.push(entry.path());
        } else if file_type.is_file() {
            listing.files.push(entry.path());
        }
    }

    Ok(listing)
}

/// The age filter: true iff `modified` is strictly after `threshold`
pub fn qualifies(modified: SystemTime, threshold: SystemTime) -> bool {
    modified > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_scan_partitions_children() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub_a")).unwrap();
        fs::create_dir(dir.path().join("sub_b")).unwrap();
        File::create(dir.path().join("one.jpg")).unwrap();
        File::create(dir.path().join("two.jpg")).unwrap();
        File::create(dir.path().join("three.txt")).unwrap();

        let listing = scan_directory(dir.path()).unwrap();
        assert_eq!(listing.subdirs.len(), 2);
        assert_eq!(listing.files.len(), 3);

        // disjoint: nothing appears in both lists
        for sub in &listing.subdirs {
            assert!(!listing.files.contains(sub));
        }
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempdir().unwrap();
        let listing = scan_directory(dir.path()).unwrap();
        assert!(listing.subdirs.is_empty());
        assert!(listing.files.is_empty());
    }

    #[test]
    fn test_scan_missing_directory_is_error() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("removed-concurrently");
        let err = scan_directory(&gone).unwrap_err();
        assert!(matches!(err, ScanError::ReadDirFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("real.txt")).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("real.txt"),
            dir.path().join("link.txt"),
        )
        .unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let listing = scan_directory(dir.path()).unwrap();
        assert_eq!(listing.files, vec![dir.path().join("real.txt")]);
        assert!(listing.subdirs.is_empty());
    }

    #[test]
    fn test_candidate_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.bin");
        fs::write(&path, b"hello").unwrap();

        let candidate = FileCandidate::load(path.clone()).unwrap();
        assert_eq!(candidate.path, path);
        assert_eq!(candidate.size, 5);
        assert!(candidate.modified <= SystemTime::now());
    }

    #[test]
    fn test_candidate_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = FileCandidate::load(dir.path().join("vanished.jpg")).unwrap_err();
        assert!(matches!(err, ScanError::MetadataFailed { .. }));
    }

    #[test]
    fn test_qualifies_is_strict() {
        let threshold = SystemTime::now();

        assert!(qualifies(threshold + Duration::from_secs(1), threshold));
        // at the threshold exactly: excluded
        assert!(!qualifies(threshold, threshold));
        assert!(!qualifies(threshold - Duration::from_secs(1), threshold));
    }
}
