//! Destination key derivation
//!
//! A destination key is the source path relative to the base directory,
//! `/`-separated, with no leading separator. The mapping is a pure prefix
//! strip with no normalization, so two distinct files never collide.

use crate::error::KeyError;
use std::path::Path;

/// Derive the object key for a file under the base directory
pub fn derive_key(base: &Path, file: &Path) -> Result<String, KeyError> {
    let relative = file.strip_prefix(base).map_err(|_| KeyError::OutsideBase {
        base: base.to_path_buf(),
        path: file.to_path_buf(),
    })?;

    let key = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_key_at_base_root() {
        let key = derive_key(Path::new("/data"), Path::new("/data/a.jpg")).unwrap();
        assert_eq!(key, "a.jpg");
    }

    #[test]
    fn test_key_in_subdirectory() {
        let key = derive_key(Path::new("/data"), Path::new("/data/sub/c.jpg")).unwrap();
        assert_eq!(key, "sub/c.jpg");
    }

    #[test]
    fn test_key_relative_to_base_not_subfolder() {
        // traversal may start at /data/pics, keys stay relative to /data
        let key = derive_key(Path::new("/data"), Path::new("/data/pics/x.jpg")).unwrap();
        assert_eq!(key, "pics/x.jpg");
    }

    #[test]
    fn test_key_never_starts_with_separator() {
        let key = derive_key(Path::new("/"), Path::new("/top.txt")).unwrap();
        assert_eq!(key, "top.txt");

        let deep = derive_key(Path::new("/a/b"), Path::new("/a/b/c/d/e.bin")).unwrap();
        assert!(!deep.starts_with('/'));
        assert_eq!(deep, "c/d/e.bin");
    }

    #[test]
    fn test_distinct_files_distinct_keys() {
        let base = Path::new("/data");
        let paths = [
            PathBuf::from("/data/a.jpg"),
            PathBuf::from("/data/sub/a.jpg"),
            PathBuf::from("/data/sub/b.jpg"),
            PathBuf::from("/data/sub/deep/a.jpg"),
        ];

        let mut keys: Vec<String> = paths
            .iter()
            .map(|p| derive_key(base, p).unwrap())
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), paths.len());
    }

    #[test]
    fn test_path_outside_base_is_error() {
        let err = derive_key(Path::new("/data"), Path::new("/other/x.jpg")).unwrap_err();
        assert!(matches!(err, KeyError::OutsideBase { .. }));
    }
}
