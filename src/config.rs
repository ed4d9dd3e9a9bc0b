//! Configuration types for s3-uploader
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - The recency threshold computation

use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Default worker pool capacity
const DEFAULT_WORKERS: usize = 20;

/// Seconds per day, for the recency window arithmetic
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Parallel uploader for recently modified files
#[derive(Parser, Debug, Clone)]
#[command(
    name = "s3-uploader",
    version,
    about = "Uploads files modified within the last DAYS days to an S3 bucket",
    long_about = "Walks a local directory tree in parallel and uploads every file whose\n\
                  modification time falls within the recency window to an S3 bucket.\n\n\
                  Destination keys are the file paths relative to BASE_PATH, so the\n\
                  bucket mirrors the local layout.",
    after_help = "EXAMPLES:\n    \
        s3-uploader 5 AKIA... secret my-bucket /home/user/photos\n    \
        s3-uploader 2 AKIA... secret my-bucket /data pics/incoming\n    \
        s3-uploader 7 AKIA... secret my-bucket /srv/media -w 8 -v"
)]
pub struct CliArgs {
    /// Recency window in days; files modified at or before now-DAYS are skipped
    #[arg(value_name = "DAYS")]
    pub days: u64,

    /// Store access identifier
    #[arg(value_name = "ACCESS_KEY")]
    pub access_key: String,

    /// Store access secret
    #[arg(value_name = "SECRET_KEY")]
    pub secret_key: String,

    /// Target bucket name
    #[arg(value_name = "BUCKET")]
    pub bucket: String,

    /// Absolute local base path; destination keys are derived relative to it
    #[arg(value_name = "BASE_PATH")]
    pub base_path: PathBuf,

    /// Optional subfolder to restrict the traversal to; keys stay relative
    /// to BASE_PATH
    #[arg(value_name = "SUBFOLDER")]
    pub subfolder: Option<String>,

    /// Number of concurrent upload workers
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS, value_name = "NUM")]
    pub workers: usize,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (per-directory detail)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
///
/// Constructed once at startup and shared read-only (behind an `Arc`)
/// between the coordinator and every worker.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Key-derivation root; always absolute
    pub base_path: PathBuf,

    /// Directory the traversal is seeded with (base_path, or
    /// base_path/subfolder when a subfolder was given)
    pub start_path: PathBuf,

    /// Files modified at or before this instant are excluded. Computed once
    /// at startup; a long-running traversal does not expire files mid-run.
    pub threshold: SystemTime,

    /// The recency window in days, kept for display
    pub recency_days: u64,

    /// Target bucket name
    pub bucket: String,

    /// Worker pool capacity
    pub worker_count: usize,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl UploadConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        if !args.base_path.is_absolute() {
            return Err(ConfigError::BasePathNotAbsolute {
                path: args.base_path.clone(),
            });
        }

        match std::fs::metadata(&args.base_path) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(ConfigError::BasePathInvalid {
                    path: args.base_path.clone(),
                    reason: "not a directory".into(),
                })
            }
            Err(e) => {
                return Err(ConfigError::BasePathInvalid {
                    path: args.base_path.clone(),
                    reason: e.to_string(),
                })
            }
        }

        let start_path = match args.subfolder.as_deref() {
            Some(sub) => {
                let trimmed = sub.trim_matches('/');
                if trimmed.is_empty() {
                    args.base_path.clone()
                } else {
                    args.base_path.join(trimmed)
                }
            }
            None => args.base_path.clone(),
        };

        match std::fs::metadata(&start_path) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(ConfigError::StartPathInvalid {
                    path: start_path,
                    reason: "not a directory".into(),
                })
            }
            Err(e) => {
                return Err(ConfigError::StartPathInvalid {
                    path: start_path,
                    reason: e.to_string(),
                })
            }
        }

        let threshold = recency_threshold(SystemTime::now(), args.days)
            .ok_or(ConfigError::WindowTooLarge { days: args.days })?;

        Ok(Self {
            base_path: args.base_path.clone(),
            start_path,
            threshold,
            recency_days: args.days,
            bucket: args.bucket.clone(),
            worker_count: args.workers,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }

    /// The threshold as a UTC datetime, for display
    pub fn threshold_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.threshold)
    }
}

/// Compute the recency threshold: `now - days`
///
/// Returns None when the subtraction underflows the representable range.
pub fn recency_threshold(now: SystemTime, days: u64) -> Option<SystemTime> {
    days.checked_mul(SECONDS_PER_DAY)
        .and_then(|secs| now.checked_sub(Duration::from_secs(secs)))
}

/// Mask a secret for echoing: first two characters, then asterisks
pub fn mask_secret(secret: &str) -> String {
    if secret.len() <= 4 {
        return "****".to_string();
    }
    let visible: String = secret.chars().take(2).collect();
    format!("{}{}", visible, "*".repeat(secret.len() - 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn base_args(base: PathBuf) -> CliArgs {
        CliArgs {
            days: 2,
            access_key: "AKIAEXAMPLE".into(),
            secret_key: "super-secret".into(),
            bucket: "my-bucket".into(),
            base_path: base,
            subfolder: None,
            workers: 20,
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn test_config_from_args() {
        let dir = tempdir().unwrap();
        let args = base_args(dir.path().to_path_buf());

        let config = UploadConfig::from_args(&args).unwrap();
        assert_eq!(config.base_path, dir.path());
        assert_eq!(config.start_path, dir.path());
        assert_eq!(config.worker_count, 20);
        assert_eq!(config.recency_days, 2);
        assert!(config.threshold < SystemTime::now());
    }

    #[test]
    fn test_subfolder_joins_and_trims() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("pics")).unwrap();

        let mut args = base_args(dir.path().to_path_buf());
        args.subfolder = Some("/pics/".into());

        let config = UploadConfig::from_args(&args).unwrap();
        assert_eq!(config.start_path, dir.path().join("pics"));
        // keys stay relative to the base, not the subfolder
        assert_eq!(config.base_path, dir.path());
    }

    #[test]
    fn test_empty_subfolder_falls_back_to_base() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path().to_path_buf());
        args.subfolder = Some("//".into());

        let config = UploadConfig::from_args(&args).unwrap();
        assert_eq!(config.start_path, dir.path());
    }

    #[test]
    fn test_invalid_worker_count() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path().to_path_buf());
        args.workers = 0;
        assert!(matches!(
            UploadConfig::from_args(&args),
            Err(ConfigError::InvalidWorkerCount { .. })
        ));

        args.workers = MAX_WORKERS + 1;
        assert!(matches!(
            UploadConfig::from_args(&args),
            Err(ConfigError::InvalidWorkerCount { .. })
        ));
    }

    #[test]
    fn test_relative_base_path_rejected() {
        let mut args = base_args(PathBuf::from("relative/path"));
        args.workers = 4;
        assert!(matches!(
            UploadConfig::from_args(&args),
            Err(ConfigError::BasePathNotAbsolute { .. })
        ));
    }

    #[test]
    fn test_missing_subfolder_rejected() {
        let dir = tempdir().unwrap();
        let mut args = base_args(dir.path().to_path_buf());
        args.subfolder = Some("does-not-exist".into());
        assert!(matches!(
            UploadConfig::from_args(&args),
            Err(ConfigError::StartPathInvalid { .. })
        ));
    }

    #[test]
    fn test_recency_threshold_arithmetic() {
        let now = SystemTime::now();
        let threshold = recency_threshold(now, 2).unwrap();
        let delta = now.duration_since(threshold).unwrap();
        assert_eq!(delta, Duration::from_secs(2 * SECONDS_PER_DAY));

        // zero days means "modified strictly after now" - nothing qualifies
        assert_eq!(recency_threshold(now, 0).unwrap(), now);

        assert!(recency_threshold(now, u64::MAX).is_none());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("super-secret"), "su**********");
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
