//! Progress reporting for the upload run
//!
//! Provides a live status line using indicatif plus styled header and
//! summary output.

use crate::walker::worker::RunTotals;
use crate::walker::UploadResult;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays run status
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display from a pool-state sample
    pub fn update(&self, active: usize, queued: usize, totals: &RunTotals) {
        let msg = format!(
            "Dirs: {} | Files: {} | Uploaded: {} ({}) | Queue: {} | Active: {}",
            format_number(totals.dirs_processed),
            format_number(totals.files_seen),
            format_number(totals.files_uploaded),
            format_size(totals.bytes_uploaded, BINARY),
            queued,
            active,
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of the run
pub fn print_header(source: &str, bucket: &str, workers: usize, threshold: &str) {
    use console::style;

    println!();
    println!(
        "{} {}",
        style("s3-uploader").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Source:").bold(), source);
    println!("  {} {}", style("Bucket:").bold(), bucket);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} files modified after {}", style("Window:").bold(), threshold);
    println!();
}

/// Print a summary of the run results
pub fn print_summary(result: &UploadResult) {
    use console::style;

    let title = if result.completed {
        style("Upload Complete").green().bold()
    } else {
        style("Upload Interrupted").yellow().bold()
    };

    println!();
    println!("{}", title);
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(result.dirs_processed)
    );
    println!(
        "  {} {}",
        style("Files seen:").bold(),
        format_number(result.files_seen)
    );
    println!(
        "  {} {} ({})",
        style("Uploaded:").bold(),
        format_number(result.files_uploaded),
        format_size(result.bytes_uploaded, BINARY)
    );
    println!(
        "  {} {:.1}s",
        style("Duration:").bold(),
        result.duration.as_secs_f64()
    );
    if result.dirs_skipped > 0 {
        println!(
            "  {} {}",
            style("Skipped dirs:").yellow().bold(),
            format_number(result.dirs_skipped)
        );
    }
    if result.errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(result.errors)
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }
}
