//! s3-uploader - Parallel recent-file uploader
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use s3_uploader::config::{mask_secret, CliArgs, UploadConfig};
use s3_uploader::progress::{print_header, print_summary, ProgressReporter};
use s3_uploader::store::S3Store;
use s3_uploader::walker::UploadCoordinator;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments; a wrong argument count fails here with a usage
    // message, before any I/O
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    echo_args(&args);

    // Validate and create config
    let config = UploadConfig::from_args(&args).context("Invalid configuration")?;

    // Build the S3 client
    let store = S3Store::connect(&args.access_key, &args.secret_key, args.bucket.clone())
        .context("Failed to initialize S3 client")?;

    if config.show_progress {
        print_header(
            &config.start_path.display().to_string(),
            &config.bucket,
            config.worker_count,
            &config.threshold_utc().to_rfc3339(),
        );
    }

    // Create coordinator
    let show_progress = config.show_progress;
    let coordinator = UploadCoordinator::new(config, Arc::new(store));

    // Setup signal handler for graceful shutdown
    let shutdown_flag = coordinator.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let progress = if show_progress {
        Some(ProgressReporter::new())
    } else {
        None
    };

    if let Some(ref p) = progress {
        p.set_status("Scanning and uploading...");
    }

    // Run the walk-and-upload
    let result = coordinator.run(progress.as_ref()).context("Upload run failed")?;

    if let Some(ref p) = progress {
        if result.completed {
            p.finish("Upload complete");
        } else {
            p.finish("Upload interrupted");
        }
    }

    print_summary(&result);

    if !result.completed {
        info!("Run was interrupted before completion");
    }

    if result.errors > 0 {
        info!(errors = result.errors, "Run completed with errors");
    }

    Ok(())
}

/// Echo the received arguments before execution begins
///
/// The secret is masked here; everything else is printed verbatim.
fn echo_args(args: &CliArgs) {
    println!("recency window (days): {}", args.days);
    println!("access identifier: {}", args.access_key);
    println!("access secret: {}", mask_secret(&args.secret_key));
    println!("bucket: {}", args.bucket);
    println!("base path: {}", args.base_path.display());
    if let Some(ref subfolder) = args.subfolder {
        println!("subfolder: {}", subfolder);
    }
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("s3_uploader=debug,warn")
    } else {
        EnvFilter::new("s3_uploader=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
