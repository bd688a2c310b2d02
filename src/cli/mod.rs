//! Command line interface for the bundler.
//!
//! Parses arguments, sets up logging and runs a single bundling pass.

mod args;

pub use args::Args;

use crate::bundler::{BundleConfig, Bundler};
use crate::error::{CliError, Result};

/// Main CLI entry point
///
/// Returns the process exit code; fatal problems come back as errors for
/// `main` to print.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    init_logging(args.verbose);

    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let config = match &args.config {
        Some(path) => BundleConfig::load(path)?,
        None => BundleConfig::default(),
    };
    let settings = args.to_settings(config)?;

    let report = Bundler::new(settings).bundle().await?;

    if let Some(artifact) = &report.artifact {
        log::info!(
            "{} ({} bytes) sha256 {}",
            artifact.path.display(),
            artifact.size,
            artifact.checksum
        );
    }
    log::debug!(
        "{}: {} libraries, {} warning(s)",
        report.app_dir.display(),
        report.libraries.len(),
        report.warnings.len()
    );

    Ok(0)
}

/// Warnings only by default, everything with `--verbose`; `RUST_LOG` wins.
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
