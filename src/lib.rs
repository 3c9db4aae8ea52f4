//! dupscan - duplicate content finder
//!
//! Walks one or more directory trees, fingerprints every regular file with
//! MD5 and reports the files that share a fingerprint. Nothing is deleted
//! or linked; the output is an audit report.

use std::sync::Arc;

use anyhow::Context;

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use cli::Cli;
use config::{OutputTarget, ScanConfig};
use duplicates::{retain_duplicates, DuplicateFinder};
use error::ExitCode;
use output::ReportWriter;
use progress::ConsoleProgress;

/// Run one scan as described by the command line.
///
/// Prints usage and returns [`ExitCode::MissingArgument`] when `paths` is
/// missing. Otherwise scans, streams per-file progress to stdout and
/// writes the report to the chosen target.
///
/// # Errors
///
/// Returns an error if the signal handler, the hashing pool or the report
/// destination cannot be set up, or if writing the report fails.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match ScanConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            println!("{}", cli::usage_text());
            return Ok(ExitCode::MissingArgument);
        }
    };

    log::debug!("Scan configuration: {:?}", config);

    let handler = signal::install_handler()?;

    // Open the destination before scanning so a bad path fails fast.
    let mut report = ReportWriter::open(&config.output)?;

    let mut finder_config = config
        .finder_config()
        .with_shutdown_flag(handler.get_flag())
        .with_observer(Arc::new(ConsoleProgress::stdout()));
    if let OutputTarget::File(ref path) = config.output {
        // The report may live inside a scanned root; it is not scan input.
        finder_config = finder_config.with_skip_file(path);
    }

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder
        .find_duplicates(&config.roots)
        .context("Scan failed")?;
    summary.log();

    let groups = if config.duplicates_only {
        retain_duplicates(groups)
    } else {
        groups
    };

    if summary.interrupted {
        report.write_partial_marker()?;
    }
    let written = report.write_groups(&groups).context("Failed to write report")?;
    log::info!("Reported {} group(s)", written);

    if summary.interrupted {
        Ok(ExitCode::Interrupted)
    } else {
        Ok(ExitCode::Success)
    }
}
