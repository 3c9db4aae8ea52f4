//! Logging setup for dupscan.
//!
//! Diagnostics use the `log` facade with an `env_logger` backend writing to
//! stderr, so they never mix with the per-file progress lines or the
//! report on stdout. The level comes from, in priority order:
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. `--quiet` (error only) or `--verbose` (debug, or trace with `-vv`)
//! 3. Default: info

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem.
///
/// Call once, at startup, before any log macro fires. A second call is
/// ignored (logged at debug) rather than panicking, so tests driving
/// [`crate::run_app`] repeatedly stay safe.
///
/// * `verbose` - Verbosity count from CLI (0=info, 1=debug, 2+=trace)
/// * `quiet` - Only show errors (overridden by `RUST_LOG`)
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    let from_env = env::var("RUST_LOG").is_ok();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if verbose >= 1 {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                buf.timestamp_millis(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        }
    });

    match builder.try_init() {
        Ok(()) if from_env => log::debug!("Logging configured from RUST_LOG"),
        Ok(()) => log::debug!(
            "Logging initialized at level: {:?}",
            determine_level(verbose, quiet)
        ),
        Err(e) => log::debug!("Logger already initialized: {}", e),
    }
}

/// Map CLI flags to a level filter.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
