//! Scan configuration.
//!
//! Everything a scan needs is gathered into one [`ScanConfig`] value built
//! from the parsed command line, then handed to the finder and the report
//! writer. Nothing is read from process-wide state after this point.

use std::path::PathBuf;

use crate::cli::{Cli, KEY_EXCLUDE_PATHS, KEY_OUTPUT_FILE, KEY_PATHS};
use crate::duplicates::FinderConfig;
use crate::scanner::ExclusionSet;

/// Where the final report goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output
    #[default]
    Stdout,
    /// A file, created or truncated
    File(PathBuf),
}

/// Errors building a configuration from the command line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required `key=value` argument was not supplied.
    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(&'static str),
}

/// All parameters of one scan invocation.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Traversal roots, in the order given
    pub roots: Vec<PathBuf>,
    /// Directory exclusion fragments
    pub exclusions: ExclusionSet,
    /// Report destination
    pub output: OutputTarget,
    /// Hashing threads
    pub io_threads: usize,
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
    /// Drop single-member groups from the report
    pub duplicates_only: bool,
}

impl ScanConfig {
    /// Build the configuration from parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredArgument`] when `paths` is
    /// absent or lists no directory.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        for key in cli.unknown_keys() {
            log::warn!("Ignoring unknown argument '{}'", key);
        }

        let roots: Vec<PathBuf> = cli
            .value_of(KEY_PATHS)
            .map(split_list)
            .unwrap_or_default()
            .into_iter()
            .map(PathBuf::from)
            .collect();
        if roots.is_empty() {
            return Err(ConfigError::MissingRequiredArgument(KEY_PATHS));
        }

        let exclusions = cli
            .value_of(KEY_EXCLUDE_PATHS)
            .map(ExclusionSet::parse_list)
            .unwrap_or_default();

        let output = match cli.value_of(KEY_OUTPUT_FILE) {
            Some(path) if !path.is_empty() => OutputTarget::File(PathBuf::from(path)),
            _ => OutputTarget::Stdout,
        };

        Ok(Self {
            roots,
            exclusions,
            output,
            io_threads: cli.io_threads.max(1),
            follow_symlinks: cli.follow_symlinks,
            duplicates_only: cli.duplicates_only,
        })
    }

    /// Finder settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_exclusions(self.exclusions.clone())
            .with_follow_symlinks(self.follow_symlinks)
            .with_io_threads(self.io_threads)
    }
}

/// Split a comma-separated list, dropping empty items.
fn split_list(list: &str) -> Vec<&str> {
    list.split(',').filter(|item| !item.is_empty()).collect()
}
