//! Command-line interface definitions for dupscan.
//!
//! Scan parameters are given as order-independent `key=value` tokens;
//! tuning knobs are ordinary flags.
//!
//! # Example
//!
//! ```bash
//! # Scan two trees, skipping any .git or node_modules directory
//! dupscan paths=/srv/photos,/mnt/backup exclude_paths=.git,node_modules
//!
//! # Write the report to a file instead of stdout
//! dupscan paths=/data output_file=/tmp/duplicates.txt
//!
//! # Only list real duplicates, hash with 8 threads, debug logging
//! dupscan -v --duplicates-only --io-threads 8 paths=/data
//! ```

use clap::Parser;

/// Key naming the directories to scan (required).
pub const KEY_PATHS: &str = "paths";
/// Key naming the exclusion fragments.
pub const KEY_EXCLUDE_PATHS: &str = "exclude_paths";
/// Key naming the report file.
pub const KEY_OUTPUT_FILE: &str = "output_file";

const KNOWN_KEYS: [&str; 3] = [KEY_PATHS, KEY_EXCLUDE_PATHS, KEY_OUTPUT_FILE];

/// Find files with identical content.
///
/// Walks every directory in `paths`, fingerprints each file with MD5 and
/// prints one line per fingerprint listing the files that share it.
#[derive(Debug, Parser)]
#[command(name = "dupscan")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "dupscan [OPTIONS] paths=<DIRS> [exclude_paths=<FRAGMENTS>] [output_file=<FILE>]")]
pub struct Cli {
    /// Scan arguments: paths=<comma-separated dirs>, exclude_paths=<comma-separated fragments>, output_file=<file>
    #[arg(value_name = "KEY=VALUE", value_parser = parse_scan_arg)]
    pub args: Vec<ScanArg>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Number of threads hashing files (1 = sequential, in discovery order)
    #[arg(long, value_name = "N", default_value = "4", env = "DUPSCAN_IO_THREADS", value_parser = parse_io_threads)]
    pub io_threads: usize,

    /// Only report fingerprints shared by two or more files
    #[arg(long)]
    pub duplicates_only: bool,

    /// Descend into symlinked directories
    #[arg(long)]
    pub follow_symlinks: bool,
}

/// One `key=value` token from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanArg {
    /// Key as typed
    pub key: String,
    /// Everything after the first `=`
    pub value: String,
}

impl ScanArg {
    /// Whether this token's key equals `name`, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name)
    }
}

/// Parse a `key=value` token.
///
/// # Errors
///
/// Returns an error message if the token has no `=` or an empty key.
pub fn parse_scan_arg(s: &str) -> Result<ScanArg, String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok(ScanArg {
            key: key.trim().to_string(),
            value: value.to_string(),
        }),
        Some(_) => Err(format!("missing key in '{}'", s)),
        None => Err(format!("expected key=value, got '{}'", s)),
    }
}

fn parse_io_threads(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if n == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(n)
}

impl Cli {
    /// Value of `key` (case-insensitive); the last occurrence wins.
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .rev()
            .find(|arg| arg.is(key))
            .map(|arg| arg.value.as_str())
    }

    /// Keys that dupscan does not recognise.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .filter(|arg| !KNOWN_KEYS.iter().any(|known| arg.is(known)))
            .map(|arg| arg.key.as_str())
    }
}

/// Usage text printed when `paths` is missing.
#[must_use]
pub fn usage_text() -> String {
    format!(
        "\
Usage:
    dupscan [OPTIONS] paths=Paths [exclude_paths=ExcludePaths] [output_file=OutputFile]

    Arguments:
        paths:                    Comma-separated directories to scan
        exclude_paths (optional): Comma-separated fragments; directories whose path contains one are skipped
        output_file (optional):   File to write the report to (default: standard output)

    Example:
        dupscan paths=/home/user,/mnt/backup exclude_paths=.Trash,node_modules output_file=/tmp/duplicate_files.txt

    Run 'dupscan --help' for all options (version {}).",
        env!("CARGO_PKG_VERSION")
    )
}
