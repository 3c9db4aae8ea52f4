//! Per-file progress stream.
//!
//! Every file the scan attempts produces exactly one line:
//! `path: fingerprint` on success, or the failure text of the
//! [`HashError`] otherwise. A directory that cannot be listed produces
//! one line with the [`ScanError`] text. [`ConsoleProgress`] writes these lines to
//! standard output (or any writer) as the scan runs; the final report is
//! written separately.

use std::io::{self, Stdout, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::scanner::{Fingerprint, HashError, ScanError};

/// Callbacks fired while a scan runs.
///
/// Implementations must be thread-safe: with more than one I/O thread the
/// callbacks arrive from several hashing workers at once.
pub trait ScanObserver: Send + Sync {
    /// Called when traversal of a root begins.
    fn on_root_start(&self, _root: &Path) {}

    /// Called after a file was fingerprinted.
    fn on_file_hashed(&self, path: &Path, fingerprint: &Fingerprint);

    /// Called when a file could not be read.
    fn on_file_failed(&self, error: &HashError);

    /// Called when a directory could not be listed.
    fn on_walk_error(&self, _error: &ScanError) {}
}

/// Writes the progress stream line by line.
pub struct ConsoleProgress<W: Write + Send = Stdout> {
    out: Mutex<W>,
}

impl ConsoleProgress<Stdout> {
    /// Progress stream on standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleProgress<W> {
    /// Progress stream on an arbitrary writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            out: Mutex::new(writer),
        }
    }

    /// Recover the writer, e.g. to inspect captured output.
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn line(&self, args: std::fmt::Arguments<'_>) {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // A closed stdout (e.g. piped into `head`) must not stop the scan.
        if let Err(e) = out.write_fmt(args).and_then(|()| out.write_all(b"\n")) {
            log::trace!("Progress line dropped: {}", e);
        }
    }
}

impl<W: Write + Send> ScanObserver for ConsoleProgress<W> {
    fn on_file_hashed(&self, path: &Path, fingerprint: &Fingerprint) {
        self.line(format_args!("{}: {}", path.display(), fingerprint));
    }

    fn on_file_failed(&self, error: &HashError) {
        self.line(format_args!("{}", error));
    }

    fn on_walk_error(&self, error: &ScanError) {
        self.line(format_args!("{}", error));
    }
}
