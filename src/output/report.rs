//! Line-oriented duplicate report.
//!
//! One line per fingerprint group:
//!
//! ```text
//! <fingerprint-hex>: [<path1>, <path2>, ...] :<count>
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dupscan::duplicates::DuplicateFinder;
//! use dupscan::output::report::ReportWriter;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, _) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! let mut report = ReportWriter::new(std::io::stdout());
//! report.write_groups(&groups).unwrap();
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::config::OutputTarget;
use crate::duplicates::DuplicateGroup;

/// Marker written before the groups of an interrupted scan.
pub const PARTIAL_MARKER: &str = "# partial report: scan interrupted";

/// Errors that can occur while writing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The output file could not be created.
    #[error("Cannot create output file {path}: {source}")]
    Create {
        /// Requested output path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Format one group as a report line (without trailing newline).
#[must_use]
pub fn format_line(group: &DuplicateGroup) -> String {
    let paths = group
        .paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}: [{}] :{}", group.fingerprint, paths, group.len())
}

/// Render every group as a report line, in order.
#[must_use]
pub fn render(groups: &[DuplicateGroup]) -> Vec<String> {
    groups.iter().map(format_line).collect()
}

/// Writes report lines, flushing after each one.
pub struct ReportWriter<W: Write> {
    writer: W,
}

impl ReportWriter<Box<dyn Write>> {
    /// Open the destination chosen on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Create`] if the output file cannot be created.
    pub fn open(target: &OutputTarget) -> Result<Self, ReportError> {
        let writer: Box<dyn Write> = match target {
            OutputTarget::Stdout => Box::new(io::stdout()),
            OutputTarget::File(path) => {
                let file = File::create(path).map_err(|source| ReportError::Create {
                    path: path.clone(),
                    source,
                })?;
                log::debug!("Writing report to {}", path.display());
                Box::new(BufWriter::new(file))
            }
        };
        Ok(Self::new(writer))
    }
}

impl<W: Write> ReportWriter<W> {
    /// Wrap a writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write the partial-report marker line.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if writing fails.
    pub fn write_partial_marker(&mut self) -> Result<(), ReportError> {
        self.write_line(PARTIAL_MARKER)
    }

    /// Write one line per group, flushing after each.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` on the first failed write or flush.
    pub fn write_groups(&mut self, groups: &[DuplicateGroup]) -> Result<usize, ReportError> {
        for group in groups {
            self.write_line(&format_line(group))?;
        }
        Ok(groups.len())
    }

    fn write_line(&mut self, line: &str) -> Result<(), ReportError> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
