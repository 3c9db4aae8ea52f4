//! Output formatters for scan results.
//!
//! The only format is the line-oriented fingerprint report in [`report`].

pub mod report;

// Re-export main types
pub use report::{format_line, render, ReportError, ReportWriter, PARTIAL_MARKER};
