//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Scanning roots and fingerprinting every file ([`finder`])
//! - Accumulating paths per fingerprint ([`groups`])

pub mod finder;
pub mod groups;

pub use finder::{
    DuplicateFinder, FinderConfig, FinderError, ScanSummary, DEFAULT_IO_THREADS, MAX_RECORDED_ERRORS,
};
pub use groups::{retain_duplicates, DuplicateGroup, DuplicateGroups, GroupingStats};
