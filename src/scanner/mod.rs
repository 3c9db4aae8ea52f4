//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - Depth-first directory walking using walkdir
//! - Subtree pruning by exclusion fragments
//! - Whole-file MD5 content fingerprints
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`exclusion`]: Substring-based directory exclusion
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: MD5 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupscan::scanner::{ExclusionSet, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     exclusions: ExclusionSet::parse_list("node_modules,.git"),
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}", file.path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod exclusion;
pub mod hasher;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use exclusion::ExclusionSet;
pub use hasher::{Fingerprint, Hasher, ParseFingerprintError, READ_BUFFER_SIZE};
pub use walker::Walker;

/// A regular file discovered during traversal.
///
/// Only lives between discovery and hashing; the aggregator keeps the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file, as produced by the walk (OS-native separators)
    pub path: PathBuf,
    /// Whether the path is a symbolic link resolving to a file
    pub is_symlink: bool,
}

impl FileEntry {
    /// Create a new FileEntry for a plain file.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            is_symlink: false,
        }
    }

    /// Create a new FileEntry for a symlink that is hashed through its target.
    #[must_use]
    pub fn symlink(path: PathBuf) -> Self {
        Self {
            path,
            is_symlink: true,
        }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into symlinked directories.
    /// Cycles are detected by walkdir and reported as walk errors.
    pub follow_symlinks: bool,

    /// Directories whose path contains any of these fragments are pruned.
    pub exclusions: ExclusionSet,

    /// Canonical path of a file never to yield, e.g. the report being written.
    pub skip_file: Option<PathBuf>,
}

impl WalkerConfig {
    /// Create a new walker configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool, exclusions: ExclusionSet) -> Self {
        Self {
            follow_symlinks,
            exclusions,
            skip_file: None,
        }
    }

    /// Never yield the file at `path`.
    ///
    /// The path is canonicalized here; a path that does not exist yet
    /// cannot be matched and is ignored.
    #[must_use]
    pub fn with_skip_file(mut self, path: &std::path::Path) -> Self {
        match std::fs::canonicalize(path) {
            Ok(canonical) => self.skip_file = Some(canonical),
            Err(e) => log::debug!("Not skipping {}: {}", path.display(), e),
        }
        self
    }
}

/// Errors that can occur while listing directories.
///
/// None of these abort a scan; the affected directory is skipped.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when listing a directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path vanished or never existed.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Following symlinks led back to an ancestor directory.
    #[error("Symlink loop detected: {0}")]
    SymlinkLoop(PathBuf),

    /// An I/O error occurred while listing a directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Classified failures from hashing a single file.
///
/// The display text doubles as the diagnostic line written to the
/// progress stream.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The process lacks rights to read the file.
    #[error("Could not read: {0}")]
    PermissionDenied(PathBuf),

    /// The file disappeared between listing and reading.
    #[error("Could not find: {0}")]
    NotFound(PathBuf),

    /// The system could not allocate memory while reading the file.
    #[error("Memory Error reading: {0}")]
    OutOfMemory(PathBuf),

    /// Any other read failure.
    #[error("OS Error: {source} Error reading: {path}")]
    Io {
        /// Path of the file being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while opening or reading `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            ErrorKind::NotFound => Self::NotFound(path),
            ErrorKind::OutOfMemory => Self::OutOfMemory(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(path) | Self::NotFound(path) | Self::OutOfMemory(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
