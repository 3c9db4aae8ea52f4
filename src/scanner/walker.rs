//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one root
//! depth-first and yielding the regular files it contains. walkdir keeps
//! its own stack of open directories, so deep trees do not grow the call
//! stack.
//!
//! # Features
//!
//! - Lexical sibling order for deterministic sequential scans
//! - Subtree pruning via [`ExclusionSet`](super::ExclusionSet), checked at every directory
//! - Optional symlink following with walkdir's loop detection
//! - Unreadable directories yielded as errors, never fatal
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupscan::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for file discovery under a single root.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Directories pruned by the exclusion set so far
    excluded_dirs: AtomicUsize,
    /// Set when the shutdown flag ended the walk with entries left
    stopped_early: AtomicBool,
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            excluded_dirs: AtomicUsize::new(0),
            stopped_early: AtomicBool::new(false),
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// Once the flag is set, the iterator returned by [`Walker::walk`]
    /// ends at the next entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Root this walker starts from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of directories pruned by exclusion during the walk so far.
    #[must_use]
    pub fn excluded_dirs(&self) -> usize {
        self.excluded_dirs.load(Ordering::Relaxed)
    }

    /// Whether a shutdown request cut the walk short.
    ///
    /// A request arriving after the last entry was yielded leaves this false.
    #[must_use]
    pub fn stopped_early(&self) -> bool {
        self.stopped_early.load(Ordering::Relaxed)
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the tree, yielding regular files.
    ///
    /// Directories whose path contains an exclusion fragment are neither
    /// read nor descended into; the root is subject to the same check.
    /// Listing failures are yielded as [`ScanError`] values and the walk
    /// continues with the next sibling.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + Send + '_ {
        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| self.keep_entry(entry))
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    self.stopped_early.store(true, Ordering::Relaxed);
                    return false;
                }
                true
            })
            .filter_map(move |result| match result {
                Ok(entry) => self.process_entry(entry),
                Err(e) => Some(Err(self.convert_error(e))),
            })
    }

    /// Exclusion check, run by walkdir before a directory is opened.
    fn keep_entry(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return true;
        }

        match self.config.exclusions.matching_fragment(entry.path()) {
            Some(fragment) => {
                log::debug!(
                    "Excluding directory {} (matches '{}')",
                    entry.path().display(),
                    fragment
                );
                self.excluded_dirs.fetch_add(1, Ordering::Relaxed);
                false
            }
            None => true,
        }
    }

    /// Turn a walk entry into a file to hash, or skip it.
    fn process_entry(&self, entry: DirEntry) -> Option<Result<FileEntry, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }

        if file_type.is_file() {
            if self.is_skip_file(&entry) {
                log::debug!("Skipping {}: output of this scan", entry.path().display());
                return None;
            }
            log::trace!("Found file: {}", entry.path().display());
            return Some(Ok(FileEntry::new(entry.into_path())));
        }

        if file_type.is_symlink() {
            // Only reachable when links are not followed.
            return match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_dir() => {
                    log::trace!("Not following directory symlink: {}", entry.path().display());
                    None
                }
                Ok(meta) if !meta.is_file() => {
                    log::trace!("Skipping symlink to special file: {}", entry.path().display());
                    None
                }
                // Dangling links reach the hasher so they are reported like a vanished file.
                _ => Some(Ok(FileEntry::symlink(entry.into_path()))),
            };
        }

        log::trace!("Skipping special file: {}", entry.path().display());
        None
    }

    /// Whether `entry` is the configured skip file.
    ///
    /// Only entries with a matching file name are canonicalized.
    fn is_skip_file(&self, entry: &DirEntry) -> bool {
        let Some(ref skip) = self.config.skip_file else {
            return false;
        };
        if skip.file_name() != Some(entry.file_name()) {
            return false;
        }
        fs::canonicalize(entry.path()).is_ok_and(|p| p == *skip)
    }

    /// Convert a walkdir error into a ScanError.
    fn convert_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if error.loop_ancestor().is_some() {
            log::warn!("Symlink loop detected: {}", path.display());
            return ScanError::SymlinkLoop(path);
        }

        match error.io_error().map(io::Error::kind) {
            Some(io::ErrorKind::PermissionDenied) => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            Some(io::ErrorKind::NotFound) => {
                log::warn!("Path not found: {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("Walker error for {}: {}", path.display(), error);
                let message = error.to_string();
                let source = error
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other(message));
                ScanError::Io { path, source }
            }
        }
    }
}
