//! Duplicate finder: walks every root, hashes every file, groups by fingerprint.
//!
//! # Overview
//!
//! For each root, a [`Walker`] yields regular files in depth-first order
//! with excluded subtrees already pruned. Each file is fingerprinted and
//! its path appended to the shared [`DuplicateGroups`]. A file that cannot
//! be read is reported and left out; the scan always moves on.
//!
//! With `io_threads == 1` hashing runs inline, in discovery order. With
//! more threads, files are handed to a dedicated rayon pool of that size,
//! which also caps how many files are open at once.
//!
//! # Example
//!
//! ```no_run
//! use dupscan::duplicates::{DuplicateFinder, FinderConfig};
//! use dupscan::scanner::ExclusionSet;
//! use std::path::{Path, PathBuf};
//!
//! let config = FinderConfig::default()
//!     .with_exclusions(ExclusionSet::parse_list(".git,node_modules"))
//!     .with_io_threads(4);
//! let finder = DuplicateFinder::new(config);
//!
//! let (groups, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//! println!("{} duplicate groups", summary.duplicate_groups);
//! # let _ = groups;
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use rayon::iter::{ParallelBridge, ParallelIterator};

use super::groups::{DuplicateGroup, DuplicateGroups, GroupingStats};
use crate::progress::ScanObserver;
use crate::scanner::{ExclusionSet, FileEntry, Hasher, ScanError, Walker, WalkerConfig};

/// Default number of hashing threads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Most errors kept in [`ScanSummary::errors`]; the counters stay exact.
pub const MAX_RECORDED_ERRORS: usize = 1000;

/// Configuration for a duplicate scan.
#[derive(Clone)]
pub struct FinderConfig {
    /// Walker settings shared by every root.
    pub walker_config: WalkerConfig,
    /// Number of hashing threads; also the cap on simultaneously open files.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional receiver of per-file progress.
    pub observer: Option<Arc<dyn ScanObserver>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field("observer", &self.observer.as_ref().map(|_| "<observer>"))
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            io_threads: DEFAULT_IO_THREADS,
            shutdown_flag: None,
            observer: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the exclusion fragments.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.walker_config.exclusions = exclusions;
        self
    }

    /// Follow symlinked directories.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.walker_config.follow_symlinks = follow;
        self
    }

    /// Leave out the file at `path` (e.g. the report file) wherever it is found.
    #[must_use]
    pub fn with_skip_file(mut self, path: &Path) -> Self {
        self.walker_config = self.walker_config.with_skip_file(path);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary of a completed (or interrupted) scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Roots scanned, in the order given
    pub roots: Vec<PathBuf>,
    /// Files fingerprinted successfully
    pub files_hashed: usize,
    /// Files that could not be read
    pub failed_files: usize,
    /// Directories (or other entries) that could not be listed
    pub skipped_dirs: usize,
    /// Directories pruned by the exclusion set
    pub excluded_dirs: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Distinct fingerprints
    pub total_groups: usize,
    /// Fingerprints shared by two or more files
    pub duplicate_groups: usize,
    /// Redundant copies (members beyond the first of each duplicate group)
    pub duplicate_files: usize,
    /// Wall time of the scan
    pub scan_duration: Duration,
    /// Whether a shutdown request left files or roots unscanned
    pub interrupted: bool,
    /// Non-fatal errors encountered during the scan, at most
    /// [`MAX_RECORDED_ERRORS`] of them
    pub errors: Vec<ScanError>,
    /// Errors counted but not kept because the cap was reached
    pub errors_dropped: usize,
}

impl ScanSummary {
    /// Log the summary at info level.
    pub fn log(&self) {
        log::info!(
            "Scanned {} root(s): {} files hashed ({} bytes), {} failed, {} directories skipped, {} excluded",
            self.roots.len(),
            self.files_hashed,
            self.bytes_hashed,
            self.failed_files,
            self.skipped_dirs,
            self.excluded_dirs
        );
        log::info!(
            "{} distinct fingerprints, {} duplicate groups, {} redundant copies in {:.2?}",
            self.total_groups,
            self.duplicate_groups,
            self.duplicate_files,
            self.scan_duration
        );
        if self.interrupted {
            log::warn!("Scan was interrupted; results cover only files hashed before the stop");
        }
    }
}

/// Errors that abort a whole scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No roots were supplied.
    #[error("No paths to scan")]
    NoRoots,

    /// The hashing thread pool could not be created.
    #[error("Failed to build hashing thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Counters shared by hashing workers.
#[derive(Default)]
struct ScanTally {
    files_hashed: AtomicUsize,
    failed_files: AtomicUsize,
    skipped_dirs: AtomicUsize,
    bytes_hashed: AtomicU64,
    errors_dropped: AtomicUsize,
    interrupted: AtomicBool,
    errors: Mutex<Vec<ScanError>>,
}

impl ScanTally {
    fn push_error(&self, error: ScanError) {
        let mut errors = self.errors.lock().unwrap_or_else(PoisonError::into_inner);
        if errors.len() < MAX_RECORDED_ERRORS {
            errors.push(error);
        } else if self.errors_dropped.fetch_add(1, Ordering::Relaxed) == 0 {
            log::debug!(
                "More than {} errors; further errors are only counted",
                MAX_RECORDED_ERRORS
            );
        }
    }

    fn mark_interrupted(&self) {
        self.interrupted.store(true, Ordering::Relaxed);
    }
}

/// Drop roots that repeat or sit inside another root.
///
/// Scanning them would list the same files twice, and every such file would
/// then look like a duplicate of itself. The comparison is lexical.
fn effective_roots(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut kept: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for root in roots {
        if kept.iter().any(|k| root.starts_with(k)) {
            log::info!("Skipping {}: already covered by another root", root.display());
            continue;
        }
        kept.retain(|k| {
            let nested = k.starts_with(root);
            if nested {
                log::info!("Skipping {}: already covered by {}", k.display(), root.display());
            }
            !nested
        });
        kept.push(root.clone());
    }
    kept
}

/// Duplicate finder that runs the walk-hash-group pipeline.
///
/// # Example
///
/// ```no_run
/// use dupscan::duplicates::DuplicateFinder;
/// use std::path::{Path, PathBuf};
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates(&[PathBuf::from("/srv/photos")]) {
///     Ok((groups, summary)) => {
///         println!("{} fingerprints, {} duplicated", groups.len(), summary.duplicate_groups);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Scan every root and group the files found by content fingerprint.
    ///
    /// Returns every group, including single-member ones, in the order
    /// their fingerprint was first seen. Unreadable files and directories
    /// are counted in the summary and never abort the scan. On shutdown the
    /// groups contain only files hashed before the stop and
    /// [`ScanSummary::interrupted`] is set.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if no roots are given or the hashing pool
    /// cannot be built.
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if roots.is_empty() {
            return Err(FinderError::NoRoots);
        }

        let start_time = Instant::now();
        let groups = DuplicateGroups::new();
        let tally = ScanTally::default();
        let mut excluded_dirs = 0;

        let pool = if self.config.io_threads > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.config.io_threads)
                    .thread_name(|i| format!("dupscan-hash-{}", i))
                    .build()?,
            )
        } else {
            None
        };

        for root in effective_roots(roots) {
            if self.config.is_shutdown_requested() {
                tally.mark_interrupted();
                break;
            }

            log::info!("Scanning {}", root.display());
            if let Some(ref observer) = self.config.observer {
                observer.on_root_start(&root);
            }

            let mut walker = Walker::new(&root, self.config.walker_config.clone());
            if let Some(ref flag) = self.config.shutdown_flag {
                walker = walker.with_shutdown_flag(flag.clone());
            }

            match pool {
                Some(ref pool) => pool.install(|| {
                    walker
                        .walk()
                        .par_bridge()
                        .for_each(|item| self.process(item, &groups, &tally));
                }),
                None => walker
                    .walk()
                    .for_each(|item| self.process(item, &groups, &tally)),
            }

            excluded_dirs += walker.excluded_dirs();
            if walker.stopped_early() {
                tally.mark_interrupted();
            }
        }

        let groups = groups.into_groups();
        let stats = GroupingStats::from_groups(&groups);
        let summary = ScanSummary {
            roots: roots.to_vec(),
            files_hashed: tally.files_hashed.into_inner(),
            failed_files: tally.failed_files.into_inner(),
            skipped_dirs: tally.skipped_dirs.into_inner(),
            excluded_dirs,
            bytes_hashed: tally.bytes_hashed.into_inner(),
            total_groups: stats.total_groups,
            duplicate_groups: stats.duplicate_groups,
            duplicate_files: stats.duplicate_files,
            scan_duration: start_time.elapsed(),
            interrupted: tally.interrupted.into_inner(),
            errors: tally
                .errors
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            errors_dropped: tally.errors_dropped.into_inner(),
        };

        Ok((groups, summary))
    }

    /// Hash one walk result and record the outcome.
    fn process(
        &self,
        item: Result<FileEntry, ScanError>,
        groups: &DuplicateGroups,
        tally: &ScanTally,
    ) {
        let file = match item {
            Ok(file) => file,
            Err(e) => {
                if let Some(ref observer) = self.config.observer {
                    observer.on_walk_error(&e);
                }
                tally.skipped_dirs.fetch_add(1, Ordering::Relaxed);
                tally.push_error(e);
                return;
            }
        };

        // Files already queued when shutdown arrives are dropped, not half-read.
        if self.config.is_shutdown_requested() {
            tally.mark_interrupted();
            return;
        }

        match self.hasher.hash_counted(&file.path) {
            Ok((fingerprint, bytes)) => {
                log::trace!("{}: {}", file.path.display(), fingerprint);
                if let Some(ref observer) = self.config.observer {
                    observer.on_file_hashed(&file.path, &fingerprint);
                }
                tally.files_hashed.fetch_add(1, Ordering::Relaxed);
                tally.bytes_hashed.fetch_add(bytes, Ordering::Relaxed);
                groups.append(fingerprint, file.path);
            }
            Err(e) => {
                log::debug!("Failed to hash {}: {}", file.path.display(), e);
                if let Some(ref observer) = self.config.observer {
                    observer.on_file_failed(&e);
                }
                tally.failed_files.fetch_add(1, Ordering::Relaxed);
                tally.push_error(ScanError::Hash(e));
            }
        }
    }
}
