//! Fingerprint grouping.
//!
//! # Overview
//!
//! [`DuplicateGroups`] is the append-only accumulator the traversal writes
//! into: fingerprint in, path appended to that fingerprint's group. It is
//! safe to share between hashing workers. Groups are kept in the order
//! their fingerprint was first seen and paths in the order they were
//! appended.
//!
//! # Example
//!
//! ```
//! use dupscan::duplicates::DuplicateGroups;
//! use dupscan::scanner::Fingerprint;
//! use std::path::PathBuf;
//!
//! let groups = DuplicateGroups::new();
//! let hello = Fingerprint::of_bytes(b"hello");
//! groups.append(hello, PathBuf::from("/a/x.txt"));
//! groups.append(hello, PathBuf::from("/a/b/y.txt"));
//! groups.append(Fingerprint::of_bytes(b"world"), PathBuf::from("/a/z.txt"));
//!
//! let snapshot = groups.into_groups();
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!(snapshot[0].len(), 2);
//! assert!(!snapshot[1].is_duplicate());
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::scanner::Fingerprint;

/// Paths sharing one content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// MD5 fingerprint shared by every path in the group
    pub fingerprint: Fingerprint,
    /// Paths in discovery order
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a group with its first member.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, first: PathBuf) -> Self {
        Self {
            fingerprint,
            paths: vec![first],
        }
    }

    /// Number of paths in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// True when at least two paths share the fingerprint.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.paths.len() > 1
    }

    /// Number of redundant copies (all members minus one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Fingerprint as hexadecimal string.
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint.to_hex()
    }
}

#[derive(Debug, Default)]
struct GroupTable {
    index: HashMap<Fingerprint, usize>,
    groups: Vec<DuplicateGroup>,
}

/// Thread-safe, append-only fingerprint to paths mapping.
///
/// One instance lives for one scan. Consume it with
/// [`DuplicateGroups::into_groups`] once traversal is over.
#[derive(Debug, Default)]
pub struct DuplicateGroups {
    table: Mutex<GroupTable>,
}

impl DuplicateGroups {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere cannot leave the table half-written: every
    // mutation is a single push under the lock.
    fn lock(&self) -> MutexGuard<'_, GroupTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `path` to the group for `fingerprint`, creating it if new.
    pub fn append(&self, fingerprint: Fingerprint, path: PathBuf) {
        let mut table = self.lock();
        match table.index.get(&fingerprint).copied() {
            Some(idx) => table.groups[idx].paths.push(path),
            None => {
                let idx = table.groups.len();
                table.groups.push(DuplicateGroup::new(fingerprint, path));
                table.index.insert(fingerprint, idx);
            }
        }
    }

    /// Number of distinct fingerprints seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().groups.len()
    }

    /// True when nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().groups.is_empty()
    }

    /// Total number of paths across all groups.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.lock().groups.iter().map(DuplicateGroup::len).sum()
    }

    /// Copy of the current groups, in first-seen order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DuplicateGroup> {
        self.lock().groups.clone()
    }

    /// Consume the mapping and return its groups, in first-seen order.
    #[must_use]
    pub fn into_groups(self) -> Vec<DuplicateGroup> {
        self.table
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .groups
    }
}

/// Keep only groups with at least two members.
#[must_use]
pub fn retain_duplicates(mut groups: Vec<DuplicateGroup>) -> Vec<DuplicateGroup> {
    groups.retain(DuplicateGroup::is_duplicate);
    groups
}

/// Counts derived from a set of groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Number of distinct fingerprints
    pub total_groups: usize,
    /// Groups with two or more members
    pub duplicate_groups: usize,
    /// Members beyond the first in each duplicate group
    pub duplicate_files: usize,
}

impl GroupingStats {
    /// Compute stats over `groups`.
    #[must_use]
    pub fn from_groups(groups: &[DuplicateGroup]) -> Self {
        groups.iter().fold(Self::default(), |mut stats, group| {
            stats.total_groups += 1;
            if group.is_duplicate() {
                stats.duplicate_groups += 1;
                stats.duplicate_files += group.duplicate_count();
            }
            stats
        })
    }
}
