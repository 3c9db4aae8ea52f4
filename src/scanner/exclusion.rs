//! Directory exclusion by path fragment.
//!
//! A directory is excluded when any configured fragment occurs anywhere in
//! its path. Matching is plain, case-sensitive substring containment, so a
//! fragment such as `node_modules` prunes that directory name at any depth
//! and `/srv/backup` prunes everything below that prefix. Callers wanting
//! case-insensitive matching normalise both sides before building the set.

use std::path::Path;

/// Ordered set of exclusion fragments.
///
/// Empty fragments are dropped on construction: an empty string is a
/// substring of every path and would silently exclude the whole scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    fragments: Vec<String>,
}

impl ExclusionSet {
    /// Build a set from individual fragments, keeping their order and
    /// dropping empties and repeats.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for fragment in fragments {
            let fragment = fragment.into();
            if !fragment.is_empty() && !set.fragments.contains(&fragment) {
                set.fragments.push(fragment);
            }
        }
        set
    }

    /// Build a set from a comma-separated list, e.g. `node_modules,.git`.
    #[must_use]
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Fragments in the order they were supplied.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Number of fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// True when nothing is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Whether `path` contains any fragment.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.matching_fragment(path).is_some()
    }

    /// First fragment contained in `path`, if any.
    ///
    /// A bare directory name is always a substring of its full path, so
    /// name-only fragments need no separate check.
    #[must_use]
    pub fn matching_fragment(&self, path: &Path) -> Option<&str> {
        if self.fragments.is_empty() {
            return None;
        }
        let haystack = path.as_os_str().to_string_lossy();
        self.fragments
            .iter()
            .find(|fragment| haystack.contains(fragment.as_str()))
            .map(String::as_str)
    }
}
