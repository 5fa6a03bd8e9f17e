//! Glob-based include/exclude filtering of archive paths.

use std::collections::BTreeSet;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;

use crate::Result;
use crate::ScanpackError;

/// Decides whether a `/`-separated path is wanted.
///
/// A path passes when the include set is empty or one include pattern
/// matches, and no exclude pattern matches. Exclude wins over include.
///
/// Compiled matchers are stored next to their pattern sets and rebuilt on
/// every mutation, so a filter never matches against stale patterns.
///
/// # Examples
///
/// ```
/// use scanpack_core::GlobFilter;
///
/// let filter = GlobFilter::with_patterns(["*.src"], ["*Test.src"])?;
/// assert!(filter.matches("Foo.src"));
/// assert!(!filter.matches("FooTest.src"));
/// assert!(!filter.matches("Foo.txt"));
/// # Ok::<(), scanpack_core::ScanpackError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlobFilter {
    includes: BTreeSet<String>,
    excludes: BTreeSet<String>,
    include_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
}

impl GlobFilter {
    /// Creates a filter that accepts every path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter from include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidGlobPattern` for the first pattern that
    /// does not compile.
    pub fn with_patterns<I, E>(includes: I, excludes: E) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let mut filter = Self::new();
        filter.add_includes(includes)?;
        filter.add_excludes(excludes)?;
        Ok(filter)
    }

    /// Adds include patterns and recompiles the include matcher.
    ///
    /// On error the filter is left unchanged.
    pub fn add_includes<I>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut next = self.includes.clone();
        next.extend(patterns.into_iter().map(Into::into));
        self.include_set = compile(&next)?;
        self.includes = next;
        Ok(())
    }

    /// Adds exclude patterns and recompiles the exclude matcher.
    ///
    /// On error the filter is left unchanged.
    pub fn add_excludes<I>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut next = self.excludes.clone();
        next.extend(patterns.into_iter().map(Into::into));
        self.exclude_set = compile(&next)?;
        self.excludes = next;
        Ok(())
    }

    /// Merges the patterns of `other` into this filter.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        self.add_includes(other.includes.iter().cloned())?;
        self.add_excludes(other.excludes.iter().cloned())
    }

    /// Include patterns in sorted order.
    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.includes.iter().map(String::as_str)
    }

    /// Exclude patterns in sorted order.
    pub fn excludes(&self) -> impl Iterator<Item = &str> {
        self.excludes.iter().map(String::as_str)
    }

    /// Returns `true` if no pattern is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// Returns `true` if `path` passes the filter.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        (self.include_set.is_none() || self.is_included(path)) && !self.is_excluded(path)
    }

    /// Returns `true` if an include pattern matches `path`.
    #[must_use]
    pub fn is_included(&self, path: &str) -> bool {
        self.include_set.as_ref().is_some_and(|set| set.is_match(path))
    }

    /// Returns `true` if an exclude pattern matches `path`.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_set.as_ref().is_some_and(|set| set.is_match(path))
    }
}

fn compile(patterns: &BTreeSet<String>) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ScanpackError::InvalidGlobPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| ScanpackError::InvalidGlobPattern {
            pattern: patterns.iter().cloned().collect::<Vec<_>>().join(", "),
            reason: e.to_string(),
        })
}
