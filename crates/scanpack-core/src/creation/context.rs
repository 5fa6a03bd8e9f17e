//! Named path sets collected for one archive build.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::Result;
use crate::filter::GlobFilter;
use crate::formats::ArchiveKind;
use crate::routing::DATA_SECTION_FOLDER;

/// Reference name of the legacy set packaged at the archive root.
pub const ROOT_REFERENCE_NAME: &str = "";

/// Paths registered under one reference name, with their filter.
#[derive(Debug, Clone, Default)]
pub struct CreationPathSet {
    paths: BTreeSet<String>,
    filter: GlobFilter,
}

impl CreationPathSet {
    /// Configured file and folder paths, in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Filter applied to every candidate file of this set.
    #[must_use]
    pub const fn filter(&self) -> &GlobFilter {
        &self.filter
    }

    /// Returns `true` if `relative_path` is packaged.
    ///
    /// Only an exclude match drops a path, and an include match overrides it.
    /// Paths matching no pattern are packaged. Directories are checked the
    /// same way, so a dropped directory drops everything below it.
    #[must_use]
    pub fn accepts(&self, relative_path: &str) -> bool {
        !self.filter.is_excluded(relative_path) || self.filter.is_included(relative_path)
    }
}

/// Collects named path sets and lays them out the way routing expects.
///
/// The root set lands at the archive root; every other set under
/// `__data__/<name>/`. Registrations under the same name accumulate.
///
/// # Examples
///
/// ```
/// use scanpack_core::ArchiveKind;
/// use scanpack_core::creation::CreationContext;
///
/// let mut context = CreationContext::new(ArchiveKind::Zip);
/// context.add_paths("api", ["spec/openapi.yaml"], ["*.yaml"], Vec::<String>::new())?;
/// context.add_paths("api", ["spec/extra"], Vec::<String>::new(), ["*.bak"])?;
///
/// let set = context.path_set("api").unwrap();
/// assert_eq!(set.paths().count(), 2);
/// assert!(set.accepts("spec/openapi.yaml"));
/// assert!(!set.accepts("spec/extra/old.yaml.bak"));
/// assert!(set.accepts("spec/extra/notes.txt"));
/// assert_eq!(CreationContext::entry_prefix("api"), "__data__/api/");
/// # Ok::<(), scanpack_core::ScanpackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CreationContext {
    kind: ArchiveKind,
    sets: BTreeMap<String, CreationPathSet>,
}

impl CreationContext {
    /// Creates an empty context for an archive of `kind`.
    #[must_use]
    pub const fn new(kind: ArchiveKind) -> Self {
        Self {
            kind,
            sets: BTreeMap::new(),
        }
    }

    /// Kind of the archive being assembled.
    #[must_use]
    pub const fn kind(&self) -> ArchiveKind {
        self.kind
    }

    /// Registers paths and patterns under `reference_name`.
    ///
    /// Use [`ROOT_REFERENCE_NAME`] for the root set. Patterns are merged into
    /// the set's filter, which is recompiled.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidGlobPattern` if a pattern does not
    /// compile; the set is left unchanged in that case.
    pub fn add_paths<P, I, E>(
        &mut self,
        reference_name: &str,
        paths: P,
        includes: I,
        excludes: E,
    ) -> Result<()>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let added = GlobFilter::with_patterns(includes, excludes)?;
        let set = self.sets.entry(reference_name.to_string()).or_default();
        set.filter.merge(&added)?;
        set.paths.extend(paths.into_iter().map(Into::into));
        Ok(())
    }

    /// Returns the set registered under `reference_name`.
    #[must_use]
    pub fn path_set(&self, reference_name: &str) -> Option<&CreationPathSet> {
        self.sets.get(reference_name)
    }

    /// All sets, keyed by reference name in sorted order.
    pub fn path_sets(&self) -> impl Iterator<Item = (&str, &CreationPathSet)> {
        self.sets.iter().map(|(name, set)| (name.as_str(), set))
    }

    /// Returns `true` if no set carries any path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.values().all(|set| set.paths.is_empty())
    }

    /// Archive path prefix of a set: empty for the root set.
    #[must_use]
    pub fn entry_prefix(reference_name: &str) -> String {
        if reference_name == ROOT_REFERENCE_NAME {
            String::new()
        } else {
            format!("{DATA_SECTION_FOLDER}/{reference_name}/")
        }
    }
}
