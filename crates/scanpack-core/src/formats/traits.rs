//! Entry-stream abstraction shared by all archive formats.

use std::io::Read;

use crate::Result;
use crate::security::SourceBudget;

/// One record of an archive.
///
/// The content reader borrows the stream it came from, so it must be
/// dropped before the next entry is requested.
pub struct ArchiveEntry<'a> {
    /// Entry path as stored in the archive, `/`-separated.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Content of the entry; empty for directories.
    pub reader: Box<dyn Read + 'a>,
}

impl std::fmt::Debug for ArchiveEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("path", &self.path)
            .field("is_dir", &self.is_dir)
            .finish_non_exhaustive()
    }
}

/// Sequential iterator over archive entries.
///
/// The byte source is consumed once; after `Ok(None)` the stream is
/// exhausted.
pub trait EntryStream {
    /// Returns the next entry, or `None` when the archive is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidArchive` if the archive structure is
    /// malformed, or a safeguard violation when wrapped by a
    /// [`Safeguard`](crate::security::Safeguard).
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>>;

    /// Counter over the decoded archive stream, for formats that decode
    /// skipped entries too.
    fn source_budget(&self) -> Option<&SourceBudget> {
        None
    }
}
