//! ZIP entry stream.

use std::io::Read;
use std::io::Seek;

use zip::ZipArchive;

use super::traits::ArchiveEntry;
use super::traits::EntryStream;
use crate::Result;
use crate::ScanpackError;

/// Yields the entries of a ZIP archive in central directory order.
pub struct ZipEntryStream<R: Read + Seek> {
    archive: ZipArchive<R>,
    next_index: usize,
}

impl<R: Read + Seek> ZipEntryStream<R> {
    /// Reads the central directory of `source`.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidArchive` if `source` is not a ZIP file.
    pub fn new(source: R) -> Result<Self> {
        let archive = ZipArchive::new(source).map_err(invalid_zip)?;
        Ok(Self {
            archive,
            next_index: 0,
        })
    }

    /// Number of entries in the central directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }
}

impl<R: Read + Seek> EntryStream for ZipEntryStream<R> {
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>> {
        if self.next_index >= self.archive.len() {
            return Ok(None);
        }
        let index = self.next_index;
        self.next_index += 1;

        let file = self.archive.by_index(index).map_err(invalid_zip)?;
        let path = file.name().to_string();
        let is_dir = file.is_dir();

        Ok(Some(ArchiveEntry {
            path,
            is_dir,
            reader: Box::new(file),
        }))
    }
}

fn invalid_zip(err: zip::result::ZipError) -> ScanpackError {
    ScanpackError::InvalidArchive(format!("zip: {err}"))
}
