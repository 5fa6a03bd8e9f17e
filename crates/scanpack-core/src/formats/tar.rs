//! Tar entry stream, with transparent gzip decompression.

use std::io::BufReader;
use std::io::Read;

use flate2::read::GzDecoder;
use tracing::debug;

use super::detect::is_gzip;
use super::traits::ArchiveEntry;
use super::traits::EntryStream;
use crate::Result;
use crate::ScanpackError;
use crate::security::SourceBudget;
use crate::security::safeguard::violation_in;

/// Tar archive over a possibly gzip-compressed byte source.
///
/// The decoded stream is read through a [`SourceBudget`], so the bytes of
/// headers and skipped entries are counted too.
pub struct TarSource<'a> {
    archive: tar::Archive<Box<dyn Read + 'a>>,
    budget: SourceBudget,
}

impl<'a> TarSource<'a> {
    /// Starts iterating over the entries.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidArchive` if the archive was already
    /// partially consumed.
    pub fn entries(&mut self) -> Result<TarEntryStream<'_, Box<dyn Read + 'a>>> {
        let entries = self.archive.entries().map_err(invalid_tar)?;
        Ok(TarEntryStream {
            entries,
            budget: Some(self.budget.clone()),
        })
    }

    /// Counter over the decoded stream.
    #[must_use]
    pub const fn budget(&self) -> &SourceBudget {
        &self.budget
    }
}

/// Opens a tar archive, decompressing gzip input when the magic is present.
///
/// # Errors
///
/// Returns an I/O error if the first bytes cannot be read.
pub fn open_tar<'a, R: Read + 'a>(source: R) -> Result<TarSource<'a>> {
    let mut buffered = BufReader::new(source);
    let budget = SourceBudget::new();
    let reader: Box<dyn Read + 'a> = if is_gzip(&mut buffered)? {
        debug!("gzip magic found, decompressing tar stream");
        Box::new(budget.reader(GzDecoder::new(buffered)))
    } else {
        Box::new(budget.reader(buffered))
    };
    Ok(TarSource {
        archive: tar::Archive::new(reader),
        budget,
    })
}

/// Yields the directories and regular files of a tar archive.
///
/// Links, devices and other special entries are skipped.
pub struct TarEntryStream<'a, R: Read + 'a> {
    entries: tar::Entries<'a, R>,
    budget: Option<SourceBudget>,
}

impl<'a, R: Read + 'a> TarEntryStream<'a, R> {
    /// Starts iterating over `archive`.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidArchive` if the archive was already
    /// partially consumed.
    pub fn new(archive: &'a mut tar::Archive<R>) -> Result<Self> {
        let entries = archive.entries().map_err(invalid_tar)?;
        Ok(Self {
            entries,
            budget: None,
        })
    }
}

impl<'a, R: Read + 'a> EntryStream for TarEntryStream<'a, R> {
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>> {
        loop {
            let Some(entry) = self.entries.next() else {
                return Ok(None);
            };
            let entry = entry.map_err(invalid_tar)?;

            let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let entry_type = entry.header().entry_type();

            let is_dir = entry_type.is_dir() || path.ends_with('/');
            if !is_dir && !entry_type.is_file() && !entry_type.is_contiguous() {
                debug!(%path, ?entry_type, "skipping special tar entry");
                continue;
            }

            return Ok(Some(ArchiveEntry {
                path,
                is_dir,
                reader: Box::new(entry),
            }));
        }
    }

    fn source_budget(&self) -> Option<&SourceBudget> {
        self.budget.as_ref()
    }
}

fn invalid_tar(err: std::io::Error) -> ScanpackError {
    match violation_in(&err) {
        Some(violation) => ScanpackError::safeguard(violation),
        None => ScanpackError::InvalidArchive(format!("tar: {err}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::TarTestBuilder;

    fn collect(data: Vec<u8>) -> Result<Vec<(String, bool, Vec<u8>)>> {
        let mut archive = open_tar(std::io::Cursor::new(data))?;
        let mut stream = archive.entries()?;
        let mut out = Vec::new();
        while let Some(mut entry) = stream.next_entry()? {
            let mut content = Vec::new();
            entry.reader.read_to_end(&mut content)?;
            out.push((entry.path, entry.is_dir, content));
        }
        Ok(out)
    }

    #[test]
    fn test_reads_files_and_directories() {
        let data = TarTestBuilder::new()
            .add_directory("dir/")
            .add_file("dir/a.txt", b"alpha")
            .build();

        let entries = collect(data).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "dir/");
        assert!(entries[0].1);
        assert_eq!(entries[1], ("dir/a.txt".to_string(), false, b"alpha".to_vec()));
    }

    #[test]
    fn test_gzip_is_transparent() {
        let data = TarTestBuilder::new().add_file("x.txt", b"zipped").build_gz();
        let entries = collect(data).unwrap();
        assert_eq!(entries, vec![("x.txt".to_string(), false, b"zipped".to_vec())]);
    }

    #[test]
    fn test_skips_symlinks() {
        let data = TarTestBuilder::new()
            .add_symlink("link", "/etc/passwd")
            .add_file("real.txt", b"r")
            .build();
        let entries = collect(data).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "real.txt");
    }

    #[test]
    fn test_unread_content_is_skipped() {
        let data = TarTestBuilder::new()
            .add_file("a", b"first")
            .add_file("b", b"second")
            .build();
        let mut archive = open_tar(std::io::Cursor::new(data)).unwrap();
        let mut stream = archive.entries().unwrap();

        let first = stream.next_entry().unwrap().unwrap();
        assert_eq!(first.path, "a");
        drop(first);

        let mut second = stream.next_entry().unwrap().unwrap();
        let mut content = String::new();
        second.reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "second");
    }

    #[test]
    fn test_skipped_content_is_counted() {
        let data = TarTestBuilder::new()
            .add_file("big.bin", &[7u8; 8192])
            .add_file("small.txt", b"s")
            .build_gz();
        let mut archive = open_tar(std::io::Cursor::new(data)).unwrap();
        let budget = archive.budget().clone();
        let mut stream = archive.entries().unwrap();

        drop(stream.next_entry().unwrap().unwrap());
        assert!(budget.consumed() < 8192);
        let second = stream.next_entry().unwrap().unwrap();
        assert_eq!(second.path, "small.txt");
        assert!(budget.consumed() >= 512 + 8192 + 512);
    }

    #[test]
    fn test_plain_tar_stream_has_no_budget() {
        let data = TarTestBuilder::new().add_file("a", b"a").build();
        let mut archive = tar::Archive::new(std::io::Cursor::new(data));
        let stream = TarEntryStream::new(&mut archive).unwrap();
        assert!(stream.source_budget().is_none());
    }

    #[test]
    fn test_garbage_is_invalid_archive() {
        let data = vec![0x55u8; 1024];
        let err = collect(data).unwrap_err();
        assert!(matches!(err, ScanpackError::InvalidArchive(_)), "{err:?}");
    }

    #[test]
    fn test_empty_input_has_no_entries() {
        assert!(collect(Vec::new()).unwrap().is_empty());
    }
}
