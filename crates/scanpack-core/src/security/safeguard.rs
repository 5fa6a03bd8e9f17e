//! Streaming budget enforcement over an entry stream.

use std::cell::Cell;
use std::cell::RefCell;
use std::io::Read;
use std::rc::Rc;
use std::time::Instant;

use crate::Result;
use crate::ScanpackError;
use crate::constraints::ExtractionConstraints;
use crate::error::SafeguardViolation;
use crate::formats::ArchiveEntry;
use crate::formats::EntryStream;
use crate::size::Size;

/// Wraps an entry stream and rejects archives exceeding the configured
/// byte, entry, depth or time budgets.
///
/// Checks run on every [`next_entry`](EntryStream::next_entry) call, in this
/// order:
/// 1. the wall-clock budget, measured from the first call
/// 2. the cumulative uncompressed bytes read so far
/// 3. the directory depth, for directory entries
/// 4. the file entry count, for file entries
///
/// Entry content is counted while it is read, so an oversized entry fails in
/// the middle of the copy instead of after it was fully decompressed. When
/// the stream exposes a [`SourceBudget`], the decoded archive stream is
/// bounded as well, which covers entries skipped without being read.
///
/// # Examples
///
/// ```
/// use scanpack_core::ExtractionConstraints;
/// use scanpack_core::formats::{EntryStream, ZipEntryStream};
/// use scanpack_core::security::Safeguard;
/// # use std::io::{Cursor, Write};
/// # let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
/// # zip.start_file("a.txt", zip::write::SimpleFileOptions::default())?;
/// # zip.write_all(b"hello")?;
/// # let bytes = zip.finish()?.into_inner();
///
/// let stream = ZipEntryStream::new(Cursor::new(bytes))?;
/// let constraints = ExtractionConstraints::default().with_max_entries(10)?;
/// let mut guarded = Safeguard::new(stream, constraints);
///
/// while let Some(mut entry) = guarded.next_entry()? {
///     std::io::copy(&mut entry.reader, &mut std::io::sink())?;
/// }
/// assert_eq!(guarded.entries_count(), 1);
/// assert_eq!(guarded.bytes_read(), 5);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Safeguard<S> {
    inner: S,
    constraints: ExtractionConstraints,
    start_time: Option<Instant>,
    bytes_read: Cell<u64>,
    entries_count: usize,
}

impl<S: EntryStream> Safeguard<S> {
    /// Wraps `inner` with the given budgets.
    pub fn new(inner: S, constraints: ExtractionConstraints) -> Self {
        if let Some(budget) = inner.source_budget() {
            budget.set_limit(constraints.max_uncompressed().clone());
        }
        Self {
            inner,
            constraints,
            start_time: None,
            bytes_read: Cell::new(0),
            entries_count: 0,
        }
    }

    /// Instant of the first `next_entry` call, if any.
    #[must_use]
    pub const fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    /// Uncompressed content bytes read through this safeguard.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.get()
    }

    /// Bytes pulled from the decoded archive stream, if the format counts
    /// them.
    #[must_use]
    pub fn source_bytes(&self) -> Option<u64> {
        self.inner.source_budget().map(SourceBudget::consumed)
    }

    /// File entries seen so far.
    #[must_use]
    pub const fn entries_count(&self) -> usize {
        self.entries_count
    }

    /// Budgets enforced by this safeguard.
    #[must_use]
    pub const fn constraints(&self) -> &ExtractionConstraints {
        &self.constraints
    }
}

impl<S: EntryStream> EntryStream for Safeguard<S> {
    fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>> {
        let start = *self.start_time.get_or_insert_with(Instant::now);
        if start.elapsed() > self.constraints.timeout() {
            return Err(ScanpackError::safeguard(SafeguardViolation::Timeout {
                limit: self.constraints.timeout(),
            }));
        }

        let max_size = self.constraints.max_uncompressed();
        let source_bytes = self.inner.source_budget().map_or(0, SourceBudget::consumed);
        if source_bytes > max_size.bytes() {
            return Err(ScanpackError::safeguard(SafeguardViolation::SizeExceeded {
                max: max_size.clone(),
            }));
        }

        let Some(entry) = self.inner.next_entry()? else {
            return Ok(None);
        };

        if self.bytes_read.get() > max_size.bytes() {
            return Err(ScanpackError::safeguard(SafeguardViolation::SizeExceeded {
                max: max_size.clone(),
            }));
        }

        if entry.is_dir {
            let max_depth = self.constraints.max_directory_depth();
            if directory_depth(&entry.path) > max_depth {
                return Err(ScanpackError::safeguard(SafeguardViolation::DepthExceeded {
                    max: max_depth,
                }));
            }
        } else {
            self.entries_count += 1;
            let max_entries = self.constraints.max_entries();
            if self.entries_count > max_entries {
                return Err(ScanpackError::safeguard(
                    SafeguardViolation::EntryCountExceeded { max: max_entries },
                ));
            }
        }

        let ArchiveEntry {
            path,
            is_dir,
            reader,
        } = entry;

        Ok(Some(ArchiveEntry {
            path,
            is_dir,
            reader: Box::new(BudgetedReader {
                inner: reader,
                total: &self.bytes_read,
                max: max_size,
            }),
        }))
    }

    fn source_budget(&self) -> Option<&SourceBudget> {
        self.inner.source_budget()
    }
}

/// Number of non-empty `/`-separated segments, so `a/b/` and `a/b` are both
/// two levels deep.
fn directory_depth(path: &str) -> usize {
    path.split('/').filter(|segment| !segment.is_empty()).count()
}

/// Counts content bytes into the shared total and fails once it passes the
/// budget.
struct BudgetedReader<'a> {
    inner: Box<dyn Read + 'a>,
    total: &'a Cell<u64>,
    max: &'a Size,
}

impl Read for BudgetedReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        let total = self.total.get().saturating_add(n as u64);
        self.total.set(total);
        if total > self.max.bytes() {
            return Err(std::io::Error::other(SafeguardViolation::SizeExceeded {
                max: self.max.clone(),
            }));
        }
        Ok(n)
    }
}

/// Byte count of a decoded archive stream, shared between the reader that
/// feeds the format decoder and the [`Safeguard`] guarding the entries.
///
/// Every byte the decoder pulls is counted: headers, padding and the content
/// of entries skipped without being read. Once a limit is set, reading past
/// it fails with [`SafeguardViolation::SizeExceeded`].
#[derive(Debug, Clone, Default)]
pub struct SourceBudget {
    state: Rc<SourceBudgetState>,
}

#[derive(Debug, Default)]
struct SourceBudgetState {
    consumed: Cell<u64>,
    limit: RefCell<Option<Size>>,
}

impl SourceBudget {
    /// Creates an unlimited counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes read through [`reader`](Self::reader) so far.
    #[must_use]
    pub fn consumed(&self) -> u64 {
        self.state.consumed.get()
    }

    /// Sets the byte limit for all readers of this budget.
    pub fn set_limit(&self, max: Size) {
        *self.state.limit.borrow_mut() = Some(max);
    }

    /// Wraps `inner` so its bytes count against this budget.
    pub fn reader<R: Read>(&self, inner: R) -> SourceReader<R> {
        SourceReader {
            inner,
            budget: self.clone(),
        }
    }
}

/// Reader counting into a [`SourceBudget`].
#[derive(Debug)]
pub struct SourceReader<R> {
    inner: R,
    budget: SourceBudget,
}

impl<R: Read> Read for SourceReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        let state = &self.budget.state;
        let total = state.consumed.get().saturating_add(n as u64);
        state.consumed.set(total);
        if let Some(max) = state.limit.borrow().as_ref()
            && total > max.bytes()
        {
            return Err(std::io::Error::other(SafeguardViolation::SizeExceeded {
                max: max.clone(),
            }));
        }
        Ok(n)
    }
}

/// Finds a budget violation carried by `err`, looking through nested I/O
/// errors and error sources.
pub(crate) fn violation_in(err: &std::io::Error) -> Option<SafeguardViolation> {
    let mut current: Option<&(dyn std::error::Error + 'static)> =
        err.get_ref().map(|inner| inner as &(dyn std::error::Error + 'static));
    while let Some(error) = current {
        if let Some(violation) = error.downcast_ref::<SafeguardViolation>() {
            return Some(violation.clone());
        }
        current = match error.downcast_ref::<std::io::Error>() {
            Some(io) => io
                .get_ref()
                .map(|inner| inner as &(dyn std::error::Error + 'static)),
            None => error.source(),
        };
    }
    None
}

/// Maps a failure while reading entry content to the crate error.
///
/// Budget violations raised by the safeguard keep their identity; anything
/// else means the archive content could not be decoded.
pub(crate) fn classify_read_error(err: std::io::Error) -> ScanpackError {
    match violation_in(&err) {
        Some(violation) => ScanpackError::safeguard(violation),
        None => ScanpackError::InvalidArchive(format!("failed to read entry content: {err}")),
    }
}
