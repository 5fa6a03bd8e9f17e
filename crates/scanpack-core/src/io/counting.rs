//! Byte-counting I/O wrappers.

use std::io::Read;
use std::io::Write;

/// Writer that tracks the bytes successfully written through it.
///
/// Used to measure the size of an archive while it is produced.
///
/// # Examples
///
/// ```
/// use scanpack_core::io::CountingWriter;
/// use std::io::Write;
///
/// let mut writer = CountingWriter::new(Vec::new());
/// writer.write_all(b"Hello, ")?;
/// writer.write_all(b"World!")?;
///
/// assert_eq!(writer.total_bytes(), 13);
/// assert_eq!(writer.into_inner(), b"Hello, World!");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Total bytes written so far.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    /// Returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.bytes_written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Reader that tracks the bytes read through it.
///
/// Used to measure the uncompressed content fed into an archive.
#[derive(Debug)]
pub struct CountingReader<'a, R> {
    inner: R,
    total: &'a mut u64,
}

impl<'a, R> CountingReader<'a, R> {
    /// Wraps `inner`, adding every byte read to `total`.
    pub fn new(inner: R, total: &'a mut u64) -> Self {
        Self { inner, total }
    }
}

impl<R: Read> Read for CountingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        *self.total += n as u64;
        Ok(n)
    }
}
