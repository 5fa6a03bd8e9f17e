//! Entry content copying with a reusable buffer.

use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;

use crate::Result;
use crate::ScanpackError;
use crate::security::safeguard::classify_read_error;

/// Buffer size for content copies (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Heap buffer reused for every entry of one extraction.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Vec<u8>,
}

impl CopyBuffer {
    /// Allocates a zeroed buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Buffer size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies entry content from an archive into a file.
///
/// Read failures come from the archive side: safeguard violations keep their
/// identity and decoder failures become `ScanpackError::InvalidArchive`.
/// Write failures are filesystem errors and surface as `ScanpackError::Io`.
///
/// # Errors
///
/// See above; also fails if the byte total overflows `u64`.
pub fn copy_entry<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(classify_read_error(e)),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;

        total = total
            .checked_add(bytes_read as u64)
            .ok_or_else(|| ScanpackError::InvalidArchive("entry size overflow".into()))?;
    }

    Ok(total)
}
