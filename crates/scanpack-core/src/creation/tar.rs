//! TAR archive writing.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tar::Builder;
use tar::Header;

use super::writer::ArchiveWriter;
use crate::Result;
use crate::io::CountingReader;
use crate::io::CountingWriter;

/// Writes regular file entries into an uncompressed tar stream.
///
/// Headers are GNU style, so long entry paths are supported. Only size and
/// a fixed mode are recorded.
///
/// # Examples
///
/// ```no_run
/// use scanpack_core::creation::ArchiveWriter;
/// use scanpack_core::creation::tar::TarArchiveWriter;
/// use std::path::Path;
///
/// let mut writer = Box::new(TarArchiveWriter::new(Vec::new()));
/// writer.append_file("__data__/bin/app.jar", Path::new("build/app.jar"))?;
/// let size = writer.finish()?;
/// # Ok::<(), scanpack_core::ScanpackError>(())
/// ```
pub struct TarArchiveWriter<W: Write> {
    builder: Builder<CountingWriter<W>>,
}

impl<W: Write> TarArchiveWriter<W> {
    /// Starts a tar stream on `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            builder: Builder::new(CountingWriter::new(writer)),
        }
    }
}

impl<W: Write> ArchiveWriter for TarArchiveWriter<W> {
    fn append_file(&mut self, entry_path: &str, source: &Path) -> Result<u64> {
        let file = File::open(source)?;
        let size = file.metadata()?.len();

        let mut header = Header::new_gnu();
        header.set_size(size);
        header.set_mode(0o644);
        header.set_cksum();

        let mut read = 0u64;
        self.builder
            .append_data(&mut header, entry_path, CountingReader::new(file, &mut read))?;
        Ok(read)
    }

    fn finish(self: Box<Self>) -> Result<u64> {
        let mut counting_writer = self.builder.into_inner()?;
        counting_writer.flush()?;
        Ok(counting_writer.total_bytes())
    }
}
