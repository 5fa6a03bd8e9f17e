//! ZIP archive writing.

use std::fs::File;
use std::io::Seek;
use std::io::Write;
use std::path::Path;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::writer::ArchiveWriter;
use crate::Result;
use crate::io::CountingReader;

/// Writes deflate-compressed file entries into a ZIP stream.
pub struct ZipArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> ZipArchiveWriter<W> {
    /// Starts a ZIP stream on `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644),
        }
    }
}

impl<W: Write + Seek> ArchiveWriter for ZipArchiveWriter<W> {
    fn append_file(&mut self, entry_path: &str, source: &Path) -> Result<u64> {
        let file = File::open(source)?;
        let size = file.metadata()?.len();
        let options = self.options.large_file(size >= u64::from(u32::MAX));

        self.zip
            .start_file(entry_path, options)
            .map_err(|e| std::io::Error::other(format!("failed to start file in ZIP: {e}")))?;

        let mut read = 0u64;
        std::io::copy(&mut CountingReader::new(file, &mut read), &mut self.zip)?;
        Ok(read)
    }

    fn finish(self: Box<Self>) -> Result<u64> {
        let mut writer = self
            .zip
            .finish()
            .map_err(|e| std::io::Error::other(format!("failed to finish ZIP archive: {e}")))?;
        writer.flush()?;
        Ok(writer.stream_position()?)
    }
}
