//! Format-independent archive writing.

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use tracing::debug;
use tracing::info;

use super::report::CreationReport;
use super::tar::TarArchiveWriter;
use super::zip::ZipArchiveWriter;
use crate::Result;
use crate::constraints::CreationConstraints;
use crate::formats::ArchiveKind;
use crate::security::validate_created_archive;

/// Sink for the file entries of one archive.
pub trait ArchiveWriter {
    /// Appends the content of `source` under `entry_path`.
    ///
    /// Returns the number of content bytes read from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` cannot be read or the archive cannot be
    /// written.
    fn append_file(&mut self, entry_path: &str, source: &Path) -> Result<u64>;

    /// Writes trailing archive structures and flushes.
    ///
    /// Returns the final archive size in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the trailer cannot be written.
    fn finish(self: Box<Self>) -> Result<u64>;
}

/// Writes `entries` (archive path, source file) into a new archive at
/// `output`, then validates it against `constraints`.
///
/// The archive is removed again when writing or validation fails.
///
/// # Errors
///
/// Returns the write failure, or `ScanpackError::ArchiveTooLarge` /
/// `ScanpackError::CompressionRatioExceeded` from validation.
pub fn write_archive<'a, I>(
    kind: ArchiveKind,
    output: &Path,
    entries: I,
    constraints: &CreationConstraints,
) -> Result<CreationReport>
where
    I: IntoIterator<Item = (String, &'a Path)>,
{
    let result = write_and_validate(kind, output, entries, constraints);
    if result.is_err()
        && let Err(e) = fs::remove_file(output)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        debug!(path = %output.display(), error = %e, "could not remove failed archive");
    }
    result
}

fn write_and_validate<'a, I>(
    kind: ArchiveKind,
    output: &Path,
    entries: I,
    constraints: &CreationConstraints,
) -> Result<CreationReport>
where
    I: IntoIterator<Item = (String, &'a Path)>,
{
    let start = Instant::now();
    let file = BufWriter::new(File::create(output)?);
    let mut writer: Box<dyn ArchiveWriter> = match kind {
        ArchiveKind::Tar => Box::new(TarArchiveWriter::new(file)),
        ArchiveKind::Zip => Box::new(ZipArchiveWriter::new(file)),
    };

    let mut report = CreationReport::new(output);
    for (entry_path, source) in entries {
        let bytes = writer.append_file(&entry_path, source)?;
        debug!(entry = %entry_path, source = %source.display(), bytes, "added file");
        report.files_added += 1;
        report.bytes_written += bytes;
    }
    report.bytes_compressed = writer.finish()?;
    report.duration = start.elapsed();

    validate_created_archive(report.bytes_compressed, report.bytes_written, constraints)?;

    info!(
        archive = %output.display(),
        %kind,
        files = report.files_added,
        bytes = report.bytes_compressed,
        "archive created"
    );
    Ok(report)
}
