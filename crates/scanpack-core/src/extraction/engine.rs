//! Extraction loop: routing, zip-slip defense and filesystem writes.

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;
use tracing::info;

use crate::ExtractionResult;
use crate::Result;
use crate::formats::ArchiveEntry;
use crate::formats::EntryStream;
use crate::io::CopyBuffer;
use crate::io::copy_entry;
use crate::routing::PathTransformer;
use crate::security::resolve_entry_path;

/// Drives one extraction into one output directory.
pub struct ExtractionEngine<'a> {
    output_dir: PathBuf,
    transformer: &'a dyn PathTransformer,
    result: ExtractionResult,
    buffer: CopyBuffer,
}

impl<'a> ExtractionEngine<'a> {
    /// Prepares `output_dir`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created or resolved.
    pub fn new(
        output_dir: &Path,
        source_label: &str,
        transformer: &'a dyn PathTransformer,
    ) -> Result<Self> {
        fs::create_dir_all(output_dir)?;
        let output_dir = output_dir.canonicalize()?;

        Ok(Self {
            result: ExtractionResult::new(source_label, output_dir.clone()),
            output_dir,
            transformer,
            buffer: CopyBuffer::new(),
        })
    }

    /// Consumes `stream` entry by entry.
    ///
    /// Stops at the first error; output written so far is left in place.
    pub fn run<S: EntryStream + ?Sized>(mut self, stream: &mut S) -> Result<ExtractionResult> {
        let start = Instant::now();

        while let Some(entry) = stream.next_entry()? {
            self.process(entry)?;
        }

        self.result.duration = start.elapsed();
        info!(
            source = %self.result.source_location,
            target = %self.result.target_location.display(),
            files = self.result.extracted_file_count,
            folders = self.result.created_folder_count,
            skipped = self.result.skipped_entry_count,
            "extraction finished"
        );
        Ok(self.result)
    }

    fn process(&mut self, mut entry: ArchiveEntry<'_>) -> Result<()> {
        let decision = self.transformer.transform(&entry.path);
        let Some(output_path) = decision.output_path(&entry.path) else {
            debug!(path = %entry.path, "entry not accepted, skipping");
            self.result.skipped_entry_count += 1;
            return Ok(());
        };

        let target = resolve_entry_path(&self.output_dir, output_path)?;

        if entry.is_dir {
            self.ensure_directory(&target)?;
            return Ok(());
        }

        if target.is_dir() {
            debug!(path = %entry.path, target = %target.display(), "target is a directory, skipping file entry");
            self.result.skipped_entry_count += 1;
            return Ok(());
        }

        if let Some(parent) = target.parent() {
            self.ensure_directory(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&target)?);
        let written = copy_entry(&mut entry.reader, &mut writer, &mut self.buffer)?;
        writer.flush()?;

        debug!(path = %entry.path, target = %target.display(), bytes = written, "extracted file");
        self.result.extracted_file_count += 1;
        self.result.bytes_written += written;
        Ok(())
    }

    /// Creates `dir` and any missing ancestors below the output directory,
    /// counting each one actually created.
    fn ensure_directory(&mut self, dir: &Path) -> Result<()> {
        let mut missing = Vec::new();
        let mut current = Some(dir);
        while let Some(path) = current {
            if path.exists() || !path.starts_with(&self.output_dir) {
                break;
            }
            missing.push(path.to_path_buf());
            current = path.parent();
        }

        for path in missing.iter().rev() {
            match fs::create_dir(path) {
                Ok(()) => {
                    debug!(path = %path.display(), "created folder");
                    self.result.created_folder_count += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
