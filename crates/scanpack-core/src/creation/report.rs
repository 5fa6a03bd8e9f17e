//! Archive creation reporting.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Report of one produced archive.
///
/// # Examples
///
/// ```
/// use scanpack_core::creation::CreationReport;
///
/// let mut report = CreationReport::new("out/sourcecode.zip");
/// report.files_added = 10;
/// report.bytes_written = 1024;
/// report.bytes_compressed = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreationReport {
    /// Location of the archive.
    pub archive: PathBuf,

    /// Number of files added to the archive.
    pub files_added: usize,

    /// Content bytes read from the sources (uncompressed).
    pub bytes_written: u64,

    /// Size of the final archive.
    pub bytes_compressed: u64,

    /// Files and directories left out by include/exclude filters; a dropped
    /// directory counts once.
    pub files_skipped: usize,

    /// Empty placeholders created for missing sources.
    pub placeholders_created: usize,

    /// Duration of the creation operation.
    #[serde(skip)]
    pub duration: Duration,
}

impl CreationReport {
    /// Creates an empty report for `archive`.
    #[must_use]
    pub fn new(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            ..Self::default()
        }
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either size is 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }
}
