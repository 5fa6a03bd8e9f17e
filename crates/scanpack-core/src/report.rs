//! Extraction outcome.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Summary of one extraction call.
///
/// Counters only include filesystem objects this call created; directories
/// that already existed are not counted again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Files written.
    pub extracted_file_count: usize,

    /// Directories created, including missing ancestors of files.
    pub created_folder_count: usize,

    /// Entries rejected by routing or filters.
    pub skipped_entry_count: usize,

    /// Content bytes written to disk.
    pub bytes_written: u64,

    /// Label of the archive byte source.
    pub source_location: String,

    /// Directory the archive was extracted into.
    pub target_location: PathBuf,

    /// Wall-clock time of the extraction.
    #[serde(serialize_with = "serialize_millis", rename = "duration_ms")]
    pub duration: Duration,
}

impl ExtractionResult {
    /// Creates an empty result for one extraction.
    #[must_use]
    pub fn new(source_location: impl Into<String>, target_location: impl Into<PathBuf>) -> Self {
        Self {
            source_location: source_location.into(),
            target_location: target_location.into(),
            ..Self::default()
        }
    }

    /// Files plus created folders.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.extracted_file_count + self.created_folder_count
    }
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    serializer.serialize_u64(millis)
}
