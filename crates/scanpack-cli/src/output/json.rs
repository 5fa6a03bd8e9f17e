//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use scanpack_core::ArchivesCreationResult;
use scanpack_core::CreationReport;
use scanpack_core::ExtractionResult;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct CreationOutput<'a> {
    #[serde(flatten)]
    report: &'a CreationReport,
    compression_ratio: f64,
    duration_ms: u128,
}

impl<'a> From<&'a CreationReport> for CreationOutput<'a> {
    fn from(report: &'a CreationReport) -> Self {
        Self {
            report,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, result: &ExtractionResult) -> Result<()> {
        Self::output(&JsonOutput::success("extract", result))
    }

    fn format_creation_result(&self, report: &CreationReport) -> Result<()> {
        Self::output(&JsonOutput::success("compress", CreationOutput::from(report)))
    }

    fn format_archives_result(&self, result: &ArchivesCreationResult) -> Result<()> {
        #[derive(Serialize)]
        struct ArchivesOutput<'a> {
            source_archive: Option<CreationOutput<'a>>,
            binary_archive: Option<CreationOutput<'a>>,
        }

        let data = ArchivesOutput {
            source_archive: result.source_archive.as_ref().map(CreationOutput::from),
            binary_archive: result.binary_archive.as_ref().map(CreationOutput::from),
        };
        Self::output(&JsonOutput::success("create", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        // stdout carries exactly one JSON document
        let _ = writeln!(io::stderr(), "WARNING: {message}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_output_structure() {
        let mut result = ExtractionResult::new("a.zip", "/out");
        result.extracted_file_count = 3;

        let json = serde_json::to_value(JsonOutput::success("extract", &result)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["extracted_file_count"], 3);
        assert!(json["data"]["duration_ms"].is_number());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_creation_output_flattens_report() {
        let mut report = CreationReport::new("out/binaries.tar");
        report.files_added = 2;
        report.bytes_written = 100;
        report.bytes_compressed = 50;

        let json = serde_json::to_value(CreationOutput::from(&report)).unwrap();
        assert_eq!(json["archive"], "out/binaries.tar");
        assert_eq!(json["files_added"], 2);
        assert_eq!(json["compression_ratio"], 2.0);
    }

    #[test]
    fn test_error_output_structure() {
        let json = serde_json::to_value(JsonOutput::<()>::error("extract", "boom")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }
}
