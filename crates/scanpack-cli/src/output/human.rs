//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use scanpack_core::ArchivesCreationResult;
use scanpack_core::CreationReport;
use scanpack_core::ExtractionResult;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let digits = n.to_string();
        let mut result = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }
        result
    }

    fn headline(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn write_report(&self, report: &CreationReport) {
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.bytes_compressed)
        ));

        if report.files_skipped > 0 {
            let _ = self
                .term
                .write_line(&format!("  Files skipped:    {}", report.files_skipped));
        }
        if report.placeholders_created > 0 {
            let _ = self.term.write_line(&format!(
                "  Placeholders:     {}",
                report.placeholders_created
            ));
        }
        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Compression:      {:.1}x",
                report.compression_ratio()
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(&self, result: &ExtractionResult) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline("Extraction complete");
        let _ = self.term.write_line(&format!(
            "  Files extracted: {}",
            Self::format_number(result.extracted_file_count)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories: {}",
            Self::format_number(result.created_folder_count)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(result.bytes_written)
        ));

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Skipped entries: {}",
                Self::format_number(result.skipped_entry_count)
            ));
            let _ = self
                .term
                .write_line(&format!("  Target: {}", result.target_location.display()));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", result.duration));
        }

        Ok(())
    }

    fn format_creation_result(&self, report: &CreationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Archive created: {}", report.archive.display()));
        let _ = self.term.write_line("");
        self.write_report(report);

        Ok(())
    }

    fn format_archives_result(&self, result: &ArchivesCreationResult) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for report in [&result.source_archive, &result.binary_archive]
            .into_iter()
            .flatten()
        {
            self.format_creation_result(report)?;
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
