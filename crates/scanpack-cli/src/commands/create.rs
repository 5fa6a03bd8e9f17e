//! Create command implementation.

use crate::cli::CreateArgs;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use scanpack_core::ArchiveAssembler;
use scanpack_core::ScanConfiguration;
use std::fs;

pub fn execute(args: &CreateArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let json = fs::read_to_string(&args.scan_config).with_context(|| {
        format!("failed to read scan configuration '{}'", args.scan_config.display())
    })?;
    let config = add_context(ScanConfiguration::from_json(&json), &args.scan_config)?;

    let result = add_context(
        ArchiveAssembler::new()
            .with_create_missing_files(args.create_missing_files)
            .create_archives(&config, &args.working_dir, &args.target_dir),
        &args.working_dir,
    )?;

    if !result.is_source_archive_created() && !result.is_binary_archive_created() {
        formatter.format_warning("scan configuration has no paths to package, no archive created");
    }
    formatter.format_archives_result(&result)?;

    Ok(())
}
