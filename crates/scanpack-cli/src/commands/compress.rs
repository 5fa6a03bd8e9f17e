//! Compress command implementation.

use crate::cli::CompressArgs;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use scanpack_core::ArchiveKind;
use scanpack_core::compress_folder;
use scanpack_core::formats::detect_kind;

pub fn execute(args: &CompressArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let kind = args
        .kind
        .or_else(|| detect_kind(&args.target))
        .unwrap_or(ArchiveKind::Tar);

    let report = add_context(compress_folder(kind, &args.folder, &args.target), &args.folder)?;
    formatter.format_creation_result(&report)?;

    Ok(())
}
