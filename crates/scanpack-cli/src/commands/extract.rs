//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_context;
use crate::error::usage_error;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use scanpack_core::ArchiveBuilder;
use scanpack_core::ExtractionConstraints;
use scanpack_core::RoutingConfig;
use scanpack_core::ScanConfiguration;
use std::fs;
use std::time::Duration;
use tracing::debug;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let constraints = add_context(
        ExtractionConstraints::new(
            args.max_size.clone(),
            to_usize(args.max_entries, "--max-entries")?,
            to_usize(args.max_depth, "--max-depth")?,
            Duration::from_secs(args.timeout_secs),
        ),
        &args.archive,
    )?;

    let mut builder = ArchiveBuilder::new()
        .archive(&args.archive)
        .output_dir(&args.output_dir)
        .constraints(constraints);
    if let Some(kind) = args.kind {
        builder = builder.kind(kind);
    }
    if let Some(routing) = routing(args)? {
        builder = builder.routing(routing);
    }

    let result = add_context(builder.extract(), &args.archive)?;
    formatter.format_extraction_result(&result)?;

    Ok(())
}

fn routing(args: &ExtractArgs) -> Result<Option<RoutingConfig>> {
    let (Some(config_path), Some(scan_type)) = (&args.scan_config, args.scan_type) else {
        return Ok(None);
    };

    let json = fs::read_to_string(config_path).with_context(|| {
        format!("failed to read scan configuration '{}'", config_path.display())
    })?;
    let model = add_context(ScanConfiguration::from_json(&json), config_path)?;
    let routing = add_context(
        RoutingConfig::builder()
            .model(&model)
            .scan_type(scan_type)
            .include_patterns(args.include.iter().cloned())
            .exclude_patterns(args.exclude.iter().cloned())
            .build(),
        config_path,
    )?;

    debug!(
        %scan_type,
        root = routing.is_root_folder_accepted(),
        names = ?routing.accepted_reference_names().collect::<Vec<_>>(),
        "derived routing"
    );
    Ok(Some(routing))
}

fn to_usize(value: u64, flag: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| usage_error(format!("{flag} is too large: {value}")))
}
