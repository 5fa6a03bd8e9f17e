//! High-level public API for archive extraction.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

use crate::ExtractionConstraints;
use crate::ExtractionResult;
use crate::Result;
use crate::extraction::ExtractionEngine;
use crate::formats::ArchiveKind;
use crate::formats::EntryStream;
use crate::formats::ZipEntryStream;
use crate::formats::detect_kind;
use crate::formats::open_tar;
use crate::routing::KEEP_AS_IS;
use crate::routing::PathTransformer;
use crate::routing::RoutingConfig;
use crate::security::Safeguard;

/// Extracts an archive byte source into `output_dir`.
///
/// Without `routing` every entry is extracted under its original path
/// (trusted-archive mode). Without `constraints` no resource budgets are
/// enforced; entry paths are validated in both cases.
///
/// # Arguments
///
/// * `kind` - Declared layout of `source`
/// * `source` - Archive bytes, consumed once
/// * `source_label` - Recorded as the result's source location
/// * `output_dir` - Created if absent
/// * `routing` - Per-scan routing and filtering
/// * `constraints` - Safeguard budgets
///
/// # Errors
///
/// Returns an error if:
/// - `source` is not a valid archive of `kind`
/// - A safeguard budget is exceeded
/// - An entry path escapes `output_dir`
/// - I/O operations fail
///
/// Files written before a failure are left in place.
///
/// # Examples
///
/// ```no_run
/// use scanpack_core::ArchiveKind;
/// use scanpack_core::ExtractionConstraints;
/// use scanpack_core::RoutingConfig;
/// use scanpack_core::extract;
/// use std::fs::File;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let routing = RoutingConfig::new(false, ["src", "api"]);
/// let result = extract(
///     ArchiveKind::Zip,
///     File::open("sourcecode.zip")?,
///     "sourcecode.zip",
///     Path::new("/tmp/scan"),
///     Some(&routing),
///     Some(&ExtractionConstraints::default()),
/// )?;
/// println!("Extracted {} files", result.extracted_file_count);
/// # Ok(())
/// # }
/// ```
pub fn extract<R: Read + Seek>(
    kind: ArchiveKind,
    source: R,
    source_label: &str,
    output_dir: &Path,
    routing: Option<&RoutingConfig>,
    constraints: Option<&ExtractionConstraints>,
) -> Result<ExtractionResult> {
    match kind {
        ArchiveKind::Tar => extract_tar(source, source_label, output_dir, routing, constraints),
        ArchiveKind::Zip => {
            let stream = ZipEntryStream::new(source)?;
            run(stream, source_label, output_dir, transformer(routing), constraints)
        }
    }
}

/// Extracts a tar byte source, gzip-compressed or not, into `output_dir`.
///
/// Tar is read strictly sequentially, so any [`Read`] works, including
/// non-seekable network streams.
///
/// # Errors
///
/// Same as [`extract`].
pub fn extract_tar<R: Read>(
    source: R,
    source_label: &str,
    output_dir: &Path,
    routing: Option<&RoutingConfig>,
    constraints: Option<&ExtractionConstraints>,
) -> Result<ExtractionResult> {
    let mut archive = open_tar(source)?;
    let stream = archive.entries()?;
    run(stream, source_label, output_dir, transformer(routing), constraints)
}

fn transformer(routing: Option<&RoutingConfig>) -> &dyn PathTransformer {
    match routing {
        Some(routing) => routing,
        None => &KEEP_AS_IS,
    }
}

/// Extracts an archive file, detecting its kind from the extension when
/// `kind` is `None`.
///
/// Unknown extensions are treated as tar; gzip input is detected from its
/// magic bytes either way.
///
/// # Errors
///
/// Same as [`extract`], plus an I/O error if the file cannot be opened.
pub fn extract_file(
    archive_path: &Path,
    kind: Option<ArchiveKind>,
    output_dir: &Path,
    routing: Option<&RoutingConfig>,
    constraints: Option<&ExtractionConstraints>,
) -> Result<ExtractionResult> {
    let kind = kind
        .or_else(|| detect_kind(archive_path))
        .unwrap_or(ArchiveKind::Tar);
    let file = BufReader::new(File::open(archive_path)?);
    let label = archive_path.display().to_string();

    extract(kind, file, &label, output_dir, routing, constraints)
}

fn run<S: EntryStream>(
    mut stream: S,
    source_label: &str,
    output_dir: &Path,
    transformer: &dyn PathTransformer,
    constraints: Option<&ExtractionConstraints>,
) -> Result<ExtractionResult> {
    let engine = ExtractionEngine::new(output_dir, source_label, transformer)?;
    match constraints {
        Some(constraints) => engine.run(&mut Safeguard::new(stream, constraints.clone())),
        None => engine.run(&mut stream),
    }
}
