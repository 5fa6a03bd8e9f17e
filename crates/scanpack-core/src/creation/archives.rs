//! Assembly of the scan archives from a scan configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::context::CreationContext;
use super::context::ROOT_REFERENCE_NAME;
use super::report::CreationReport;
use super::walker::collect_files;
use super::walker::collect_filtered;
use super::writer::write_archive;
use crate::Result;
use crate::ScanpackError;
use crate::constraints::CreationConstraints;
use crate::formats::ArchiveKind;
use crate::routing::DataConfigurationObject;
use crate::routing::ScanConfiguration;

/// File name of the source code archive.
pub const SOURCECODE_ARCHIVE_NAME: &str = "sourcecode.zip";

/// File name of the binaries archive.
pub const BINARIES_ARCHIVE_NAME: &str = "binaries.tar";

/// Archives produced by [`ArchiveAssembler::create_archives`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchivesCreationResult {
    /// The source code zip, if any set contributed to it.
    pub source_archive: Option<CreationReport>,
    /// The binaries tar, if any set contributed to it.
    pub binary_archive: Option<CreationReport>,
}

impl ArchivesCreationResult {
    /// Path of the source code archive, if created.
    #[must_use]
    pub fn source_archive_file(&self) -> Option<&Path> {
        self.source_archive.as_ref().map(|r| r.archive.as_path())
    }

    /// Path of the binaries archive, if created.
    #[must_use]
    pub fn binary_archive_file(&self) -> Option<&Path> {
        self.binary_archive.as_ref().map(|r| r.archive.as_path())
    }

    /// Returns `true` if the source code archive was created.
    #[must_use]
    pub const fn is_source_archive_created(&self) -> bool {
        self.source_archive.is_some()
    }

    /// Returns `true` if the binaries archive was created.
    #[must_use]
    pub const fn is_binary_archive_created(&self) -> bool {
        self.binary_archive.is_some()
    }
}

/// Builds the source code and binaries archives of a scan.
///
/// # Examples
///
/// ```no_run
/// use scanpack_core::ScanConfiguration;
/// use scanpack_core::creation::ArchiveAssembler;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ScanConfiguration::from_json(&std::fs::read_to_string("scan.json")?)?;
/// let result = ArchiveAssembler::new()
///     .with_create_missing_files(true)
///     .create_archives(&config, Path::new("."), Path::new("/tmp/upload"))?;
/// if let Some(zip) = result.source_archive_file() {
///     println!("source code archive: {}", zip.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveAssembler {
    create_missing_files: bool,
    constraints: CreationConstraints,
}

impl ArchiveAssembler {
    /// Creates an assembler that fails on missing sources and applies no
    /// size limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces missing relative sources by empty placeholder files.
    #[must_use]
    pub const fn with_create_missing_files(mut self, create_missing_files: bool) -> Self {
        self.create_missing_files = create_missing_files;
        self
    }

    /// Sets the limits every produced archive is checked against.
    #[must_use]
    pub fn with_constraints(mut self, constraints: CreationConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Creates `sourcecode.zip` and `binaries.tar` in `target_folder`.
    ///
    /// An archive without any configured path is not created. When one
    /// archive fails, the archives created so far are deleted.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::ArchiveCreationFailed` wrapping the original
    /// failure, plus the cleanup failure if deleting also failed.
    pub fn create_archives(
        &self,
        config: &ScanConfiguration,
        working_dir: &Path,
        target_folder: &Path,
    ) -> Result<ArchivesCreationResult> {
        let mut result = ArchivesCreationResult::default();

        match self.create_into(config, working_dir, target_folder, &mut result) {
            Ok(()) => Ok(result),
            Err(source) => {
                let cleanup_failure = delete_archives(&result).err().map(|e| e.to_string());
                Err(ScanpackError::ArchiveCreationFailed {
                    source: Box::new(source),
                    cleanup_failure,
                })
            }
        }
    }

    fn create_into(
        &self,
        config: &ScanConfiguration,
        working_dir: &Path,
        target_folder: &Path,
        result: &mut ArchivesCreationResult,
    ) -> Result<()> {
        let working_dir = working_dir
            .canonicalize()
            .map_err(|_| ScanpackError::SourceNotFound {
                path: working_dir.to_path_buf(),
            })?;
        fs::create_dir_all(target_folder)?;

        let sources = sources_context(config)?;
        if !sources.is_empty() {
            let output = target_folder.join(SOURCECODE_ARCHIVE_NAME);
            result.source_archive = Some(self.build_archive(&sources, &working_dir, &output)?);
        }

        let binaries = binaries_context(config)?;
        if !binaries.is_empty() {
            let output = target_folder.join(BINARIES_ARCHIVE_NAME);
            result.binary_archive = Some(self.build_archive(&binaries, &working_dir, &output)?);
        }
        Ok(())
    }

    /// Packages every set of `context` into one archive at `output`.
    ///
    /// `working_dir` must be canonical. Entry paths are relative to it, and
    /// prefixed with `__data__/<name>/` for named sets. Files reachable through
    /// several configured paths are packaged once. Each set's filter is
    /// checked against files and directories; see
    /// [`CreationPathSet::accepts`](super::CreationPathSet::accepts).
    ///
    /// # Errors
    ///
    /// Returns an error if a source is missing or outside `working_dir`, or
    /// if writing fails. The partial archive is removed.
    pub fn build_archive(
        &self,
        context: &CreationContext,
        working_dir: &Path,
        output: &Path,
    ) -> Result<CreationReport> {
        let mut placeholders_created = 0;
        let mut files_skipped = 0;
        let mut entries = BTreeMap::new();

        for (name, set) in context.path_sets() {
            let prefix = CreationContext::entry_prefix(name);
            for configured in set.paths() {
                let (source, placeholder) = self.resolve_source(working_dir, configured)?;
                placeholders_created += usize::from(placeholder);

                let files = collect_filtered(working_dir, &source, |relative| {
                    let accepted = set.accepts(relative);
                    if !accepted {
                        debug!(reference = name, path = relative, "filtered out");
                        files_skipped += 1;
                    }
                    accepted
                })?;
                for file in files {
                    entries.insert(format!("{prefix}{}", file.relative_path), file.path);
                }
            }
        }

        let mut report = write_archive(
            context.kind(),
            output,
            entries.iter().map(|(entry, path)| (entry.clone(), path.as_path())),
            &self.constraints,
        )?;
        report.files_skipped = files_skipped;
        report.placeholders_created = placeholders_created;
        Ok(report)
    }

    /// Resolves a configured path; the flag is `true` if a placeholder was
    /// created for it.
    fn resolve_source(&self, working_dir: &Path, configured: &str) -> Result<(PathBuf, bool)> {
        let path = Path::new(configured);
        let escapes = path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes || (path.is_absolute() && !path.starts_with(working_dir)) {
            return Err(ScanpackError::OutsideWorkingDirectory {
                path: path.to_path_buf(),
                working_dir: working_dir.to_path_buf(),
            });
        }

        let resolved = working_dir.join(path);
        if resolved.exists() {
            return Ok((resolved, false));
        }
        if !self.create_missing_files {
            return Err(ScanpackError::SourceNotFound { path: resolved });
        }

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::File::create(&resolved)?;
        warn!(path = %resolved.display(), "source missing, created empty placeholder");
        Ok((resolved, true))
    }
}

/// Creates both scan archives with default options.
///
/// # Errors
///
/// See [`ArchiveAssembler::create_archives`].
pub fn create_archives(
    config: &ScanConfiguration,
    working_dir: &Path,
    target_folder: &Path,
) -> Result<ArchivesCreationResult> {
    ArchiveAssembler::new().create_archives(config, working_dir, target_folder)
}

/// Deletes the archives recorded in `result`. Missing files are ignored.
///
/// # Errors
///
/// Returns an I/O error if an existing archive cannot be removed.
pub fn delete_archives(result: &ArchivesCreationResult) -> Result<()> {
    for archive in [result.binary_archive_file(), result.source_archive_file()]
        .into_iter()
        .flatten()
    {
        match fs::remove_file(archive) {
            Ok(()) => debug!(path = %archive.display(), "deleted archive"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Sets for the source code zip: the legacy code scan paths at the root and
/// every `data.sources` entry.
///
/// # Errors
///
/// Returns `ScanpackError::InvalidGlobPattern` for a bad include/exclude.
pub fn sources_context(config: &ScanConfiguration) -> Result<CreationContext> {
    let mut context = CreationContext::new(ArchiveKind::Zip);

    if let Some(code_scan) = &config.code_scan
        && let Some(file_system) = &code_scan.file_system
    {
        context.add_paths(
            ROOT_REFERENCE_NAME,
            file_system.files.iter().chain(&file_system.folders).cloned(),
            code_scan.includes.iter().cloned(),
            code_scan.excludes.iter().cloned(),
        )?;
    }

    if let Some(data) = &config.data {
        add_data_sets(&mut context, &data.sources)?;
    }
    Ok(context)
}

/// Sets for the binaries tar: every `data.binaries` entry.
///
/// # Errors
///
/// Returns `ScanpackError::InvalidGlobPattern` for a bad include/exclude.
pub fn binaries_context(config: &ScanConfiguration) -> Result<CreationContext> {
    let mut context = CreationContext::new(ArchiveKind::Tar);
    if let Some(data) = &config.data {
        add_data_sets(&mut context, &data.binaries)?;
    }
    Ok(context)
}

fn add_data_sets(context: &mut CreationContext, sets: &[DataConfigurationObject]) -> Result<()> {
    for set in sets {
        let Some(file_system) = &set.file_system else {
            continue;
        };
        context.add_paths(
            &set.name,
            file_system.files.iter().chain(&file_system.folders).cloned(),
            set.includes.iter().cloned(),
            set.excludes.iter().cloned(),
        )?;
    }
    Ok(())
}

/// Packages the contents of `folder` into `target_file`.
///
/// Entry paths are relative to `folder`; no prefix and no filter apply. An
/// existing `target_file` is replaced and its parent directories are created.
///
/// # Errors
///
/// Returns `ScanpackError::SourceNotFound` if `folder` doesn't exist, or an
/// error if writing fails.
pub fn compress_folder(kind: ArchiveKind, folder: &Path, target_file: &Path) -> Result<CreationReport> {
    if !folder.is_dir() {
        return Err(ScanpackError::SourceNotFound {
            path: folder.to_path_buf(),
        });
    }
    let folder = folder.canonicalize()?;

    match fs::remove_file(target_file) {
        Ok(()) => debug!(path = %target_file.display(), "replaced existing archive"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    if let Some(parent) = target_file.parent() {
        fs::create_dir_all(parent)?;
    }

    let files = collect_files(&folder, &folder)?;
    let report = write_archive(
        kind,
        target_file,
        files.iter().map(|f| (f.relative_path.clone(), f.path.as_path())),
        &CreationConstraints::default(),
    )?;

    info!(folder = %folder.display(), archive = %target_file.display(), %kind, "compressed folder");
    Ok(report)
}
