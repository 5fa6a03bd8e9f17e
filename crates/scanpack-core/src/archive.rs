//! Archive handles and extraction builders.

use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionConstraints;
use crate::ExtractionResult;
use crate::Result;
use crate::RoutingConfig;
use crate::ScanpackError;
use crate::formats::ArchiveKind;
use crate::formats::detect_kind;

/// An archive file with its declared kind.
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
    kind: ArchiveKind,
}

impl Archive {
    /// Opens an archive, detecting its kind from the extension.
    ///
    /// Unknown extensions fall back to tar.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::SourceNotFound` if the file doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let kind = detect_kind(path).unwrap_or(ArchiveKind::Tar);
        Self::with_kind(path, kind)
    }

    /// Opens an archive of an explicit kind.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::SourceNotFound` if the file doesn't exist.
    pub fn with_kind<P: AsRef<Path>>(path: P, kind: ArchiveKind) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ScanpackError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    /// Returns the path to the archive file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the archive kind.
    #[must_use]
    pub const fn kind(&self) -> ArchiveKind {
        self.kind
    }

    /// Extracts every entry under its original path, with default budgets.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails or a budget is exceeded.
    pub fn extract<P: AsRef<Path>>(&self, output_dir: P) -> Result<ExtractionResult> {
        crate::api::extract_file(
            &self.path,
            Some(self.kind),
            output_dir.as_ref(),
            None,
            Some(&ExtractionConstraints::default()),
        )
    }
}

/// Builder for configuring one extraction.
///
/// # Examples
///
/// ```no_run
/// use scanpack_core::ArchiveBuilder;
/// use scanpack_core::ExtractionConstraints;
/// use scanpack_core::RoutingConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let result = ArchiveBuilder::new()
///     .archive("sourcecode.zip")
///     .output_dir("/tmp/scan")
///     .routing(RoutingConfig::new(true, ["api"]))
///     .constraints(ExtractionConstraints::default().with_max_entries(500)?)
///     .extract()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    archive_path: Option<PathBuf>,
    kind: Option<ArchiveKind>,
    output_dir: Option<PathBuf>,
    routing: Option<RoutingConfig>,
    constraints: Option<ExtractionConstraints>,
    unguarded: bool,
}

impl ArchiveBuilder {
    /// Creates a new `ArchiveBuilder`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the archive file path.
    #[must_use]
    pub fn archive<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.archive_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Declares the archive kind instead of detecting it.
    #[must_use]
    pub const fn kind(mut self, kind: ArchiveKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Routes entries through `routing`; without it every entry is kept.
    #[must_use]
    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Sets the safeguard budgets. Defaults apply when unset.
    #[must_use]
    pub fn constraints(mut self, constraints: ExtractionConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Disables the safeguard, for archives produced by this process.
    #[must_use]
    pub const fn unguarded(mut self) -> Self {
        self.unguarded = true;
        self
    }

    /// Executes the extraction with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `archive_path` or `output_dir` are not set,
    /// or if extraction fails.
    pub fn extract(self) -> Result<ExtractionResult> {
        let archive_path = self
            .archive_path
            .ok_or_else(|| ScanpackError::config("archive path not set"))?;
        let output_dir = self
            .output_dir
            .ok_or_else(|| ScanpackError::config("output directory not set"))?;

        let constraints = if self.unguarded {
            None
        } else {
            Some(self.constraints.unwrap_or_default())
        };

        crate::api::extract_file(
            &archive_path,
            self.kind,
            &output_dir,
            self.routing.as_ref(),
            constraints.as_ref(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::TarTestBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_archive_builder() {
        let builder = ArchiveBuilder::new()
            .archive("test.tar")
            .output_dir("/tmp/test");

        assert!(builder.archive_path.is_some());
        assert!(builder.output_dir.is_some());
        assert!(builder.routing.is_none());
    }

    #[test]
    fn test_archive_builder_missing_path() {
        let result = ArchiveBuilder::new().output_dir("/tmp/test").extract();
        assert!(result.unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_archive_builder_missing_output() {
        let result = ArchiveBuilder::new().archive("test.tar").extract();
        assert!(result.unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_archive_open_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = Archive::open(temp.path().join("missing.zip")).unwrap_err();
        assert!(matches!(err, ScanpackError::SourceNotFound { .. }));
    }

    #[test]
    fn test_archive_open_detects_kind_and_extracts() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bundle.tgz");
        std::fs::write(&path, TarTestBuilder::new().add_file("x.txt", b"x").build_gz()).unwrap();

        let archive = Archive::open(&path).unwrap();
        assert_eq!(archive.kind(), ArchiveKind::Tar);
        assert_eq!(archive.path(), path);

        let result = archive.extract(temp.path().join("out")).unwrap();
        assert_eq!(result.extracted_file_count, 1);
    }

    #[test]
    fn test_builder_applies_routing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upload.tar");
        let tar = TarTestBuilder::new()
            .add_file("root.txt", b"r")
            .add_file("__data__/lic/LICENSE", b"MIT")
            .build();
        std::fs::write(&path, tar).unwrap();
        let out = temp.path().join("out");

        let result = ArchiveBuilder::new()
            .archive(&path)
            .output_dir(&out)
            .routing(RoutingConfig::new(false, ["lic"]))
            .unguarded()
            .extract()
            .unwrap();

        assert_eq!(result.extracted_file_count, 1);
        assert!(out.join("LICENSE").is_file());
        assert!(!out.join("root.txt").exists());
    }
}
