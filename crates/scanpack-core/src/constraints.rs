//! Resource budgets for extraction and creation.

use std::time::Duration;

use crate::Result;
use crate::ScanpackError;
use crate::size::Size;

/// Budgets an archive must stay within while it is extracted.
///
/// All limits are validated as strictly positive when constructed, so an
/// invalid setup fails before any archive byte is read.
///
/// # Examples
///
/// ```
/// use scanpack_core::ExtractionConstraints;
/// use scanpack_core::Size;
/// use std::time::Duration;
///
/// let constraints = ExtractionConstraints::new(
///     Size::parse("50MB")?,
///     1_000,
///     16,
///     Duration::from_secs(30),
/// )?;
/// assert_eq!(constraints.max_entries(), 1_000);
/// # Ok::<(), scanpack_core::ScanpackError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConstraints {
    max_uncompressed: Size,
    max_entries: usize,
    max_directory_depth: usize,
    timeout: Duration,
}

impl ExtractionConstraints {
    /// Creates a validated set of extraction budgets.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidConfiguration` if any limit is zero.
    pub fn new(
        max_uncompressed: Size,
        max_entries: usize,
        max_directory_depth: usize,
        timeout: Duration,
    ) -> Result<Self> {
        if max_uncompressed.bytes() == 0 {
            return Err(ScanpackError::config(
                "maximum uncompressed size must be greater than 0",
            ));
        }
        if max_entries == 0 {
            return Err(ScanpackError::config(
                "maximum number of entries must be greater than 0",
            ));
        }
        if max_directory_depth == 0 {
            return Err(ScanpackError::config(
                "maximum directory depth must be greater than 0",
            ));
        }
        if timeout.is_zero() {
            return Err(ScanpackError::config("timeout must be greater than 0"));
        }

        Ok(Self {
            max_uncompressed,
            max_entries,
            max_directory_depth,
            timeout,
        })
    }

    /// Returns a copy with a different uncompressed size budget.
    pub fn with_max_uncompressed(self, max_uncompressed: Size) -> Result<Self> {
        Self::new(
            max_uncompressed,
            self.max_entries,
            self.max_directory_depth,
            self.timeout,
        )
    }

    /// Returns a copy with a different file entry budget.
    pub fn with_max_entries(self, max_entries: usize) -> Result<Self> {
        Self::new(
            self.max_uncompressed,
            max_entries,
            self.max_directory_depth,
            self.timeout,
        )
    }

    /// Returns a copy with a different directory depth budget.
    pub fn with_max_directory_depth(self, max_directory_depth: usize) -> Result<Self> {
        Self::new(
            self.max_uncompressed,
            self.max_entries,
            max_directory_depth,
            self.timeout,
        )
    }

    /// Returns a copy with a different timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self> {
        Self::new(
            self.max_uncompressed,
            self.max_entries,
            self.max_directory_depth,
            timeout,
        )
    }

    /// Maximum cumulative uncompressed content.
    #[must_use]
    pub const fn max_uncompressed(&self) -> &Size {
        &self.max_uncompressed
    }

    /// Maximum number of file entries.
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Maximum directory depth.
    #[must_use]
    pub const fn max_directory_depth(&self) -> usize {
        self.max_directory_depth
    }

    /// Wall-clock budget for one extraction.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ExtractionConstraints {
    /// Creates constraints with conservative defaults.
    ///
    /// Default values:
    /// - `max_uncompressed`: 1GB
    /// - `max_entries`: 100 000
    /// - `max_directory_depth`: 128
    /// - `timeout`: 1 hour
    fn default() -> Self {
        Self {
            max_uncompressed: Size::gigabytes(1),
            max_entries: 100_000,
            max_directory_depth: 128,
            timeout: Duration::from_secs(3600),
        }
    }
}

/// Limits checked on an archive after it has been written.
///
/// Both checks are opt-in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreationConstraints {
    /// Largest acceptable archive file.
    ///
    /// Default: `None` (unlimited).
    pub max_compressed: Option<Size>,

    /// Largest acceptable uncompressed/compressed ratio.
    ///
    /// Default: `None` (unlimited).
    pub max_compression_ratio: Option<f64>,
}

impl CreationConstraints {
    /// Creates creation constraints without any limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum archive size.
    #[must_use]
    pub fn with_max_compressed(mut self, max: Size) -> Self {
        self.max_compressed = Some(max);
        self
    }

    /// Sets the maximum compression ratio.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidConfiguration` unless `ratio` is a
    /// finite value greater than zero.
    pub fn with_max_compression_ratio(mut self, ratio: f64) -> Result<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ScanpackError::config(format!(
                "maximum compression ratio must be positive, got {ratio}"
            )));
        }
        self.max_compression_ratio = Some(ratio);
        Ok(self)
    }
}
