//! Error types for archive packaging and extraction.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::size::Size;

/// Result type alias using `ScanpackError`.
pub type Result<T> = std::result::Result<T, ScanpackError>;

/// Budget enforced by the extraction safeguard that an archive exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafeguardViolation {
    /// Wall-clock budget for the whole extraction elapsed.
    Timeout {
        /// Configured timeout.
        limit: Duration,
    },
    /// Cumulative uncompressed content exceeded the size budget.
    SizeExceeded {
        /// Configured maximum.
        max: Size,
    },
    /// More file entries than allowed.
    EntryCountExceeded {
        /// Configured maximum.
        max: usize,
    },
    /// A directory entry nested deeper than allowed.
    DepthExceeded {
        /// Configured maximum.
        max: usize,
    },
}

impl std::fmt::Display for SafeguardViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { .. } => write!(f, "Timeout exceeded"),
            Self::SizeExceeded { max } => {
                write!(f, "File size exceeds the maximum allowed value of {max}")
            }
            Self::EntryCountExceeded { max } => {
                write!(f, "Number of entries exceeds the maximum allowed value of {max}")
            }
            Self::DepthExceeded { max } => {
                write!(f, "Directory depth exceeds the maximum allowed value of {max}")
            }
        }
    }
}

impl std::error::Error for SafeguardViolation {}

/// Errors that can occur while creating or extracting archives.
#[derive(Error, Debug)]
pub enum ScanpackError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Size string does not match `<digits>(KB|MB|GB)`.
    #[error("invalid size format: '{input}' (expected e.g. 20MB, 512KB, 1GB)")]
    InvalidSizeFormat {
        /// The rejected input.
        input: String,
    },

    /// A limit or option was rejected at construction.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong.
        reason: String,
    },

    /// A glob pattern failed to compile.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Byte source is not a valid archive of the declared kind.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Archive exceeded one of the extraction budgets.
    #[error("{violation}")]
    Safeguard {
        /// The exceeded budget.
        violation: SafeguardViolation,
    },

    /// Entry path would resolve outside the output directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The entry path as found in the archive.
        path: String,
    },

    /// A configured creation source does not exist.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A configured absolute creation path lies outside the working directory.
    #[error("path {path} is not inside working directory {working_dir}")]
    OutsideWorkingDirectory {
        /// The configured path.
        path: PathBuf,
        /// The canonical working directory.
        working_dir: PathBuf,
    },

    /// Produced archive is larger than allowed.
    #[error("archive too large: {size} bytes (max {max})")]
    ArchiveTooLarge {
        /// Archive size in bytes.
        size: u64,
        /// Configured maximum.
        max: Size,
    },

    /// Produced archive compresses suspiciously well.
    #[error(
        "compression ratio exceeded: compressed={compressed} bytes, uncompressed={uncompressed} bytes (ratio: {ratio:.2})"
    )]
    CompressionRatioExceeded {
        /// Compressed size in bytes.
        compressed: u64,
        /// Uncompressed size in bytes.
        uncompressed: u64,
        /// Compression ratio.
        ratio: f64,
    },

    /// Multi-archive creation failed, created archives were removed.
    #[error("Creation of archives failed - {source}{}", cleanup_suffix(.cleanup_failure.as_deref()))]
    ArchiveCreationFailed {
        /// The original failure.
        source: Box<ScanpackError>,
        /// Message of a failed cleanup attempt, if any.
        cleanup_failure: Option<String>,
    },
}

fn cleanup_suffix(cleanup_failure: Option<&str>) -> String {
    cleanup_failure.map_or_else(String::new, |msg| {
        format!(" (and auto cleanup of temporary data also failed: {msg})")
    })
}

impl ScanpackError {
    pub(crate) fn safeguard(violation: SafeguardViolation) -> Self {
        Self::Safeguard { violation }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the archive or input was rejected by policy.
    ///
    /// Policy rejections mean "this input is malicious or too large"; retrying
    /// the same input will fail again.
    ///
    /// # Examples
    ///
    /// ```
    /// use scanpack_core::ScanpackError;
    ///
    /// let err = ScanpackError::PathTraversal {
    ///     path: "../etc/passwd".into(),
    /// };
    /// assert!(err.is_policy_rejection());
    ///
    /// let err = ScanpackError::InvalidArchive("truncated".into());
    /// assert!(!err.is_policy_rejection());
    /// ```
    #[must_use]
    pub fn is_policy_rejection(&self) -> bool {
        match self {
            Self::Safeguard { .. }
            | Self::PathTraversal { .. }
            | Self::OutsideWorkingDirectory { .. }
            | Self::ArchiveTooLarge { .. }
            | Self::CompressionRatioExceeded { .. } => true,
            Self::ArchiveCreationFailed { source, .. } => source.is_policy_rejection(),
            _ => false,
        }
    }

    /// Returns `true` for errors raised while validating options.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSizeFormat { .. }
                | Self::InvalidConfiguration { .. }
                | Self::InvalidGlobPattern { .. }
        )
    }

    /// Returns `true` if the failure is transient and the call may be retried.
    ///
    /// Only filesystem failures qualify.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::ArchiveCreationFailed { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    /// Returns the safeguard violation, if this error is one.
    #[must_use]
    pub const fn safeguard_violation(&self) -> Option<&SafeguardViolation> {
        match self {
            Self::Safeguard { violation } => Some(violation),
            _ => None,
        }
    }

    /// Returns a context string for this error, if available.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive(msg) => Some(msg),
            Self::InvalidConfiguration { reason } => Some(reason),
            Self::ArchiveCreationFailed { source, .. } => source.context(),
            _ => None,
        }
    }
}
