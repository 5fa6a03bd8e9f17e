//! Error conversion utilities for CLI.
//!
//! Converts scanpack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance, and maps failures to
//! process exit codes.

use anyhow::anyhow;
use scanpack_core::SafeguardViolation;
use scanpack_core::ScanpackError;
use std::path::Path;
use std::process::ExitCode;

/// Generic failure.
pub const EXIT_FAILURE: u8 = 1;
/// Invalid options or configuration.
pub const EXIT_USAGE: u8 = 2;
/// Input rejected by a safeguard or path check.
pub const EXIT_POLICY: u8 = 3;
/// Filesystem failure.
pub const EXIT_IO: u8 = 4;

/// Converts `ScanpackError` to user-friendly anyhow error with context.
///
/// The original error stays in the chain so [`exit_code`] can classify it.
pub fn convert_error(err: ScanpackError, subject: &Path) -> anyhow::Error {
    let message = match &err {
        ScanpackError::PathTraversal { path } => format!(
            "Security violation: Archive '{}' attempted path traversal with '{path}'\n\
             HINT: This archive may be malicious. Do not extract from untrusted sources.",
            subject.display()
        ),
        ScanpackError::Safeguard { violation } => {
            let hint = match violation {
                SafeguardViolation::Timeout { .. } => "--timeout-secs",
                SafeguardViolation::SizeExceeded { .. } => "--max-size",
                SafeguardViolation::EntryCountExceeded { .. } => "--max-entries",
                SafeguardViolation::DepthExceeded { .. } => "--max-depth",
            };
            format!(
                "Extraction limit exceeded for '{}': {violation}\n\
                 HINT: Use {hint} to raise the limit if the archive is legitimate.",
                subject.display()
            )
        }
        ScanpackError::InvalidArchive(reason) => format!(
            "Invalid archive '{}': {reason}\n\
             HINT: The archive may be corrupted or of another kind; see --kind.",
            subject.display()
        ),
        ScanpackError::Io(io_err) => {
            format!("I/O error while processing '{}': {io_err}", subject.display())
        }
        _ => format!("Error processing '{}'", subject.display()),
    };
    anyhow::Error::from(err).context(message)
}

/// Adds context to a library result.
pub fn add_context<T>(result: Result<T, ScanpackError>, subject: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_error(e, subject))
}

/// Picks the exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> ExitCode {
    let code = err.downcast_ref::<ScanpackError>().map_or_else(
        || {
            if err.chain().any(|cause| cause.downcast_ref::<std::io::Error>().is_some()) {
                EXIT_IO
            } else {
                EXIT_FAILURE
            }
        },
        classify,
    );
    ExitCode::from(code)
}

fn classify(err: &ScanpackError) -> u8 {
    if let ScanpackError::ArchiveCreationFailed { source, .. } = err {
        return classify(source);
    }
    if err.is_policy_rejection() {
        EXIT_POLICY
    } else if err.is_configuration_error() {
        EXIT_USAGE
    } else if err.is_recoverable() || matches!(err, ScanpackError::SourceNotFound { .. }) {
        EXIT_IO
    } else {
        EXIT_FAILURE
    }
}

/// Error reported when a command needs a value the user did not supply.
pub fn usage_error(message: impl std::fmt::Display) -> anyhow::Error {
    anyhow!(ScanpackError::InvalidConfiguration {
        reason: message.to_string(),
    })
}
