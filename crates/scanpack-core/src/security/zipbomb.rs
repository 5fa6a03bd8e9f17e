//! Post-creation checks on produced archives.

use crate::Result;
use crate::ScanpackError;
use crate::constraints::CreationConstraints;

/// Validates a produced archive against the creation constraints.
///
/// # Errors
///
/// Returns `ScanpackError::ArchiveTooLarge` or
/// `ScanpackError::CompressionRatioExceeded` when a configured limit is
/// exceeded.
pub fn validate_created_archive(
    compressed_size: u64,
    uncompressed_size: u64,
    constraints: &CreationConstraints,
) -> Result<()> {
    if let Some(max) = &constraints.max_compressed
        && compressed_size > max.bytes()
    {
        return Err(ScanpackError::ArchiveTooLarge {
            size: compressed_size,
            max: max.clone(),
        });
    }

    if let Some(max_ratio) = constraints.max_compression_ratio {
        validate_compression_ratio(compressed_size, uncompressed_size, max_ratio)?;
    }

    Ok(())
}

/// Validates the uncompressed/compressed ratio.
///
/// # Errors
///
/// Returns an error if the compression ratio exceeds `max_ratio`.
pub fn validate_compression_ratio(
    compressed_size: u64,
    uncompressed_size: u64,
    max_ratio: f64,
) -> Result<()> {
    if compressed_size == 0 {
        return Ok(());
    }

    let ratio = uncompressed_size as f64 / compressed_size as f64;

    if ratio > max_ratio {
        return Err(ScanpackError::CompressionRatioExceeded {
            compressed: compressed_size,
            uncompressed: uncompressed_size,
            ratio,
        });
    }

    Ok(())
}
