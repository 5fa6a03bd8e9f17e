//! Human-readable byte-size limits such as `20MB`.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::Result;
use crate::ScanpackError;

const KIB: u64 = 1024;

/// An immutable byte-size limit parsed from text like `512KB`, `20MB` or
/// `1GB`.
///
/// Input is case-insensitive; the unit is normalized to upper case. Equality
/// and hashing cover both the normalized text and the byte count.
///
/// # Examples
///
/// ```
/// use scanpack_core::Size;
///
/// let size = Size::parse("20mb")?;
/// assert_eq!(size.as_str(), "20MB");
/// assert_eq!(size.bytes(), 20 * 1024 * 1024);
/// # Ok::<(), scanpack_core::ScanpackError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Size {
    normalized: String,
    bytes: u64,
}

impl Size {
    /// Parses `<digits>(KB|MB|GB)`.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidSizeFormat` for empty digits, unknown or
    /// missing units, fractions, signs, whitespace, or values overflowing
    /// `u64`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || ScanpackError::InvalidSizeFormat {
            input: text.to_string(),
        };

        let upper = text.to_ascii_uppercase();
        let split = upper.len().checked_sub(2).ok_or_else(invalid)?;
        if !upper.is_char_boundary(split) {
            return Err(invalid());
        }
        let (digits, unit) = upper.split_at(split);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let multiplier = match unit {
            "KB" => KIB,
            "MB" => KIB * KIB,
            "GB" => KIB * KIB * KIB,
            _ => return Err(invalid()),
        };

        let value: u64 = digits.parse().map_err(|_| invalid())?;
        let bytes = value.checked_mul(multiplier).ok_or_else(invalid)?;

        Ok(Self {
            normalized: upper,
            bytes,
        })
    }

    pub(crate) fn gigabytes(value: u64) -> Self {
        Self {
            normalized: format!("{value}GB"),
            bytes: value.saturating_mul(KIB * KIB * KIB),
        }
    }

    /// Returns the number of bytes.
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Returns the normalized textual form, e.g. `20MB`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl FromStr for Size {
    type Err = ScanpackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Size {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.normalized)
    }
}

impl<'de> Deserialize<'de> for Size {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(Size::parse("1KB").unwrap().bytes(), 1024);
        assert_eq!(Size::parse("3MB").unwrap().bytes(), 3 * 1024 * 1024);
        assert_eq!(Size::parse("2GB").unwrap().bytes(), 2 * 1024 * 1024 * 1024);
        assert_eq!(Size::parse("0KB").unwrap().bytes(), 0);
    }

    #[test]
    fn test_parse_normalizes_case() {
        let size = Size::parse("20mB").unwrap();
        assert_eq!(size.as_str(), "20MB");
        assert_eq!(size.to_string(), "20MB");
        assert_eq!(size, Size::parse("20MB").unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "", "MB", "20", "20 MB", " 20MB", "1.5MB", "-1MB", "+1MB", "20TB", "20B", "20KiB",
            "abcMB", "10mbx", "é", "ééMB",
        ] {
            let result = Size::parse(input);
            assert!(
                matches!(result, Err(ScanpackError::InvalidSizeFormat { .. })),
                "expected rejection for {input:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let result = Size::parse("99999999999999999999GB");
        assert!(matches!(result, Err(ScanpackError::InvalidSizeFormat { .. })));

        let result = Size::parse("18014398509481984GB");
        assert!(matches!(result, Err(ScanpackError::InvalidSizeFormat { .. })));
    }

    #[test]
    fn test_from_str() {
        let size: Size = "64kb".parse().unwrap();
        assert_eq!(size.bytes(), 64 * 1024);
    }

    #[test]
    fn test_serde_as_string() {
        let size: Size = serde_json::from_str("\"5mb\"").unwrap();
        assert_eq!(size.as_str(), "5MB");
        assert_eq!(serde_json::to_string(&size).unwrap(), "\"5MB\"");
        assert!(serde_json::from_str::<Size>("\"5 MB\"").is_err());
    }
}
