//! Archive kind declaration and detection.

use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use crate::Result;
use crate::ScanpackError;

/// Gzip stream magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Supported archive layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// Tar archive, optionally gzip-compressed.
    Tar,
    /// ZIP archive.
    Zip,
}

impl ArchiveKind {
    /// Lower-case name, also used as file extension.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveKind {
    type Err = ScanpackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tar" => Ok(Self::Tar),
            "zip" => Ok(Self::Zip),
            _ => Err(ScanpackError::config(format!(
                "unsupported archive kind: {s} (expected tar or zip)"
            ))),
        }
    }
}

/// Guesses the archive kind from a file name.
///
/// Returns `None` for unknown extensions.
#[must_use]
pub fn detect_kind(path: &Path) -> Option<ArchiveKind> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "tar" | "tgz" => Some(ArchiveKind::Tar),
        "gz" => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| stem.to_ascii_lowercase().ends_with(".tar"))
            .map(|_| ArchiveKind::Tar),
        "zip" => Some(ArchiveKind::Zip),
        _ => None,
    }
}

/// Returns `true` if the buffered stream starts with the gzip magic.
///
/// Does not consume any bytes.
pub(crate) fn is_gzip<R: BufRead>(reader: &mut R) -> std::io::Result<bool> {
    let buffer = reader.fill_buf()?;
    Ok(buffer.starts_with(&GZIP_MAGIC))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::BufReader;
    use std::io::Read;
    use std::path::PathBuf;

    #[test]
    fn test_detect_kind() {
        assert_eq!(detect_kind(&PathBuf::from("a.tar")), Some(ArchiveKind::Tar));
        assert_eq!(detect_kind(&PathBuf::from("a.TGZ")), Some(ArchiveKind::Tar));
        assert_eq!(detect_kind(&PathBuf::from("a.tar.gz")), Some(ArchiveKind::Tar));
        assert_eq!(detect_kind(&PathBuf::from("a.zip")), Some(ArchiveKind::Zip));
        assert_eq!(detect_kind(&PathBuf::from("a.gz")), None);
        assert_eq!(detect_kind(&PathBuf::from("a.7z")), None);
        assert_eq!(detect_kind(&PathBuf::from("noext")), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("TAR".parse::<ArchiveKind>().unwrap(), ArchiveKind::Tar);
        assert_eq!("zip".parse::<ArchiveKind>().unwrap(), ArchiveKind::Zip);
        assert!("rar".parse::<ArchiveKind>().unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_is_gzip_does_not_consume() {
        let data = [0x1f, 0x8b, 0x08, 0x00];
        let mut reader = BufReader::new(&data[..]);
        assert!(is_gzip(&mut reader).unwrap());

        let mut all = Vec::new();
        reader.read_to_end(&mut all).unwrap();
        assert_eq!(all, data);

        let mut plain = BufReader::new(&b"ustar"[..]);
        assert!(!is_gzip(&mut plain).unwrap());

        let mut empty = BufReader::new(&b""[..]);
        assert!(!is_gzip(&mut empty).unwrap());
    }
}
