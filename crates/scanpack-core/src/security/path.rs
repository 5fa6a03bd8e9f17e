//! Zip-slip defense: resolving entry paths below the output directory.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::ScanpackError;

/// Resolves an entry path below `output_dir`.
///
/// `output_dir` must be canonical. The returned path is
/// `output_dir` joined with the normalized entry path; it equals `output_dir`
/// for empty paths and paths made only of `.` segments.
///
/// # Errors
///
/// Returns `ScanpackError::PathTraversal` before anything is written if the
/// entry path:
/// - contains a null byte
/// - is absolute or carries a drive prefix
/// - has a `..` segment, with either separator
/// - resolves through an existing symlink to a location outside `output_dir`
///
/// # Examples
///
/// ```
/// use scanpack_core::security::resolve_entry_path;
/// use std::path::Path;
///
/// let out = Path::new("/srv/out");
/// assert_eq!(
///     resolve_entry_path(out, "a/./b.txt")?,
///     Path::new("/srv/out/a/b.txt")
/// );
/// assert!(resolve_entry_path(out, "../../../etc/passwd").is_err());
/// # Ok::<(), scanpack_core::ScanpackError>(())
/// ```
pub fn resolve_entry_path(output_dir: &Path, entry_path: &str) -> Result<PathBuf> {
    let traversal = || ScanpackError::PathTraversal {
        path: entry_path.to_string(),
    };

    if entry_path.contains('\0') {
        return Err(traversal());
    }
    if entry_path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(traversal());
    }

    let mut resolved = output_dir.to_path_buf();
    for component in Path::new(entry_path).components() {
        match component {
            Component::Normal(segment) => resolved.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(traversal());
            }
        }
    }

    // An existing symlink inside the output tree could still redirect writes:
    // the deepest existing ancestor must canonicalize below the output dir.
    let mut probe = Some(resolved.as_path());
    while let Some(candidate) = probe {
        if !candidate.starts_with(output_dir) {
            break;
        }
        match candidate.canonicalize() {
            Ok(canonical) => {
                if !canonical.starts_with(output_dir) {
                    return Err(traversal());
                }
                break;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // dangling symlink
                if candidate.symlink_metadata().is_ok() {
                    return Err(traversal());
                }
                probe = candidate.parent();
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(resolved)
}
