//! Source tree walking for archive creation.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::Result;
use crate::ScanpackError;

/// One regular file to package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Location on disk.
    pub path: PathBuf,
    /// Path relative to the walk base, `/`-separated.
    pub relative_path: String,
}

/// Collects the regular files below `start`, or `start` itself if it is a
/// file, with paths relative to `base`.
///
/// Files are returned in file-name order so archives are reproducible.
/// Symlinks are not followed and not packaged, including `start` itself.
///
/// # Errors
///
/// Returns an error if:
/// - `start` does not exist
/// - A directory cannot be read
/// - A file lies outside `base`
pub fn collect_files(base: &Path, start: &Path) -> Result<Vec<SourceFile>> {
    collect_filtered(base, start, |_| true)
}

/// Like [`collect_files`], but consults `accept` with the relative path of
/// every file and directory, `start` included. A rejected directory is not
/// descended into.
///
/// # Errors
///
/// Same as [`collect_files`].
pub fn collect_filtered<F>(base: &Path, start: &Path, mut accept: F) -> Result<Vec<SourceFile>>
where
    F: FnMut(&str) -> bool,
{
    if fs::symlink_metadata(start).is_err() {
        return Err(ScanpackError::SourceNotFound {
            path: start.to_path_buf(),
        });
    }

    let walker = WalkDir::new(start)
        .follow_links(false)
        .follow_root_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match relative_to(base, entry.path()) {
            Ok(relative) if !relative.is_empty() => accept(&relative),
            _ => true,
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            std::io::Error::other(format!("cannot walk {}: {e}", start.display()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        let relative_path = relative_to(base, &path)?;
        files.push(SourceFile {
            path,
            relative_path,
        });
    }
    Ok(files)
}

fn relative_to(base: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(base)
        .map_err(|_| ScanpackError::OutsideWorkingDirectory {
            path: path.to_path_buf(),
            working_dir: base.to_path_buf(),
        })?;

    let segments: Vec<_> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect();
    Ok(segments.join("/"))
}
