//! Hostile-archive scenarios: traversal, bombs, budgets and links.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use scanpack_core::ArchiveKind;
use scanpack_core::ExtractionConstraints;
use scanpack_core::SafeguardViolation;
use scanpack_core::ScanpackError;
use scanpack_core::Size;
use scanpack_core::extract;
use scanpack_core::formats::ArchiveEntry;
use scanpack_core::formats::EntryStream;
use scanpack_core::security::Safeguard;
use std::fs;
use std::io::Cursor;
use std::io::Write;
use std::time::Duration;
use tempfile::TempDir;

/// Builds a tar whose single entry carries `name` verbatim, bypassing the
/// path checks of `tar::Builder::append_data`.
fn raw_tar_entry(name: &str, content: &[u8]) -> Vec<u8> {
    let mut header = tar::Header::new_gnu();
    header.as_gnu_mut().unwrap().name[..name.len()].copy_from_slice(name.as_bytes());
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();

    let mut builder = tar::Builder::new(Vec::new());
    builder.append(&header, content).unwrap();
    builder.into_inner().unwrap()
}

fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (path, data) in entries {
        zip.start_file(*path, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn limits(max: &str, entries: usize, depth: usize) -> ExtractionConstraints {
    ExtractionConstraints::new(Size::parse(max).unwrap(), entries, depth, Duration::from_secs(60))
        .unwrap()
}

fn violation(err: &ScanpackError) -> &SafeguardViolation {
    match err {
        ScanpackError::Safeguard { violation } => violation,
        other => panic!("expected safeguard violation, got {other:?}"),
    }
}

#[test]
fn test_tar_traversal_is_rejected_before_writing() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let archive = raw_tar_entry("../../../escaped.txt", b"pwned");

    let err = extract(ArchiveKind::Tar, Cursor::new(archive), "evil.tar", &out, None, None)
        .unwrap_err();

    assert!(matches!(err, ScanpackError::PathTraversal { ref path } if path == "../../../escaped.txt"));
    assert!(err.is_policy_rejection());
    assert!(!temp.path().join("escaped.txt").exists());
    assert!(fs::read_dir(&out).unwrap().next().is_none());
}

#[test]
fn test_zip_traversal_variants_are_rejected() {
    for name in ["../evil.txt", "a/../../evil.txt", "a\\..\\..\\evil.txt"] {
        let temp = TempDir::new().unwrap();
        let archive = zip_of(&[(name, b"x")]);

        let err = extract(ArchiveKind::Zip, Cursor::new(archive), "evil.zip", temp.path(), None, None)
            .unwrap_err();

        assert!(matches!(err, ScanpackError::PathTraversal { .. }), "{name}: {err:?}");
    }
}

#[test]
fn test_zip_bomb_fails_while_streaming() {
    let temp = TempDir::new().unwrap();
    let archive = zip_of(&[("zeros.bin", &vec![0u8; 1024 * 1024])]);
    assert!(archive.len() < 16 * 1024);

    let err = extract(
        ArchiveKind::Zip,
        Cursor::new(archive),
        "bomb.zip",
        temp.path(),
        None,
        Some(&limits("64KB", 100, 10)),
    )
    .unwrap_err();

    assert!(matches!(violation(&err), SafeguardViolation::SizeExceeded { .. }));
    let written = fs::metadata(temp.path().join("zeros.bin")).map_or(0, |m| m.len());
    assert!(written <= 64 * 1024);
}

#[test]
fn test_entry_count_boundary() {
    let entries: Vec<(String, Vec<u8>)> = (0..5).map(|i| (format!("f{i}.txt"), vec![b'x'])).collect();
    let borrowed: Vec<(&str, &[u8])> = entries.iter().map(|(p, d)| (p.as_str(), d.as_slice())).collect();
    let archive = zip_of(&borrowed);

    let temp = TempDir::new().unwrap();
    let result = extract(
        ArchiveKind::Zip,
        Cursor::new(archive.clone()),
        "ok.zip",
        temp.path(),
        None,
        Some(&limits("1MB", 5, 10)),
    )
    .unwrap();
    assert_eq!(result.extracted_file_count, 5);

    let temp = TempDir::new().unwrap();
    let err = extract(
        ArchiveKind::Zip,
        Cursor::new(archive),
        "many.zip",
        temp.path(),
        None,
        Some(&limits("1MB", 4, 10)),
    )
    .unwrap_err();
    assert_eq!(violation(&err), &SafeguardViolation::EntryCountExceeded { max: 4 });
}

#[test]
fn test_directory_depth_boundary() {
    let tar = |dir: &str| {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Directory);
        header.set_cksum();
        builder.append_data(&mut header, dir, std::io::empty()).unwrap();
        builder.into_inner().unwrap()
    };

    let temp = TempDir::new().unwrap();
    let result = extract(
        ArchiveKind::Tar,
        Cursor::new(tar("a/b/c/")),
        "ok.tar",
        temp.path(),
        None,
        Some(&limits("1MB", 10, 3)),
    )
    .unwrap();
    assert_eq!(result.created_folder_count, 3);

    let temp = TempDir::new().unwrap();
    let err = extract(
        ArchiveKind::Tar,
        Cursor::new(tar("a/b/c/d/")),
        "deep.tar",
        temp.path(),
        None,
        Some(&limits("1MB", 10, 3)),
    )
    .unwrap_err();
    assert_eq!(violation(&err), &SafeguardViolation::DepthExceeded { max: 3 });
    assert!(!temp.path().join("a").exists());
}

struct SlowStream {
    remaining: usize,
    delay: Duration,
}

impl EntryStream for SlowStream {
    fn next_entry(&mut self) -> scanpack_core::Result<Option<ArchiveEntry<'_>>> {
        std::thread::sleep(self.delay);
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(ArchiveEntry {
            path: format!("slow-{}.txt", self.remaining),
            is_dir: false,
            reader: Box::new(std::io::empty()),
        }))
    }
}

#[test]
fn test_timeout_stops_slow_archive() {
    let constraints = limits("1MB", 100, 10)
        .with_timeout(Duration::from_millis(10))
        .unwrap();
    let mut guarded = Safeguard::new(
        SlowStream {
            remaining: 10,
            delay: Duration::from_millis(25),
        },
        constraints,
    );

    assert!(guarded.next_entry().unwrap().is_some());
    let err = guarded.next_entry().unwrap_err();
    assert!(matches!(violation(&err), SafeguardViolation::Timeout { .. }));
    assert_eq!(err.to_string(), "Timeout exceeded");
}

#[test]
fn test_tar_links_are_not_materialized() {
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(0);
    header.set_entry_type(tar::EntryType::Symlink);
    header.set_cksum();
    builder.append_link(&mut header, "passwd", "/etc/passwd").unwrap();

    let mut header = tar::Header::new_gnu();
    header.set_size(0);
    header.set_entry_type(tar::EntryType::Link);
    header.set_cksum();
    builder.append_link(&mut header, "hard", "/etc/shadow").unwrap();

    let mut header = tar::Header::new_gnu();
    header.set_size(2);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, "ok.txt", &b"ok"[..]).unwrap();
    let archive = builder.into_inner().unwrap();

    let temp = TempDir::new().unwrap();
    let result = extract(ArchiveKind::Tar, Cursor::new(archive), "links.tar", temp.path(), None, None)
        .unwrap();

    assert_eq!(result.extracted_file_count, 1);
    assert!(fs::symlink_metadata(temp.path().join("passwd")).is_err());
    assert!(fs::symlink_metadata(temp.path().join("hard")).is_err());
}

#[cfg(unix)]
#[test]
fn test_existing_symlink_in_output_is_not_followed() {
    let temp = TempDir::new().unwrap();
    let outside = temp.path().join("outside");
    let out = temp.path().join("out");
    fs::create_dir_all(&outside).unwrap();
    fs::create_dir_all(&out).unwrap();
    std::os::unix::fs::symlink(&outside, out.join("link")).unwrap();

    let archive = zip_of(&[("link/planted.txt", b"x")]);
    let err = extract(ArchiveKind::Zip, Cursor::new(archive), "plant.zip", &out, None, None)
        .unwrap_err();

    assert!(matches!(err, ScanpackError::PathTraversal { .. }));
    assert!(!outside.join("planted.txt").exists());
}

#[test]
fn test_skipped_gzip_content_counts_against_size_budget() {
    let mut builder = tar::Builder::new(Vec::new());
    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    dir.set_cksum();
    builder.append_data(&mut dir, "a/", &[][..]).unwrap();
    for (path, size) in [("a", 256 * 1024), ("b.txt", 1)] {
        let mut header = tar::Header::new_gnu();
        header.set_size(size as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, &vec![0u8; size][..]).unwrap();
    }
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::best());
    encoder.write_all(&builder.into_inner().unwrap()).unwrap();
    let archive = encoder.finish().unwrap();
    assert!(archive.len() < 16 * 1024);

    let temp = TempDir::new().unwrap();
    let err = extract(
        ArchiveKind::Tar,
        Cursor::new(archive),
        "shadowed.tgz",
        temp.path(),
        None,
        Some(&limits("64KB", 100, 10)),
    )
    .unwrap_err();

    assert!(matches!(violation(&err), SafeguardViolation::SizeExceeded { .. }));
    assert!(temp.path().join("a").is_dir());
    assert!(!temp.path().join("b.txt").exists());
}
