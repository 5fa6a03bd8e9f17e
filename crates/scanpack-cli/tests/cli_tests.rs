//! Integration tests for scanpack-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn scanpack_cmd() -> Command {
    cargo_bin_cmd!("scanpack")
}

/// Writes a zip with root content and two named content sets.
fn routed_zip(dir: &Path) -> PathBuf {
    let path = dir.join("sourcecode.zip");
    let mut zip = zip::ZipWriter::new(fs::File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in [
        ("src/Main.java", "class Main {}"),
        ("__data__/open-api/openapi.yaml", "openapi: 3.0.0"),
        ("__data__/other/notes.txt", "notes"),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

fn traversal_tar(dir: &Path) -> PathBuf {
    let mut header = tar::Header::new_gnu();
    let name = b"../escaped.txt";
    header.as_gnu_mut().unwrap().name[..name.len()].copy_from_slice(name);
    header.set_size(1);
    header.set_mode(0o644);
    header.set_cksum();
    let mut builder = tar::Builder::new(Vec::new());
    builder.append(&header, &b"x"[..]).unwrap();

    let path = dir.join("evil.tar");
    fs::write(&path, builder.into_inner().unwrap()).unwrap();
    path
}

const WEB_SCAN_CONFIG: &str = r#"{
    "webScan": { "api": { "use": ["open-api"] } },
    "data": {
        "sources": [ { "name": "open-api", "fileSystem": { "folders": ["contracts"] } } ]
    }
}"#;

#[test]
fn test_version_flag() {
    scanpack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scanpack"));
}

#[test]
fn test_extract_help() {
    scanpack_cmd()
        .arg("extract")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extract archive contents"))
        .stdout(predicate::str::contains("--max-size"));
}

#[test]
fn test_extract_creates_files() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = routed_zip(temp.path());
    let out = temp.path().join("out");

    scanpack_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extraction complete"));

    assert!(out.join("src/Main.java").exists());
    assert!(out.join("__data__/open-api/openapi.yaml").exists());
}

#[test]
fn test_extract_routed_json_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = routed_zip(temp.path());
    let config = temp.path().join("scan.json");
    fs::write(&config, WEB_SCAN_CONFIG).unwrap();
    let out = temp.path().join("out");

    let output = scanpack_cmd()
        .arg("--json")
        .arg("extract")
        .arg(&archive)
        .arg(&out)
        .arg("--scan-config")
        .arg(&config)
        .arg("--scan-type")
        .arg("web-scan")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "success");
    assert_eq!(json["operation"], "extract");
    assert_eq!(json["data"]["extracted_file_count"], 1);
    assert_eq!(json["data"]["skipped_entry_count"], 2);
    assert!(out.join("openapi.yaml").exists());
    assert!(!out.join("src").exists());
}

#[test]
fn test_extract_traversal_exit_code() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = traversal_tar(temp.path());

    scanpack_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(temp.path().join("out"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("path traversal"));

    assert!(!temp.path().join("escaped.txt").exists());
}

#[test]
fn test_extract_entry_limit_exit_code() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = routed_zip(temp.path());

    scanpack_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(temp.path().join("out"))
        .arg("--max-entries")
        .arg("2")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--max-entries"));
}

#[test]
fn test_extract_nonexistent_archive() {
    let temp = TempDir::new().expect("failed to create temp dir");

    scanpack_cmd()
        .arg("extract")
        .arg(temp.path().join("nonexistent.zip"))
        .arg(temp.path().join("out"))
        .assert()
        .code(4)
        .stderr(predicate::str::contains("ERROR:"));
}

#[test]
fn test_invalid_size_is_usage_error() {
    scanpack_cmd()
        .arg("extract")
        .arg("a.zip")
        .arg("out")
        .arg("--max-size")
        .arg("20")
        .assert()
        .code(2);
}

#[test]
fn test_create_command() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let work = temp.path().join("work");
    fs::create_dir_all(work.join("contracts")).unwrap();
    fs::write(work.join("contracts/openapi.yaml"), "openapi: 3.0.0").unwrap();
    let config = temp.path().join("scan.json");
    fs::write(&config, WEB_SCAN_CONFIG).unwrap();
    let upload = temp.path().join("upload");

    let output = scanpack_cmd()
        .arg("--json")
        .arg("create")
        .arg(&config)
        .arg(&work)
        .arg(&upload)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["operation"], "create");
    assert_eq!(json["data"]["source_archive"]["files_added"], 1);
    assert!(json["data"]["binary_archive"].is_null());
    assert!(upload.join("sourcecode.zip").exists());
    assert!(!upload.join("binaries.tar").exists());
}

#[test]
fn test_create_missing_source_fails_and_cleans_up() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let work = temp.path().join("work");
    fs::create_dir_all(&work).unwrap();
    let config = temp.path().join("scan.json");
    fs::write(&config, WEB_SCAN_CONFIG).unwrap();
    let upload = temp.path().join("upload");

    scanpack_cmd()
        .arg("create")
        .arg(&config)
        .arg(&work)
        .arg(&upload)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Creation of archives failed"));
    assert!(!upload.join("sourcecode.zip").exists());

    scanpack_cmd()
        .arg("--quiet")
        .arg("create")
        .arg(&config)
        .arg(&work)
        .arg(&upload)
        .arg("--create-missing-files")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(upload.join("sourcecode.zip").exists());
    assert!(work.join("contracts").exists());
}

#[test]
fn test_compress_command() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let folder = temp.path().join("project");
    fs::create_dir_all(folder.join("nested")).unwrap();
    fs::write(folder.join("nested/file.txt"), "content").unwrap();
    let archive = temp.path().join("out/project.zip");

    scanpack_cmd()
        .arg("compress")
        .arg(&folder)
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive created"));

    let out = temp.path().join("extracted");
    scanpack_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(&out)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(out.join("nested/file.txt")).unwrap(), "content");
}
