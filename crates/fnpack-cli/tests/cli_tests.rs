//! Integration tests for fnpack-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use fnpack_core::loader::list_entries;
use predicates::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

fn fnpack_cmd() -> Command {
    cargo_bin_cmd!("fnpack")
}

/// Creates `{a.txt, sub/b.txt, sub/c.log}` under a fresh temp dir.
fn function_dir() -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");
    fs::write(temp.path().join("a.txt"), "alpha").unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    fs::write(temp.path().join("sub/b.txt"), "bravo").unwrap();
    fs::write(temp.path().join("sub/c.log"), "charlie").unwrap();
    temp
}

fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut names: Vec<String> = list_entries(Cursor::new(bytes))
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    names.sort();
    names
}

fn zip_names_in(path: &Path) -> Vec<String> {
    zip_names(&fs::read(path).unwrap())
}

#[test]
fn test_version_flag() {
    fnpack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fnpack"));
}

#[test]
fn test_help_flag() {
    fnpack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("archive"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_archive_help() {
    fnpack_cmd()
        .args(["archive", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--exclude-file"));
}

#[test]
fn test_archive_writes_dest_file() {
    let src = function_dir();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("function.zip");

    fnpack_cmd()
        .current_dir(out.path())
        .arg("archive")
        .arg("--src")
        .arg(src.path())
        .arg("--dest")
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive written to"));

    assert_eq!(zip_names_in(&dest), vec!["a.txt", "sub/b.txt", "sub/c.log"]);
}

#[test]
fn test_archive_exclude_pattern() {
    let src = function_dir();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("function.zip");

    fnpack_cmd()
        .current_dir(out.path())
        .arg("archive")
        .arg("--src")
        .arg(src.path())
        .arg("--dest")
        .arg(&dest)
        .args(["-x", "*.log"])
        .assert()
        .success();

    assert_eq!(zip_names_in(&dest), vec!["a.txt", "sub/b.txt"]);
}

#[test]
fn test_archive_reads_exclude_file() {
    let src = function_dir();
    let out = TempDir::new().unwrap();
    fs::write(out.path().join(".lambdaignore"), "# ignore docs\nsub/*\n").unwrap();

    fnpack_cmd()
        .current_dir(out.path())
        .arg("archive")
        .arg("--src")
        .arg(src.path())
        .assert()
        .success();

    assert_eq!(zip_names_in(&out.path().join("function.zip")), vec!["a.txt"]);
}

#[test]
fn test_archive_to_stdout() {
    let src = function_dir();
    let out = TempDir::new().unwrap();

    let output = fnpack_cmd()
        .current_dir(out.path())
        .arg("archive")
        .arg("--src")
        .arg(src.path())
        .args(["--dest", "-", "-x", "*.log"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(zip_names(&output), vec!["a.txt", "sub/b.txt"]);
    assert!(!out.path().join("function.zip").exists());
}

#[test]
fn test_archive_json_output() {
    let src = function_dir();
    let out = TempDir::new().unwrap();

    let output = fnpack_cmd()
        .current_dir(out.path())
        .arg("--json")
        .arg("archive")
        .arg("--src")
        .arg(src.path())
        .args(["-x", "*.log"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "success");
    assert_eq!(json["operation"], "archive");
    assert_eq!(json["data"]["files_added"], 2);
    assert_eq!(json["data"]["files_excluded"], 1);
    assert_eq!(json["data"]["destination"], "function.zip");
}

#[test]
fn test_archive_quiet_mode() {
    let src = function_dir();
    let out = TempDir::new().unwrap();

    fnpack_cmd()
        .current_dir(out.path())
        .arg("--quiet")
        .arg("archive")
        .arg("--src")
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_archive_missing_source() {
    let out = TempDir::new().unwrap();

    fnpack_cmd()
        .current_dir(out.path())
        .args(["archive", "--src", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"))
        .stderr(predicate::str::contains("HINT"));

    assert!(!out.path().join("function.zip").exists());
}

#[test]
fn test_archive_single_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("app.bin"), [1u8, 2, 3]).unwrap();

    fnpack_cmd()
        .current_dir(temp.path())
        .args(["archive", "--src", "app.bin", "--dest", "out.zip"])
        .assert()
        .success();

    assert_eq!(zip_names_in(&temp.path().join("out.zip")), vec!["app.bin"]);
}

#[test]
fn test_archive_rejects_bad_compression_level() {
    fnpack_cmd()
        .args(["archive", "-l", "12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("12"));
}

#[test]
fn test_inspect_lists_entries() {
    let src = function_dir();
    let out = TempDir::new().unwrap();

    fnpack_cmd()
        .current_dir(out.path())
        .arg("archive")
        .arg("--src")
        .arg(src.path())
        .assert()
        .success();

    fnpack_cmd()
        .current_dir(out.path())
        .args(["inspect", "function.zip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sub/b.txt"))
        .stdout(predicate::str::contains("Total: 3 entries"));
}

#[test]
fn test_inspect_json_output() {
    let src = function_dir();
    let out = TempDir::new().unwrap();

    fnpack_cmd()
        .current_dir(out.path())
        .arg("archive")
        .arg("--src")
        .arg(src.path())
        .args(["-x", "sub/*"])
        .assert()
        .success();

    let output = fnpack_cmd()
        .current_dir(out.path())
        .args(["--json", "inspect", "function.zip"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["operation"], "inspect");
    let entries = json["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "a.txt");
    assert_eq!(entries[0]["size"], 5);
}

#[test]
fn test_inspect_corrupted_archive() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.zip");
    fs::write(&path, b"PK\x03\x04 truncated").unwrap();

    fnpack_cmd()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid zip archive"));
}

#[test]
fn test_inspect_corrupted_archive_json() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.zip");
    fs::write(&path, b"not a zip").unwrap();

    let output = fnpack_cmd()
        .arg("--json")
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "error");
    assert_eq!(json["operation"], "inspect");
}

#[test]
fn test_upload_builds_into_store() {
    let src = function_dir();
    let store = TempDir::new().unwrap();

    fnpack_cmd()
        .current_dir(src.path())
        .arg("upload")
        .arg("--store")
        .arg(store.path())
        .args(["--bucket", "deploy", "--key", "hello/function.zip", "-x", "*.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded deploy/hello/function.zip"));

    assert_eq!(
        zip_names_in(&store.path().join("deploy/hello/function.zip")),
        vec!["a.txt", "sub/b.txt"]
    );
}

#[test]
fn test_upload_prebuilt_versioned() {
    let src = function_dir();
    let store = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    fnpack_cmd()
        .current_dir(out.path())
        .arg("archive")
        .arg("--src")
        .arg(src.path())
        .assert()
        .success();
    let built = fs::read(out.path().join("function.zip")).unwrap();

    for expected_version in ["1", "2"] {
        let output = fnpack_cmd()
            .current_dir(out.path())
            .arg("--json")
            .arg("upload")
            .args(["--src", "function.zip", "--bucket", "b", "--key", "fn.zip"])
            .arg("--store")
            .arg(store.path())
            .arg("--versioned")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["data"]["version"], expected_version);
        assert_eq!(json["data"]["prebuilt"], true);
    }

    assert_eq!(fs::read(store.path().join("b/fn.zip")).unwrap(), built);
    assert!(store.path().join("b/fn.zip.v2").exists());
}

#[test]
fn test_completion_bash() {
    fnpack_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fnpack"));
}
