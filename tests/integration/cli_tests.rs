//! CLI integration tests
//!
//! These tests verify that the CLI works correctly with various options.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn project_path() -> PathBuf {
    fixtures_path().join("unity_project")
}

fn cli() -> Command {
    Command::cargo_bin("searchdeadscripts").unwrap()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help_flag() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unity").and(predicate::str::contains("--retain")));
}

#[test]
fn test_version_flag() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_arguments() {
    cli().assert().failure();
}

// ============================================================================
// Project Validation Tests
// ============================================================================

#[test]
fn test_nonexistent_project_fails() {
    let out = TempDir::new().unwrap();

    cli()
        .arg("/nonexistent/path/to/project")
        .arg(out.path())
        .assert()
        .failure();

    assert!(!out.path().join("unused_scripts.txt").exists());
}

#[test]
fn test_directory_without_project_settings_fails() {
    let project = TempDir::new().unwrap();
    fs::create_dir_all(project.path().join("Assets")).unwrap();
    let out = TempDir::new().unwrap();

    cli()
        .arg(project.path())
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ProjectSettings"));
}

// ============================================================================
// Analysis Tests
// ============================================================================

#[test]
fn test_writes_report_and_dumps() {
    let out = TempDir::new().unwrap();

    cli()
        .arg(project_path())
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Legacy.cs"));

    let report = fs::read_to_string(out.path().join("unused_scripts.txt")).unwrap();
    assert!(report.contains("Script name: Legacy.cs GUID: 4d5e6f7a8b9c40d1e2f3a4b5c6d7e8f9"));
    assert!(report.contains("Script name: Weapon.cs"));
    assert!(!report.contains("Player.cs"));

    assert!(out.path().join("Main.unity.dump").exists());
    assert!(out.path().join("Menu.unity.dump").exists());
}

#[test]
fn test_creates_missing_output_directory() {
    let out = TempDir::new().unwrap();
    let nested = out.path().join("reports/latest");

    cli()
        .arg(project_path())
        .arg(&nested)
        .arg("--quiet")
        .assert()
        .success();

    assert!(nested.join("unused_scripts.txt").exists());
}

#[test]
fn test_json_format_without_dumps() {
    let out = TempDir::new().unwrap();

    cli()
        .arg(project_path())
        .arg(out.path())
        .args(["--format", "json", "--no-dump", "--quiet"])
        .assert()
        .success();

    let json = fs::read_to_string(out.path().join("unused_scripts.json")).unwrap();
    assert!(json.contains("\"unused_count\": 2"));
    assert!(!out.path().join("Main.unity.dump").exists());
}

#[test]
fn test_retain_pattern() {
    let out = TempDir::new().unwrap();

    cli()
        .arg(project_path())
        .arg(out.path())
        .args(["--retain", "Legacy*", "--quiet"])
        .assert()
        .success();

    let report = fs::read_to_string(out.path().join("unused_scripts.txt")).unwrap();
    assert!(!report.contains("Legacy.cs"));
    assert!(report.contains("Weapon.cs"));
}

#[test]
fn test_config_file() {
    let out = TempDir::new().unwrap();
    let config = out.path().join("deadscripts.toml");
    fs::write(
        &config,
        "retain_patterns = [\"Weapon*\"]\n\n[pipeline]\nscene_concurrency = 1\n\n[report]\ndump_hierarchy = false\n",
    )
    .unwrap();

    cli()
        .arg(project_path())
        .arg(out.path())
        .arg("--config")
        .arg(&config)
        .arg("--quiet")
        .assert()
        .success();

    let report = fs::read_to_string(out.path().join("unused_scripts.txt")).unwrap();
    assert_eq!(report, "Script name: Legacy.cs GUID: 4d5e6f7a8b9c40d1e2f3a4b5c6d7e8f9\n");
    assert!(!out.path().join("Main.unity.dump").exists());
}

#[test]
fn test_invalid_format_rejected() {
    let out = TempDir::new().unwrap();

    cli()
        .arg(project_path())
        .arg(out.path())
        .args(["--format", "sarif"])
        .assert()
        .failure();
}
