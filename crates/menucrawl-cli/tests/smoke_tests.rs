//! Smoke tests for the menucrawl CLI
//!
//! These run the binary without a browser, so they only cover paths that
//! fail or exit before launch.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the menucrawl binary, isolated in `dir`
fn menucrawl(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("menucrawl").expect("menucrawl binary should exist");
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    let temp = TempDir::new().expect("create temp dir");
    menucrawl(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    let temp = TempDir::new().expect("create temp dir");
    menucrawl(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--headful"));
}

#[test]
fn test_unknown_flag_fails() {
    let temp = TempDir::new().expect("create temp dir");
    menucrawl(&temp).arg("--frobnicate").assert().failure();
}

// ============================================================================
// Configuration Failures
// ============================================================================

#[test]
fn test_missing_config_fails() {
    let temp = TempDir::new().expect("create temp dir");
    menucrawl(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Configuration error"))
        .stderr(predicate::str::contains("config.yml"));

    assert!(!temp.path().join("menu.json").exists());
    assert!(temp.path().join("scraper.log").exists());
}

#[test]
fn test_config_path_ignores_environment() {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(temp.path().join("shop.yml"), "url: https://shop.test/\n").unwrap();

    menucrawl(&temp)
        .env("MENUCRAWL_CONFIG", "shop.yml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.yml"))
        .stderr(predicate::str::contains("shop.yml").not());
}

#[test]
fn test_config_with_missing_key_fails() {
    let temp = TempDir::new().expect("create temp dir");
    fs::write(
        temp.path().join("shop.yml"),
        "url: https://shop.test/\npick_up_xpath: //button\n",
    )
    .unwrap();

    menucrawl(&temp)
        .args(["-c", "shop.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("ok_xpath"));
}

#[test]
fn test_custom_log_file_is_truncated() {
    let temp = TempDir::new().expect("create temp dir");
    let log = temp.path().join("run.log");
    fs::write(&log, "stale line from a previous run\n").unwrap();

    menucrawl(&temp)
        .args(["--log-file", "run.log", "-c", "absent.yml"])
        .assert()
        .failure();

    let contents = fs::read_to_string(&log).unwrap();
    assert!(!contents.contains("stale line"));
    assert!(!temp.path().join("scraper.log").exists());
}
