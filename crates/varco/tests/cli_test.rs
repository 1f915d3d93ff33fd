//! Integration tests for the `varco` CLI binary.
//!
//! These tests validate argument parsing, help output, and error
//! handling — all without requiring a live cloud account.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `varco` binary with env isolation.
///
/// Clears all `VARCO_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn varco_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("varco");
    cmd.env("HOME", "/tmp/varco-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/varco-cli-test-nonexistent")
        .env_remove("VARCO_PROFILE")
        .env_remove("VARCO_DEVICE")
        .env_remove("VARCO_USERNAME")
        .env_remove("VARCO_PASSWORD")
        .env_remove("VARCO_ACCESS_TOKEN")
        .env_remove("VARCO_TIMEOUT")
        .env_remove("VARCO_RETRIES")
        .env_remove("VARCO_CONFIG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = varco_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    varco_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("gate")
            .and(predicate::str::contains("open"))
            .and(predicate::str::contains("close"))
            .and(predicate::str::contains("stop"))
            .and(predicate::str::contains("auth-test"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    varco_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("varco"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = varco_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_status_without_device_fails_with_usage_error() {
    let output = varco_cmd().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected usage exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("device") || text.contains("Device"),
        "Expected error mentioning the missing device:\n{text}"
    );
}

#[test]
fn test_open_without_credentials_fails_with_usage_error() {
    let output = varco_cmd()
        .args(["--device", "Front Gate", "open"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected usage exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("credentials") || text.contains("Credentials"),
        "Expected error mentioning missing credentials:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = varco_cmd()
        .args(["--output", "invalid", "status"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse — the failure should be about missing
    // credentials, not about argument parsing.
    let output = varco_cmd()
        .args([
            "--output",
            "json",
            "--verbose",
            "--timeout",
            "20",
            "--retries",
            "5",
            "--device",
            "Front Gate",
            "status",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("credentials") || text.contains("Credentials"),
        "Expected missing-credentials error:\n{text}"
    );
}

// ── Config file loading ─────────────────────────────────────────────

#[test]
fn test_profile_supplies_the_device_name() {
    // A profile that names a device but carries no credentials: the
    // error must be about credentials, proving the file was read.
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
default_profile = "home"

[profiles.home]
device = "Front Gate"
"#,
    )
    .unwrap();

    let output = varco_cmd()
        .env("VARCO_CONFIG", &config_path)
        .arg("status")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("credentials") || text.contains("Credentials"),
        "Expected missing-credentials error (profile loaded):\n{text}"
    );
}

#[test]
fn test_watch_rejects_bad_interval() {
    let output = varco_cmd()
        .args(["watch", "--interval", "soon"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid value") || text.contains("soon"),
        "Expected clap parse error:\n{text}"
    );
}
