//! Integration tests for the select-usage-groups binary
//!
//! These run the built binary and only exercise paths that need no live API.

use std::path::Path;
use std::process::{Command, Output};

fn run_cli(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_select-usage-groups"))
        .args(args)
        .current_dir(cwd)
        .env_remove("SELECT_API_TOKEN")
        .env_remove("SELECT_ORGANIZATION_ID")
        .env_remove("SELECT_BASE_URL")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute select-usage-groups")
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn test_version() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(&["--version"], temp.path());

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("select-usage-groups"));
}

#[test]
fn test_help_lists_generate() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(&["--help"], temp.path());

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("generate"));
}

#[test]
fn test_generate_help_lists_flags() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(&["generate", "--help"], temp.path());

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--token",
        "--org-id",
        "--base-url",
        "--output-dir",
        "--layout",
        "--terraform-binary",
        "--config",
        "--dry-run",
        "SELECT_API_TOKEN",
    ] {
        assert!(stdout.contains(flag), "missing {}", flag);
    }
}

#[test]
fn test_generate_requires_token() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(&["generate", "--org-id", "org-1"], temp.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(combined(&output).contains("API token is required"));
    assert!(!temp.path().join("select_usage_groups").exists());
}

#[test]
fn test_top_level_help_lists_generate_flags() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(&["--help"], temp.path());

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--token", "--org-id", "--layout", "--dry-run"] {
        assert!(stdout.contains(flag), "missing {}", flag);
    }
}

#[test]
fn test_generate_runs_without_subcommand() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(
        &["-t", "secret", "-o", "org-1", "--base-url", "http://127.0.0.1:9"],
        temp.path(),
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(combined(&output).contains("API Error: "));
}

#[test]
fn test_top_level_flags_conflict_with_subcommand() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(&["-t", "secret", "generate", "-o", "org-1"], temp.path());

    assert!(!output.status.success());
    assert!(!temp.path().join("select_usage_groups").exists());
}

#[test]
fn test_generate_rejects_unknown_layout() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(
        &["generate", "-t", "secret", "-o", "org-1", "--layout", "nested"],
        temp.path(),
    );

    assert!(!output.status.success());
    assert!(combined(&output).contains("nested"));
}

#[test]
fn test_generate_without_organization_fails() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(&["generate", "-t", "secret"], temp.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(combined(&output).contains("Error: "));
    assert!(!temp.path().join("select_usage_groups").exists());
}

#[test]
fn test_generate_invalid_base_url_fails() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(
        &["generate", "-t", "secret", "-o", "org-1", "--base-url", "not a url"],
        temp.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(combined(&output).contains("Invalid base URL"));
}

#[test]
fn test_generate_unreachable_api_is_transport_error() {
    let temp = tempfile::tempdir().unwrap();
    let output = run_cli(
        &[
            "generate",
            "-t",
            "secret",
            "-o",
            "org-1",
            "--base-url",
            "http://127.0.0.1:9",
        ],
        temp.path(),
    );

    assert_eq!(output.status.code(), Some(2));
    let text = combined(&output);
    assert!(text.contains("API Error: "));
    assert!(!text.contains("secret"));
    assert!(!temp.path().join("select_usage_groups").exists());
}
