//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway data
//! directory and verify outputs.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command against `data_dir`, returning (stdout, stderr, code).
fn run_cli(data_dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "fitweek-cli", "--quiet", "--"])
        .args(args)
        .env("FITWEEK_DATA_DIR", data_dir.path())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Fitweek"));
}

#[test]
fn test_register_and_summary() {
    let dir = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(
        &dir,
        &["register", "--user", "7", "Maija", "--guild", "Engineering"],
    );
    assert_eq!(code, 0, "register failed");
    assert!(stdout.contains("Registered Maija"));

    let (stdout, _, code) = run_cli(&dir, &["summary", "--user", "7"]);
    assert_eq!(code, 0, "summary failed");
    assert!(stdout.contains("Total Points:"));

    // Registering the same identity again is a friendly no-op.
    let (stdout, _, code) = run_cli(&dir, &["register", "--user", "7", "Maija"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("already registered"));
}

#[test]
fn test_standings_start_empty() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["standings", "users"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().starts_with('['));
}

#[test]
fn test_score_session_end_to_end() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(&dir, &["register", "--user", "7", "Maija"]);
    assert_eq!(code, 0);

    // 5 exercise hours, "No" to every question, skip health, confirm.
    let mut child = Command::new("cargo")
        .args(["run", "-p", "fitweek-cli", "--quiet", "--", "score", "--user", "7"])
        .env("FITWEEK_DATA_DIR", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn score session");
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(b"5\n2\n2\n2\n2\n1\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Do you confirm this information?"));
    assert!(stdout.contains("Points saved!"));

    let (stdout, _, code) = run_cli(&dir, &["summary", "--user", "7"]);
    assert_eq!(code, 0);
    assert!(stdout.lines().any(|l| l.contains("Total Points:") && l.ends_with('5')));
}

#[test]
fn test_unregistered_score_is_rejected_politely() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["score", "--user", "404"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("register first"));
}
