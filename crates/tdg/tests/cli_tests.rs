//! Integration tests for the tdg binary.
//!
//! Only commands that do not reach the network are exercised here; the
//! engine behind `graph`, `link` and `unlink` is covered by the fake-backed
//! tests in `sync_scenarios.rs`.

use rstest::{fixture, rstest};
use tempfile::TempDir;

mod common;
use common::run_tdg_in_dir;

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Provides a temporary directory with an initialized tdg workspace
#[fixture]
fn initialized_dir() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let output = run_tdg_in_dir(temp.path(), &["init", "--quiet"]);
    assert!(
        output.status.success(),
        "Failed to initialize tdg: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    temp
}

// ============================================================================
// Help and Version
// ============================================================================

#[rstest]
fn test_cli_help(temp_dir: TempDir) {
    let output = run_tdg_in_dir(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    for command in ["init", "boards", "select", "graph", "link", "unlink"] {
        assert!(stdout.contains(command), "help should mention {command}");
    }
}

#[rstest]
fn test_cli_version(temp_dir: TempDir) {
    let output = run_tdg_in_dir(temp_dir.path(), &["--version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("tdg"));
}

// ============================================================================
// Init
// ============================================================================

#[rstest]
fn test_init_creates_config_and_gitignore(temp_dir: TempDir) {
    let output = run_tdg_in_dir(
        temp_dir.path(),
        &["init", "--key", "k", "--token", "t", "--single-flight", "--quiet"],
    );
    assert!(output.status.success());

    let tdg_dir = temp_dir.path().join(".tdg");
    let config = std::fs::read_to_string(tdg_dir.join("config.yaml")).unwrap();
    assert!(config.contains("base-url: https://api.trello.com/1"));
    assert!(config.contains("token: t"));
    assert!(config.contains("single-flight-checklists: true"));

    let gitignore = std::fs::read_to_string(tdg_dir.join(".gitignore")).unwrap();
    assert!(gitignore.lines().any(|line| line == "config.yaml"));
}

#[rstest]
fn test_init_twice_fails(initialized_dir: TempDir) {
    let output = run_tdg_in_dir(initialized_dir.path(), &["init"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already initialized"));
}

// ============================================================================
// Workspace and Credential Errors
// ============================================================================

#[rstest]
#[case::boards(&["boards"])]
#[case::graph(&["graph"])]
#[case::link(&["link", "1", "2"])]
fn test_commands_require_workspace(temp_dir: TempDir, #[case] args: &[&str]) {
    let output = run_tdg_in_dir(temp_dir.path(), args);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("tdg init"));
}

#[rstest]
fn test_missing_credentials_are_reported(initialized_dir: TempDir) {
    let output = run_tdg_in_dir(initialized_dir.path(), &["boards"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("credentials"));
}

#[rstest]
fn test_workspace_is_found_from_subdirectory(initialized_dir: TempDir) {
    let nested = initialized_dir.path().join("docs").join("notes");
    std::fs::create_dir_all(&nested).unwrap();

    let output = run_tdg_in_dir(&nested, &["graph"]);

    // Found the workspace, then stopped at the missing credentials.
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(!stderr.contains("tdg init"));
    assert!(stderr.contains("credentials"));
}

#[rstest]
fn test_link_rejects_non_numeric_ticket(initialized_dir: TempDir) {
    let output = run_tdg_in_dir(initialized_dir.path(), &["link", "abc", "2"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not a ticket number"));
}
