//! End-to-end tests for the autoupdater binary
//!
//! These tests verify:
//! - Invalid inputs fail before any side effect
//! - The cleanup entry point honours saved state
//! - Exit codes and `::error::` reporting

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command for the compiled binary with the runner environment cleared
fn autoupdater() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_autoupdater"));
    for var in [
        "GITHUB_TOKEN",
        "GITHUB_REPOSITORY",
        "GITHUB_WORKSPACE",
        "GITHUB_OUTPUT",
        "GITHUB_STATE",
        "STATE_AutoUpdaterPID",
        "STATE_AutoUpdaterWorkDir",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

mod update_tests {
    use super::*;

    #[test]
    fn test_invalid_package_manager_fails_before_side_effects() {
        let temp_dir = create_test_dir();
        let state_file = temp_dir.path().join("state");
        let work_dir = temp_dir.path().join("work");

        autoupdater()
            .env("INPUT_PACKAGE-MANAGER", "bun")
            .env("INPUT_WORKING-DIRECTORY", &work_dir)
            .env("GITHUB_STATE", &state_file)
            .assert()
            .code(1)
            .stdout(predicate::str::contains(
                "::error::Invalid package manager: bun. Use one of: npm, pnpm, yarn",
            ));

        assert!(!state_file.exists(), "state must not be saved");
        assert!(!work_dir.exists(), "working directory must not be created");
    }

    #[test]
    fn test_missing_token_fails_after_saving_state() {
        let temp_dir = create_test_dir();
        let state_file = temp_dir.path().join("state");
        let output_file = temp_dir.path().join("output");
        let work_dir = temp_dir.path().join("work");

        autoupdater()
            .arg("update")
            .env("INPUT_WORKING-DIRECTORY", &work_dir)
            .env("INPUT_REF", "owner/repo")
            .env("GITHUB_STATE", &state_file)
            .env("GITHUB_OUTPUT", &output_file)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("::error::"));

        let state = fs::read_to_string(&state_file).unwrap();
        assert!(state.contains(&format!("AutoUpdaterWorkDir={}", work_dir.display())));
        assert!(state.contains("AutoUpdaterPID="));
        assert!(work_dir.is_dir());
        assert!(!output_file.exists(), "outputs are only set on success");
    }

    #[test]
    fn test_debug_input_enables_debug_log() {
        let temp_dir = create_test_dir();
        let work_dir = temp_dir.path().join("work");
        fs::create_dir_all(work_dir.join(".git")).unwrap();

        autoupdater()
            .env("INPUT_WORKING-DIRECTORY", &work_dir)
            .env("INPUT_DEBUG", "true")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Git repository already initialized"));

        autoupdater()
            .env("INPUT_WORKING-DIRECTORY", &work_dir)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Git repository already initialized").not());
    }
}

mod cleanup_tests {
    use super::*;

    #[test]
    fn test_cleanup_without_state_succeeds() {
        autoupdater()
            .arg("cleanup")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleanup completed successfully"));
    }

    #[test]
    fn test_cleanup_removes_saved_work_dir() {
        let temp_dir = create_test_dir();
        let work_dir = temp_dir.path().join("autoupdater-work");
        fs::create_dir_all(work_dir.join("node_modules")).unwrap();
        fs::write(work_dir.join("package.json"), "{}").unwrap();

        autoupdater()
            .arg("cleanup")
            .env("STATE_AutoUpdaterWorkDir", &work_dir)
            .assert()
            .success();

        assert!(!work_dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_cleanup_tolerates_exited_process() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id().to_string();
        child.wait().unwrap();

        autoupdater()
            .arg("cleanup")
            .env("STATE_AutoUpdaterPID", pid)
            .assert()
            .success();
    }

    #[test]
    fn test_cleanup_invalid_pid_fails() {
        let temp_dir = create_test_dir();
        let work_dir = temp_dir.path().join("work");
        fs::create_dir(&work_dir).unwrap();

        autoupdater()
            .arg("cleanup")
            .env("STATE_AutoUpdaterPID", "not-a-pid")
            .env("STATE_AutoUpdaterWorkDir", &work_dir)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("invalid process id 'not-a-pid'"));

        assert!(work_dir.exists(), "kill failure stops before deletion");
    }

    #[test]
    fn test_cleanup_rejects_process_group_pid() {
        autoupdater()
            .arg("cleanup")
            .env("STATE_AutoUpdaterPID", "-1")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("invalid process id '-1'"));
    }
}

mod cli_tests {
    use super::*;

    #[test]
    fn test_version_flag() {
        autoupdater()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_unknown_subcommand() {
        autoupdater().arg("publish").assert().failure();
    }
}
