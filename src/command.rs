//! Synchronous execution of external commands
//!
//! Every git and package manager call goes through [`CommandRunner`] so the
//! orchestration can be exercised against a recording runner in tests.

use std::path::PathBuf;
use std::process::Command;

use crate::error::CommandError;

/// Trait for running external commands in the working directory
pub trait CommandRunner {
    /// Run `args[0]` with the remaining arguments and return its stdout
    ///
    /// A non-zero exit status is an error unless `ignore_exit_code` is set.
    fn run(&self, args: &[&str], ignore_exit_code: bool) -> Result<String, CommandError>;

    /// Run a command line split on whitespace, without any shell quoting
    fn run_line(&self, line: &str, ignore_exit_code: bool) -> Result<String, CommandError> {
        let args: Vec<&str> = line.split_whitespace().collect();
        self.run(&args, ignore_exit_code)
    }
}

/// Runner that spawns real processes
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    working_dir: PathBuf,
}

impl SystemCommandRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, args: &[&str], ignore_exit_code: bool) -> Result<String, CommandError> {
        let Some((program, rest)) = args.split_first() else {
            return Err(CommandError::Empty);
        };
        let command_line = args.join(" ");
        log::debug!("RUN {}", command_line);

        let output = Command::new(program)
            .args(rest)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|source| CommandError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        if !output.status.success() && !ignore_exit_code {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::debug!("FAILED {}: {}", command_line, stderr.trim_end());
            return Err(CommandError::failed(
                command_line,
                &stderr,
                output.status.code(),
            ));
        }

        log::debug!("RESULT: {}", stdout);
        Ok(stdout)
    }
}
