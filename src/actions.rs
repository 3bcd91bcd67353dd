//! GitHub Actions runtime plumbing
//!
//! The runner hands inputs to the process as `INPUT_<NAME>` environment
//! variables and collects outputs and saved state through the files named by
//! `GITHUB_OUTPUT` and `GITHUB_STATE`. Saved state comes back to the post
//! step as `STATE_<name>` variables.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::FileSystemError;

/// State key holding the pid of the update process
pub const STATE_PID: &str = "AutoUpdaterPID";

/// State key holding the working directory of the update process
pub const STATE_WORK_DIR: &str = "AutoUpdaterWorkDir";

/// Source of action inputs
pub trait InputSource {
    /// Returns a single trimmed input, or None if it is unset or empty
    fn input(&self, name: &str) -> Option<String>;

    /// Returns a multi-line input split into non-empty trimmed lines
    fn multiline_input(&self, name: &str) -> Vec<String> {
        self.input(name)
            .map(|value| split_lines(&value))
            .unwrap_or_default()
    }

    /// Returns a plain environment variable, or None if it is unset or empty
    fn env(&self, name: &str) -> Option<String>;
}

/// Inputs read from the process environment
#[derive(Debug, Default)]
pub struct EnvInputs {
    overrides: HashMap<String, String>,
}

impl EnvInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input values that take precedence over the environment (CLI flags)
    pub fn with_override(mut self, name: &str, value: impl Into<String>) -> Self {
        self.overrides.insert(name.to_string(), value.into());
        self
    }
}

impl InputSource for EnvInputs {
    fn input(&self, name: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(name) {
            return non_empty(value);
        }
        std::env::var(input_env_name(name))
            .ok()
            .and_then(|value| non_empty(&value))
    }

    fn env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().and_then(|value| non_empty(&value))
    }
}

/// In-memory inputs, used by tests and embedders
#[derive(Debug, Default, Clone)]
pub struct StaticInputs {
    inputs: HashMap<String, String>,
    env: HashMap<String, String>,
}

impl StaticInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, name: &str, value: impl Into<String>) -> Self {
        self.inputs.insert(name.to_string(), value.into());
        self
    }

    pub fn with_env(mut self, name: &str, value: impl Into<String>) -> Self {
        self.env.insert(name.to_string(), value.into());
        self
    }
}

impl InputSource for StaticInputs {
    fn input(&self, name: &str) -> Option<String> {
        self.inputs.get(name).and_then(|value| non_empty(value))
    }

    fn env(&self, name: &str) -> Option<String> {
        self.env.get(name).and_then(|value| non_empty(value))
    }
}

/// Name of the environment variable the runner uses for an input
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn split_lines(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Appends `name=value` to a runner command file
fn append_key_value(path: &Path, name: &str, value: &str) -> Result<(), FileSystemError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| FileSystemError::write(path, e))?;
    writeln!(file, "{}={}", name, value).map_err(|e| FileSystemError::write(path, e))
}

/// Step outputs written to `$GITHUB_OUTPUT`
#[derive(Debug, Clone)]
pub struct ActionOutputs {
    path: Option<PathBuf>,
}

impl ActionOutputs {
    pub fn from_env() -> Self {
        Self::new(std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from))
    }

    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn set(&self, name: &str, value: &str) -> Result<(), FileSystemError> {
        match &self.path {
            Some(path) => append_key_value(path, name, value),
            None => {
                log::debug!("GITHUB_OUTPUT not set, skipping output {}={}", name, value);
                Ok(())
            }
        }
    }
}

/// State saved by the main step and restored in the post step
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    path: Option<PathBuf>,
    restored: HashMap<String, String>,
}

impl ActionState {
    /// Reads the state file path and any `STATE_*` values from the environment
    pub fn from_env() -> Self {
        let restored = std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix("STATE_")
                    .map(|name| (name.to_string(), value))
            })
            .collect();

        Self {
            path: std::env::var_os("GITHUB_STATE").map(PathBuf::from),
            restored,
        }
    }

    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            restored: HashMap::new(),
        }
    }

    pub fn with_restored(mut self, name: &str, value: impl Into<String>) -> Self {
        self.restored.insert(name.to_string(), value.into());
        self
    }

    pub fn save(&self, name: &str, value: &str) -> Result<(), FileSystemError> {
        match &self.path {
            Some(path) => append_key_value(path, name, value),
            None => {
                log::debug!("GITHUB_STATE not set, skipping state {}={}", name, value);
                Ok(())
            }
        }
    }

    /// Returns a restored value, empty if it was never saved
    pub fn get(&self, name: &str) -> String {
        self.restored.get(name).cloned().unwrap_or_default()
    }
}

/// Formats an `::error::` workflow command, escaping as the runner expects
pub fn error_command(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{}", escaped)
}

/// Reports a failed step; the caller is responsible for the exit code
pub fn set_failed(message: &str) {
    println!("{}", error_command(message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_input_env_name() {
        assert_eq!(input_env_name("package-manager"), "INPUT_PACKAGE-MANAGER");
        assert_eq!(input_env_name("my input"), "INPUT_MY_INPUT");
    }

    #[test]
    fn test_static_inputs_empty_is_absent() {
        let inputs = StaticInputs::new().with_input("branch", "   ");
        assert_eq!(inputs.input("branch"), None);
    }

    #[test]
    fn test_multiline_input() {
        let inputs = StaticInputs::new().with_input("ignore-packages", "lodash\n\n  react \r\n");
        assert_eq!(
            inputs.multiline_input("ignore-packages"),
            vec!["lodash".to_string(), "react".to_string()]
        );
        assert!(inputs.multiline_input("builds-and-checks").is_empty());
    }

    #[test]
    fn test_env_inputs_override() {
        let inputs = EnvInputs::new().with_override("debug", "true");
        assert_eq!(inputs.input("debug"), Some("true".to_string()));
    }

    #[test]
    fn test_outputs_append_to_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("output");
        let outputs = ActionOutputs::new(Some(path.clone()));

        outputs.set("version", "1.0.1").unwrap();
        outputs.set("updated", "true").unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "version=1.0.1\nupdated=true\n");
    }

    #[test]
    fn test_outputs_without_file() {
        let outputs = ActionOutputs::new(None);
        assert!(outputs.set("dir", "/tmp").is_ok());
    }

    #[test]
    fn test_state_save_and_restore() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state");
        let state = ActionState::new(Some(path.clone()));

        state.save(STATE_PID, "4242").unwrap();
        state.save(STATE_WORK_DIR, "/tmp/autoupdater-x").unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(
            content,
            "AutoUpdaterPID=4242\nAutoUpdaterWorkDir=/tmp/autoupdater-x\n"
        );

        let restored = ActionState::new(None).with_restored(STATE_PID, "4242");
        assert_eq!(restored.get(STATE_PID), "4242");
        assert_eq!(restored.get(STATE_WORK_DIR), "");
    }

    #[test]
    fn test_error_command_escapes_newlines() {
        assert_eq!(
            error_command("line one\nline two 100%"),
            "::error::line one%0Aline two 100%25"
        );
    }
}
