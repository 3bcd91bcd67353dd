//! Run configuration resolved from action inputs

use std::path::{Path, PathBuf};

use crate::actions::InputSource;
use crate::error::{ConfigError, FileSystemError};
use crate::package_manager::PackageManager;

pub const DEFAULT_AUTHOR_EMAIL: &str = "actions@github.com";
pub const DEFAULT_AUTHOR_NAME: &str = "GitHUB Actions";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_CHANGELOG_FILE: &str = "./CHANGELOG.md";
pub const DEFAULT_PACKAGE_FILE: &str = "./package.json";

/// Immutable settings for a single update run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub token: Option<String>,
    pub author_email: String,
    pub author_name: String,
    /// Repository in `owner/repo` form
    pub repository_ref: Option<String>,
    pub branch: String,
    /// None until the entry point falls back to a temporary directory
    pub working_directory: Option<PathBuf>,
    pub changelog_file: Option<PathBuf>,
    pub package_file: PathBuf,
    pub package_manager: PackageManager,
    pub debug: bool,
    /// Shell command lines run after the update, before pushing
    pub builds_and_checks: Vec<String>,
    pub ignore_packages: Vec<String>,
}

impl RunConfig {
    /// Resolves every setting from inputs, environment fallbacks and defaults
    pub fn resolve(inputs: &dyn InputSource) -> Result<Self, ConfigError> {
        let package_manager = inputs
            .input("package-manager")
            .unwrap_or_else(|| PackageManager::Npm.to_string())
            .parse::<PackageManager>()?;

        Ok(Self {
            token: inputs.input("token").or_else(|| inputs.env("GITHUB_TOKEN")),
            author_email: inputs
                .input("author-email")
                .unwrap_or_else(|| DEFAULT_AUTHOR_EMAIL.to_string()),
            author_name: inputs
                .input("author-name")
                .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string()),
            repository_ref: inputs
                .input("ref")
                .or_else(|| inputs.env("GITHUB_REPOSITORY")),
            branch: inputs
                .input("branch")
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            working_directory: inputs
                .input("working-directory")
                .or_else(|| inputs.env("GITHUB_WORKSPACE"))
                .map(PathBuf::from),
            changelog_file: Some(PathBuf::from(
                inputs
                    .input("changelog-file")
                    .unwrap_or_else(|| DEFAULT_CHANGELOG_FILE.to_string()),
            )),
            package_file: PathBuf::from(
                inputs
                    .input("package-file")
                    .unwrap_or_else(|| DEFAULT_PACKAGE_FILE.to_string()),
            ),
            package_manager,
            debug: inputs.input("debug").as_deref() == Some("true"),
            builds_and_checks: inputs.multiline_input("builds-and-checks"),
            ignore_packages: inputs.multiline_input("ignore-packages"),
        })
    }

    /// Returns a copy bound to the given working directory
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Bind the run to a directory that exists on disk
    ///
    /// A configured directory is created if missing; without one, a fresh
    /// `autoupdater-*` temporary directory is created and kept for the
    /// cleanup step to remove.
    pub fn ensure_working_directory(self) -> Result<Self, FileSystemError> {
        match &self.working_directory {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| FileSystemError::write(dir, e))?;
                Ok(self)
            }
            None => {
                let dir = tempfile::Builder::new()
                    .prefix("autoupdater-")
                    .tempdir()
                    .map_err(|source| FileSystemError::TempDir { source })?
                    .keep();
                log::debug!("Using temporary working directory {}", dir.display());
                Ok(self.with_working_directory(dir))
            }
        }
    }

    /// Working directory, or the current directory when none was resolved
    pub fn work_dir(&self) -> &Path {
        self.working_directory
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
    }

    pub fn package_path(&self) -> PathBuf {
        self.work_dir().join(&self.package_file)
    }

    pub fn changelog_path(&self) -> Option<PathBuf> {
        self.changelog_file
            .as_ref()
            .map(|file| self.work_dir().join(file))
    }

    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or_else(|| ConfigError::MissingValue {
            name: "token".to_string(),
        })
    }

    pub fn require_ref(&self) -> Result<&str, ConfigError> {
        self.repository_ref
            .as_deref()
            .ok_or_else(|| ConfigError::MissingValue {
                name: "ref".to_string(),
            })
    }
}
