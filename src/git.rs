//! Git operations for checking out the target branch and publishing updates

use crate::command::CommandRunner;
use crate::config::RunConfig;
use crate::error::Result;
use crate::package_manager::PackageManager;

/// Name of the remote the job pushes to
pub const REMOTE: &str = "autoupdater";

/// GitGateway runs git through the configured command runner
pub struct GitGateway<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a RunConfig,
}

impl<'a> GitGateway<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a RunConfig) -> Self {
        Self { runner, config }
    }

    /// Run `git init` unless the working directory already has a `.git` entry
    pub fn initialize_repository(&self) -> Result<()> {
        if self.config.work_dir().join(".git").exists() {
            log::debug!("Git repository already initialized");
            return Ok(());
        }
        self.git(&["init"])
    }

    /// Add the authenticated remote and set the commit identity
    pub fn setup_git(&self) -> Result<()> {
        let url = remote_url(self.config.require_token()?, self.config.require_ref()?);

        self.git(&["remote", "add", REMOTE, &url])?;
        self.git(&[
            "config",
            "--global",
            "user.email",
            &self.config.author_email,
        ])?;
        self.git(&["config", "--global", "user.name", &self.config.author_name])
    }

    pub fn fetch_and_checkout(&self) -> Result<()> {
        self.git(&["fetch", REMOTE])?;
        self.git(&["checkout", &self.config.branch])
    }

    /// Stage everything and commit
    pub fn commit(&self, message: &str) -> Result<()> {
        self.git(&["add", "--all"])?;
        self.git(&["commit", "-m", message])
    }

    /// Let the package manager bump the patch version, commit and tag
    pub fn create_version_tag(&self, package_manager: PackageManager) -> Result<()> {
        self.runner
            .run(package_manager.version_patch_command(), false)?;
        Ok(())
    }

    /// Push the branch, then all tags
    pub fn push(&self) -> Result<()> {
        self.git(&["push", REMOTE, &self.config.branch])?;
        self.git(&["push", REMOTE, "--tags"])
    }

    fn git(&self, args: &[&str]) -> Result<()> {
        let mut command = Vec::with_capacity(args.len() + 1);
        command.push("git");
        command.extend_from_slice(args);
        self.runner.run(&command, false)?;
        Ok(())
    }
}

/// HTTPS remote with the token embedded as oauth2 credentials
pub fn remote_url(token: &str, repository_ref: &str) -> String {
    format!("https://oauth2:{}@github.com/{}.git", token, repository_ref)
}
