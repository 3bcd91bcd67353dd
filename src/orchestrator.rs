//! Update orchestrator for coordinating the entire update run
//!
//! The run is strictly sequential:
//! repository setup → manifest → install → outdated snapshot → filter →
//! update → second snapshot → diff → changelog → commit → version tag →
//! builds and checks → push.
//!
//! Any error aborts the run; nothing already done is rolled back.

use crate::changelog::ChangelogWriter;
use crate::command::CommandRunner;
use crate::config::RunConfig;
use crate::error::Result;
use crate::git::GitGateway;
use crate::manifest::PackageManifest;
use crate::package_manager::PackageManagerTool;

/// Commit message used for the dependency changes
const COMMIT_MESSAGE: &str = "dependencies";

/// Outcome of an update run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub updated: bool,
    /// Manifest version after the run
    pub version: String,
    pub updated_packages: Vec<String>,
}

impl RunResult {
    fn unchanged(version: &str) -> Self {
        Self {
            updated: false,
            version: version.to_string(),
            updated_packages: Vec::new(),
        }
    }

    /// One-line completion message for the job log
    pub fn summary(&self) -> String {
        if !self.updated {
            return "Completed.".to_string();
        }

        let verb = if self.updated_packages.len() > 1 {
            "were"
        } else {
            "was"
        };
        format!(
            "Completed ({} {} updated).",
            self.updated_packages.join(", "),
            verb
        )
    }
}

/// Update candidates split by manifest section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCandidates {
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
}

impl UpdateCandidates {
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }
}

/// Select manifest packages that are outdated and not ignored
///
/// Each section keeps manifest order.
pub fn filter_packages(
    manifest: &PackageManifest,
    outdated: &[String],
    ignore: &[String],
) -> UpdateCandidates {
    let qualifies = |name: &&str| {
        !ignore.iter().any(|p| p == name) && outdated.iter().any(|p| p == name)
    };

    UpdateCandidates {
        dependencies: manifest
            .dependency_names()
            .filter(qualifies)
            .map(str::to_string)
            .collect(),
        dev_dependencies: manifest
            .dev_dependency_names()
            .filter(qualifies)
            .map(str::to_string)
            .collect(),
    }
}

/// Packages outdated before the update that are no longer outdated after it
///
/// Keeps the order of `before`.
pub fn actually_updated(before: &[String], after: &[String]) -> Vec<String> {
    before
        .iter()
        .filter(|pkg| !after.contains(pkg))
        .cloned()
        .collect()
}

/// Orchestrator for a single update run
pub struct UpdateOrchestrator<'a> {
    config: &'a RunConfig,
    runner: &'a dyn CommandRunner,
    package_manager: &'static dyn PackageManagerTool,
}

impl<'a> UpdateOrchestrator<'a> {
    pub fn new(config: &'a RunConfig, runner: &'a dyn CommandRunner) -> Self {
        Self {
            config,
            runner,
            package_manager: config.package_manager.tool(),
        }
    }

    /// Run the update and report what changed
    pub fn run(&self) -> Result<RunResult> {
        self.run_inner().inspect_err(|e| {
            log::error!("Autoupdate failed: {}", e);
        })
    }

    fn run_inner(&self) -> Result<RunResult> {
        log::info!("Starting autoupdate process...");
        let git = GitGateway::new(self.runner, self.config);

        git.initialize_repository()?;
        git.setup_git()?;
        git.fetch_and_checkout()?;

        let manifest = self.load_manifest()?;

        self.package_manager.install_package_manager(self.runner)?;
        self.package_manager.install_dependencies(self.runner)?;

        let outdated_before = self.package_manager.outdated_packages(self.runner);
        let candidates =
            filter_packages(&manifest, &outdated_before, &self.config.ignore_packages);

        if candidates.is_empty() {
            log::info!("No packages to update");
            return Ok(RunResult::unchanged(manifest.version()));
        }

        self.package_manager.update_packages(
            self.runner,
            &candidates.dependencies,
            &candidates.dev_dependencies,
        )?;

        let outdated_after = self.package_manager.outdated_packages(self.runner);
        let updated = actually_updated(&outdated_before, &outdated_after);

        if updated.is_empty() {
            log::info!("No packages were actually updated");
            return Ok(RunResult::unchanged(manifest.version()));
        }

        let changelog_path = self.config.changelog_path();
        ChangelogWriter::new(changelog_path.as_deref())
            .update_changelog(manifest.version(), &updated)?;

        git.commit(COMMIT_MESSAGE)?;
        git.create_version_tag(self.config.package_manager)?;
        let bumped = self.load_manifest()?;

        self.run_builds_and_checks()?;
        git.push()?;

        log::info!("Successfully updated {} packages", updated.len());

        Ok(RunResult {
            updated: true,
            version: bumped.version().to_string(),
            updated_packages: updated,
        })
    }

    fn load_manifest(&self) -> Result<PackageManifest> {
        Ok(PackageManifest::load(&self.config.package_path())?)
    }

    fn run_builds_and_checks(&self) -> Result<()> {
        if self.config.builds_and_checks.is_empty() {
            return Ok(());
        }

        log::info!("Running builds and checks...");
        for command in &self.config.builds_and_checks {
            log::debug!("Running: {}", command);
            self.runner.run_line(command, false)?;
        }
        Ok(())
    }
}
