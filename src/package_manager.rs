//! Package manager integration for npm, pnpm and yarn
//!
//! This module provides:
//! - The supported package manager selection
//! - Installation of the package manager itself and of locked dependencies
//! - Outdated reports normalized into plain package name lists
//! - Targeted `@latest` updates per dependency section

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::command::CommandRunner;
use crate::error::{CommandError, ConfigError, OutdatedCheckError};

/// Supported Node.js package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    /// Returns the executable name for this package manager
    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Returns all supported package managers
    pub fn all() -> &'static [PackageManager] {
        &[PackageManager::Npm, PackageManager::Pnpm, PackageManager::Yarn]
    }

    /// Returns the implementation for this package manager
    pub fn tool(&self) -> &'static dyn PackageManagerTool {
        match self {
            PackageManager::Npm => &Npm,
            PackageManager::Pnpm => &Pnpm,
            PackageManager::Yarn => &Yarn,
        }
    }

    /// Command that bumps the patch version, commits and tags
    pub fn version_patch_command(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Npm => &["npm", "version", "patch"],
            PackageManager::Pnpm => &["pnpm", "version", "patch"],
            PackageManager::Yarn => &["yarn", "version", "--new-version", "patch"],
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PackageManager {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageManager::all()
            .iter()
            .copied()
            .find(|pm| pm.name() == s)
            .ok_or_else(|| ConfigError::InvalidPackageManager {
                value: s.to_string(),
            })
    }
}

/// Operations every supported package manager provides
pub trait PackageManagerTool {
    fn manager(&self) -> PackageManager;

    /// Install the package manager globally if it does not ship with Node.js
    fn install_package_manager(&self, runner: &dyn CommandRunner) -> Result<(), CommandError>;

    /// Install locked dependencies, tolerating a failing exit code
    fn install_dependencies(&self, runner: &dyn CommandRunner) -> Result<(), CommandError>;

    /// Names of outdated packages, or the reason the report failed
    fn try_outdated_packages(
        &self,
        runner: &dyn CommandRunner,
    ) -> Result<Vec<String>, OutdatedCheckError>;

    /// Install the given packages at their `latest` tag
    fn update_packages(
        &self,
        runner: &dyn CommandRunner,
        dependencies: &[String],
        dev_dependencies: &[String],
    ) -> Result<(), CommandError>;

    /// Names of outdated packages; a failed report counts as none outdated
    fn outdated_packages(&self, runner: &dyn CommandRunner) -> Vec<String> {
        match self.try_outdated_packages(runner) {
            Ok(packages) => packages,
            Err(e) => {
                log::warn!("Error getting outdated packages: {}", e);
                Vec::new()
            }
        }
    }
}

/// npm, bundled with Node.js
#[derive(Debug, Default)]
pub struct Npm;

/// pnpm, installed globally through npm
#[derive(Debug, Default)]
pub struct Pnpm;

/// yarn classic, installed globally through npm
#[derive(Debug, Default)]
pub struct Yarn;

impl PackageManagerTool for Npm {
    fn manager(&self) -> PackageManager {
        PackageManager::Npm
    }

    fn install_package_manager(&self, _runner: &dyn CommandRunner) -> Result<(), CommandError> {
        Ok(())
    }

    fn install_dependencies(&self, runner: &dyn CommandRunner) -> Result<(), CommandError> {
        runner.run(&["npm", "ci"], true).map(drop)
    }

    fn try_outdated_packages(
        &self,
        runner: &dyn CommandRunner,
    ) -> Result<Vec<String>, OutdatedCheckError> {
        let output = runner.run(&["npm", "outdated", "--json"], true)?;
        parse_outdated_object(self.manager(), &output)
    }

    fn update_packages(
        &self,
        runner: &dyn CommandRunner,
        dependencies: &[String],
        dev_dependencies: &[String],
    ) -> Result<(), CommandError> {
        install_latest(runner, &["npm", "install"], dependencies, &["--save"])?;
        install_latest(runner, &["npm", "install"], dev_dependencies, &["--save-dev"])
    }
}

impl PackageManagerTool for Pnpm {
    fn manager(&self) -> PackageManager {
        PackageManager::Pnpm
    }

    fn install_package_manager(&self, runner: &dyn CommandRunner) -> Result<(), CommandError> {
        runner.run(&["npm", "install", "pnpm", "-g"], false).map(drop)
    }

    fn install_dependencies(&self, runner: &dyn CommandRunner) -> Result<(), CommandError> {
        runner
            .run(&["pnpm", "install", "--frozen-lockfile"], true)
            .map(drop)
    }

    fn try_outdated_packages(
        &self,
        runner: &dyn CommandRunner,
    ) -> Result<Vec<String>, OutdatedCheckError> {
        let output = runner.run(&["pnpm", "outdated", "--format", "json"], true)?;
        parse_outdated_object(self.manager(), &output)
    }

    fn update_packages(
        &self,
        runner: &dyn CommandRunner,
        dependencies: &[String],
        dev_dependencies: &[String],
    ) -> Result<(), CommandError> {
        install_latest(runner, &["pnpm", "install"], dependencies, &[])?;
        install_latest(runner, &["pnpm", "install"], dev_dependencies, &["--dev"])
    }
}

impl PackageManagerTool for Yarn {
    fn manager(&self) -> PackageManager {
        PackageManager::Yarn
    }

    fn install_package_manager(&self, runner: &dyn CommandRunner) -> Result<(), CommandError> {
        runner.run(&["npm", "install", "yarn", "-g"], false).map(drop)
    }

    fn install_dependencies(&self, runner: &dyn CommandRunner) -> Result<(), CommandError> {
        runner
            .run(&["yarn", "install", "--frozen-lockfile"], true)
            .map(drop)
    }

    fn try_outdated_packages(
        &self,
        runner: &dyn CommandRunner,
    ) -> Result<Vec<String>, OutdatedCheckError> {
        let output = runner.run(&["yarn", "outdated", "--json"], true)?;
        Ok(parse_yarn_outdated(&output))
    }

    fn update_packages(
        &self,
        runner: &dyn CommandRunner,
        dependencies: &[String],
        dev_dependencies: &[String],
    ) -> Result<(), CommandError> {
        install_latest(runner, &["yarn", "add"], dependencies, &[])?;
        install_latest(runner, &["yarn", "add"], dev_dependencies, &["--dev"])
    }
}

/// Issue one install command for all packages, or nothing if there are none
fn install_latest(
    runner: &dyn CommandRunner,
    prefix: &[&str],
    packages: &[String],
    suffix: &[&str],
) -> Result<(), CommandError> {
    if packages.is_empty() {
        return Ok(());
    }

    let pinned: Vec<String> = packages.iter().map(|pkg| format!("{}@latest", pkg)).collect();
    let mut args: Vec<&str> = prefix.to_vec();
    args.extend(pinned.iter().map(String::as_str));
    args.extend_from_slice(suffix);

    runner.run(&args, false).map(drop)
}

/// Parse an `npm outdated --json` / `pnpm outdated --format json` report
///
/// Both print an object keyed by package name; nothing outdated may print
/// an empty string instead of `{}`.
pub fn parse_outdated_object(
    manager: PackageManager,
    output: &str,
) -> Result<Vec<String>, OutdatedCheckError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let parse_error = |message: String| OutdatedCheckError::Parse {
        manager: manager.to_string(),
        message,
    };

    let report: Value = serde_json::from_str(trimmed).map_err(|e| parse_error(e.to_string()))?;
    let object = report
        .as_object()
        .ok_or_else(|| parse_error("expected a JSON object".to_string()))?;

    Ok(object.keys().cloned().collect())
}

/// Parse the NDJSON stream printed by `yarn outdated --json`
///
/// Only `table` records carry packages; the name is the first cell of each
/// body row. Lines that are not JSON are skipped.
pub fn parse_yarn_outdated(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(|record| record.get("type").and_then(Value::as_str) == Some("table"))
        .flat_map(|record| {
            record
                .pointer("/data/body")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
        })
        .filter_map(|row| row.get(0).and_then(Value::as_str).map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_str() {
        assert_eq!("npm".parse::<PackageManager>().unwrap(), PackageManager::Npm);
        assert_eq!("pnpm".parse::<PackageManager>().unwrap(), PackageManager::Pnpm);
        assert_eq!("yarn".parse::<PackageManager>().unwrap(), PackageManager::Yarn);
        assert!("bun".parse::<PackageManager>().is_err());
        assert!("NPM".parse::<PackageManager>().is_err());
    }

    #[test]
    fn test_tool_matches_manager() {
        for pm in PackageManager::all() {
            assert_eq!(pm.tool().manager(), *pm);
        }
    }

    #[test]
    fn test_version_patch_command() {
        assert_eq!(
            PackageManager::Npm.version_patch_command(),
            &["npm", "version", "patch"]
        );
        assert_eq!(
            PackageManager::Pnpm.version_patch_command(),
            &["pnpm", "version", "patch"]
        );
        assert_eq!(
            PackageManager::Yarn.version_patch_command(),
            &["yarn", "version", "--new-version", "patch"]
        );
    }

    #[test]
    fn test_install_package_manager_npm_is_noop() {
        let runner = RecordingRunner::new();
        Npm.install_package_manager(&runner).unwrap();
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_install_package_manager_pnpm() {
        let runner = RecordingRunner::new();
        Pnpm.install_package_manager(&runner).unwrap();
        assert_eq!(runner.calls(), vec!["npm install pnpm -g"]);
    }

    #[test]
    fn test_install_package_manager_yarn() {
        let runner = RecordingRunner::new();
        Yarn.install_package_manager(&runner).unwrap();
        assert_eq!(runner.calls(), vec!["npm install yarn -g"]);
    }

    #[test]
    fn test_install_dependencies_tolerates_failure() {
        let runner = RecordingRunner::new()
            .fail("npm ci", "lockfile out of sync")
            .fail("pnpm install --frozen-lockfile", "lockfile out of sync")
            .fail("yarn install --frozen-lockfile", "lockfile out of sync");

        Npm.install_dependencies(&runner).unwrap();
        Pnpm.install_dependencies(&runner).unwrap();
        Yarn.install_dependencies(&runner).unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                "npm ci",
                "pnpm install --frozen-lockfile",
                "yarn install --frozen-lockfile"
            ]
        );
    }

    #[test]
    fn test_update_packages_empty_issues_nothing() {
        for pm in PackageManager::all() {
            let runner = RecordingRunner::new();
            pm.tool().update_packages(&runner, &[], &[]).unwrap();
            assert!(runner.calls().is_empty(), "{} issued commands", pm);
        }
    }

    #[test]
    fn test_update_packages_npm() {
        let runner = RecordingRunner::new();
        Npm.update_packages(&runner, &names(&["x"]), &[]).unwrap();
        assert_eq!(runner.calls(), vec!["npm install x@latest --save"]);

        let runner = RecordingRunner::new();
        Npm.update_packages(&runner, &names(&["a", "b"]), &names(&["jest"]))
            .unwrap();
        assert_eq!(
            runner.calls(),
            vec![
                "npm install a@latest b@latest --save",
                "npm install jest@latest --save-dev"
            ]
        );
    }

    #[test]
    fn test_update_packages_pnpm() {
        let runner = RecordingRunner::new();
        Pnpm.update_packages(&runner, &names(&["x"]), &names(&["@types/node"]))
            .unwrap();
        assert_eq!(
            runner.calls(),
            vec!["pnpm install x@latest", "pnpm install @types/node@latest --dev"]
        );
    }

    #[test]
    fn test_update_packages_yarn() {
        let runner = RecordingRunner::new();
        Yarn.update_packages(&runner, &[], &names(&["eslint"])).unwrap();
        assert_eq!(runner.calls(), vec!["yarn add eslint@latest --dev"]);
    }

    #[test]
    fn test_update_packages_failure_propagates() {
        let runner = RecordingRunner::new().fail("npm install x@latest --save", "E404");
        let err = Npm.update_packages(&runner, &names(&["x"]), &names(&["y"]));
        assert!(err.is_err());
        assert_eq!(runner.calls(), vec!["npm install x@latest --save"]);
    }

    #[test]
    fn test_npm_outdated() {
        let report = r#"{
  "lodash": {"current": "4.17.20", "wanted": "4.17.21", "latest": "4.17.21"},
  "express": {"current": "4.17.0", "wanted": "4.18.2", "latest": "4.18.2"}
}"#;
        let runner = RecordingRunner::new().reply("npm outdated --json", report);
        assert_eq!(
            Npm.outdated_packages(&runner),
            names(&["lodash", "express"])
        );
    }

    #[test]
    fn test_pnpm_outdated_empty_output() {
        let runner = RecordingRunner::new().reply("pnpm outdated --format json", "");
        assert!(Pnpm.try_outdated_packages(&runner).unwrap().is_empty());
    }

    #[test]
    fn test_outdated_parse_failure_is_distinguishable() {
        let runner = RecordingRunner::new().reply("npm outdated --json", "npm ERR! oops");
        let result = Npm.try_outdated_packages(&runner);
        assert!(matches!(result, Err(OutdatedCheckError::Parse { .. })));

        let runner = RecordingRunner::new().reply("npm outdated --json", "npm ERR! oops");
        assert!(Npm.outdated_packages(&runner).is_empty());
    }

    #[test]
    fn test_outdated_non_object_is_error() {
        let result = parse_outdated_object(PackageManager::Pnpm, "[1, 2]");
        assert!(result.is_err());
    }

    #[test]
    fn test_yarn_outdated() {
        let output = concat!(
            r#"{"type":"info","data":"Color legend: ..."}"#,
            "\n",
            r#"{"type":"table","data":{"head":["Package","Current","Wanted","Latest","Package Type","URL"],"body":[["react","17.0.0","17.0.2","18.2.0","dependencies","https://react.dev"],["jest","28.0.0","28.1.3","29.7.0","devDependencies","https://jestjs.io"]]}}"#,
            "\n",
            "not json at all\n",
            "\n"
        );
        let runner = RecordingRunner::new().reply("yarn outdated --json", output);
        assert_eq!(Yarn.outdated_packages(&runner), names(&["react", "jest"]));
    }

    #[test]
    fn test_yarn_outdated_without_table() {
        assert!(parse_yarn_outdated(r#"{"type":"info","data":"nothing"}"#).is_empty());
        assert!(parse_yarn_outdated("").is_empty());
    }
}
