//! autoupdater - dependency auto-updater library for GitHub Actions
//!
//! This library provides the pieces of a single update run:
//! - Action inputs, outputs and saved state
//! - npm, pnpm and yarn outdated reports and targeted updates
//! - Changelog entries and patch version bumps
//! - Git checkout, commit, tag and push
//! - Post-job cleanup of the process and working directory

pub mod actions;
pub mod changelog;
pub mod cleanup;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod package_manager;
pub mod testing;
