//! CLI argument parsing module for autoupdater
//!
//! Action inputs arrive through the environment; the flags here only cover
//! local runs and the post-job cleanup entry point.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dependency auto-updater for GitHub Actions
#[derive(Parser, Debug, Clone)]
#[command(name = "autoupdater", version, about = "Dependency auto-updater for GitHub Actions")]
pub struct CliArgs {
    /// Enable debug output (same as the `debug` input)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Update dependencies, changelog and version, then push (default)
    Update {
        /// Working directory, overriding the `working-directory` input
        #[arg(long, value_name = "DIR")]
        working_directory: Option<PathBuf>,
    },

    /// Kill the update process and remove its working directory
    Cleanup,
}

impl CliArgs {
    /// The selected subcommand, defaulting to `update`
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Update {
            working_directory: None,
        })
    }
}
