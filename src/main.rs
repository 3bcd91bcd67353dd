//! autoupdater - dependency auto-updater for GitHub Actions
//!
//! `autoupdater` (or `autoupdater update`) runs the main step;
//! `autoupdater cleanup` runs as the post step.

use autoupdater::actions::{
    self, ActionOutputs, ActionState, EnvInputs, STATE_PID, STATE_WORK_DIR,
};
use autoupdater::cleanup::run_cleanup;
use autoupdater::cli::{CliArgs, Commands};
use autoupdater::command::SystemCommandRunner;
use autoupdater::config::RunConfig;
use autoupdater::logging;
use autoupdater::orchestrator::UpdateOrchestrator;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let result = match args.command() {
        Commands::Update { working_directory } => update(args.debug, working_directory),
        Commands::Cleanup => cleanup(args.debug),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            actions::set_failed(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Main step: resolve inputs, run the update and publish outputs
fn update(debug: bool, working_directory: Option<PathBuf>) -> anyhow::Result<()> {
    let mut inputs = EnvInputs::new();
    if debug {
        inputs = inputs.with_override("debug", "true");
    }
    if let Some(dir) = working_directory {
        inputs = inputs.with_override("working-directory", dir.to_string_lossy());
    }

    let config = RunConfig::resolve(&inputs)?;
    logging::init(config.debug);

    let config = config.ensure_working_directory()?;
    let work_dir = config.work_dir().to_path_buf();

    let state = ActionState::from_env();
    state.save(STATE_WORK_DIR, &work_dir.to_string_lossy())?;
    state.save(STATE_PID, &std::process::id().to_string())?;

    let runner = SystemCommandRunner::new(&work_dir);
    let result = UpdateOrchestrator::new(&config, &runner).run()?;

    let outputs = ActionOutputs::from_env();
    outputs.set("version", &result.version)?;
    outputs.set("updated", &result.updated.to_string())?;
    outputs.set("dir", &work_dir.to_string_lossy())?;

    let summary = result.summary();
    if result.updated {
        log::info!("{}", summary.green());
    } else {
        log::info!("{}", summary);
    }

    Ok(())
}

/// Post step: stop the update process and delete its working directory
fn cleanup(debug: bool) -> anyhow::Result<()> {
    logging::init(debug);
    run_cleanup(&ActionState::from_env())?;
    Ok(())
}
