//! Post-job cleanup of the update process and its working directory

use std::io::ErrorKind;
use std::path::Path;

use crate::actions::{ActionState, STATE_PID, STATE_WORK_DIR};
use crate::error::{CleanupError, FileSystemError, Result};

/// Terminate `pid` if it is still running
///
/// An empty pid and a process that is already gone both count as success.
pub fn kill_process(pid: &str) -> std::result::Result<bool, CleanupError> {
    let pid = pid.trim();
    if pid.is_empty() {
        return Ok(true);
    }

    // 0 and negative values address process groups, not a single process
    let raw = pid
        .parse::<u32>()
        .ok()
        .filter(|&value| value != 0)
        .and_then(|value| i32::try_from(value).ok())
        .ok_or_else(|| CleanupError::InvalidPid {
            value: pid.to_string(),
        })?;

    signal_terminate(raw).map_err(|message| CleanupError::Signal {
        pid: pid.to_string(),
        message,
    })?;
    Ok(true)
}

#[cfg(unix)]
fn signal_terminate(pid: i32) -> std::result::Result<(), String> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => {
            log::debug!("Process {} already exited", pid);
            Ok(())
        }
        Err(errno) => Err(errno.desc().to_string()),
    }
}

#[cfg(not(unix))]
fn signal_terminate(pid: i32) -> std::result::Result<(), String> {
    let output = std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .output()
        .map_err(|e| e.to_string())?;

    if output.status.success() {
        return Ok(());
    }

    // taskkill exits 128 when no process matches the pid
    if output.status.code() == Some(128) {
        log::debug!("Process {} already exited", pid);
        return Ok(());
    }

    Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
}

/// Recursively delete `path`; an empty or missing path is a no-op
pub fn remove_directory(path: &str) -> std::result::Result<(), FileSystemError> {
    if path.trim().is_empty() {
        return Ok(());
    }

    let dir = Path::new(path);
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => {
            log::error!("Failed to remove directory {}: {}", path, source);
            Err(FileSystemError::Remove {
                path: dir.to_path_buf(),
                source,
            })
        }
    }
}

/// Kill the saved process, then delete the saved working directory
pub fn run_cleanup(state: &ActionState) -> Result<()> {
    let pid = state.get(STATE_PID);
    let work_dir = state.get(STATE_WORK_DIR);

    if !pid.is_empty() {
        kill_process(&pid)?;
    }

    if !work_dir.is_empty() {
        remove_directory(&work_dir)?;
    }

    log::info!("Cleanup completed successfully");
    Ok(())
}
