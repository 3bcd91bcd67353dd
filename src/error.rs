//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: invalid or missing action inputs
//! - CommandError: external commands that failed to spawn or exited non-zero
//! - OutdatedCheckError: outdated report failures (recovered by the caller)
//! - FileSystemError: manifest, changelog and working directory I/O
//! - CleanupError: post-job process termination failures

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AutoUpdaterError {
    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// External command errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// File system related errors
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// Cleanup related errors
    #[error(transparent)]
    Cleanup(#[from] CleanupError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Package manager outside the supported set
    #[error("Invalid package manager: {value}. Use one of: npm, pnpm, yarn")]
    InvalidPackageManager { value: String },

    /// Required value was neither provided as input nor via environment
    #[error("missing required value '{name}'")]
    MissingValue { name: String },
}

/// Errors related to running external commands
#[derive(Error, Debug)]
pub enum CommandError {
    /// The program could not be started
    #[error("failed to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited with a non-zero status
    #[error("{message}")]
    Failed { command: String, message: String },

    /// Nothing to run
    #[error("empty command")]
    Empty,
}

/// Errors raised while collecting the outdated package report
#[derive(Error, Debug)]
pub enum OutdatedCheckError {
    /// The outdated command itself failed
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The report could not be parsed
    #[error("failed to parse {manager} outdated report: {message}")]
    Parse { manager: String, message: String },
}

/// Errors related to file system operations
#[derive(Error, Debug)]
pub enum FileSystemError {
    /// File not found
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read a file
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a JSON file
    #[error("Failed to parse JSON file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Failed to remove a directory tree
    #[error("Failed to remove directory {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the fallback working directory
    #[error("failed to create temporary working directory: {source}")]
    TempDir {
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to the cleanup step
#[derive(Error, Debug)]
pub enum CleanupError {
    /// Persisted pid is not a number
    #[error("invalid process id '{value}'")]
    InvalidPid { value: String },

    /// Signalling the process failed for a reason other than it being gone
    #[error("failed to kill process {pid}: {message}")]
    Signal { pid: String, message: String },
}

impl CommandError {
    /// Creates a Failed error from captured stderr, falling back to the exit code
    pub fn failed(command: impl Into<String>, stderr: &str, code: Option<i32>) -> Self {
        let message = if stderr.trim().is_empty() {
            match code {
                Some(code) => format!("Command failed with exit code {}", code),
                None => "Command terminated by signal".to_string(),
            }
        } else {
            stderr.to_string()
        };

        CommandError::Failed {
            command: command.into(),
            message,
        }
    }
}

impl FileSystemError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        FileSystemError::NotFound { path: path.into() }
    }

    /// Creates a new Read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileSystemError::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Write error
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileSystemError::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FileSystemError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AutoUpdaterError>;
