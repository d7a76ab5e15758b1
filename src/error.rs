//! Error types shared by the stores, the screens and the binary.

use std::path::PathBuf;
use thiserror::Error;

/// A backing file could not be read, written or understood.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} does not contain valid data: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode data for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// User input that fails a precondition. The display text is what the
/// screen shows inline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Username already exists.")]
    DuplicateUsername,

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Please enter a task.")]
    EmptyTask,

    #[error("Please enter a valid number.")]
    InvalidMinutes,

    #[error("A timer is already running.")]
    TimerRunning,
}

/// Configuration file problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Error returned by a screen action.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
