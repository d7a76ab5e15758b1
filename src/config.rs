//! Application configuration.
//!
//! Every field has a default, so a missing or partial TOML file is fine.
//! Command line flags are applied on top by `main`.

use clap::ValueEnum;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::ConfigError;

/// What loading a store does when its file exists but cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CorruptFilePolicy {
    /// Report a storage error and refuse the action.
    #[default]
    Fail,
    /// Log a warning and continue with an empty collection.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,
    #[serde(default = "default_schedule_file")]
    pub schedule_file: String,
    #[serde(default)]
    pub corrupt_files: CorruptFilePolicy,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_users_file() -> String {
    "users.json".into()
}
fn default_tasks_file() -> String {
    "tasks.json".into()
}
fn default_schedule_file() -> String {
    "schedule.json".into()
}
fn default_log_file() -> String {
    "student-todo.log".into()
}
fn default_log_filter() -> String {
    "student_todo=info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            users_file: default_users_file(),
            tasks_file: default_tasks_file(),
            schedule_file: default_schedule_file(),
            corrupt_files: CorruptFilePolicy::default(),
            log_file: default_log_file(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join(&self.tasks_file)
    }

    pub fn schedule_path(&self) -> PathBuf {
        self.data_dir.join(&self.schedule_file)
    }
}
