//! File-backed full-snapshot stores.
//!
//! Each store owns one JSON file. `load_all` reads the whole collection,
//! `save_all` rewrites the whole file. A missing file is an empty collection.
//! Writes are not atomic: a second process editing the same file between a
//! load and a save loses its changes.

use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::BTreeMap,
    fs, io,
    marker::PhantomData,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{
    config::{Config, CorruptFilePolicy},
    error::StorageError,
    task::Task,
};

/// username -> password, kept sorted so saves are byte-stable.
pub type Credentials = BTreeMap<String, String>;

pub type CredentialStore = JsonStore<Credentials>;
pub type TaskStore = JsonStore<Vec<Task>>;
pub type ScheduleStore = JsonStore<Vec<String>>;

#[derive(Debug)]
pub struct JsonStore<T> {
    path: PathBuf,
    on_corrupt: CorruptFilePolicy,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonStore<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            on_corrupt: self.on_corrupt,
            _marker: PhantomData,
        }
    }
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>, on_corrupt: CorruptFilePolicy) -> Self {
        Self {
            path: path.into(),
            on_corrupt,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_all(&self) -> Result<T, StorageError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no backing file yet");
                return Ok(T::default());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str(&data) {
            Ok(value) => {
                debug!(path = %self.path.display(), "loaded");
                Ok(value)
            }
            Err(source) => match self.on_corrupt {
                CorruptFilePolicy::Fail => Err(StorageError::Malformed {
                    path: self.path.clone(),
                    source,
                }),
                CorruptFilePolicy::Empty => {
                    warn!(
                        path = %self.path.display(),
                        error = %source,
                        "backing file is malformed, starting from an empty collection"
                    );
                    Ok(T::default())
                }
            },
        }
    }

    pub fn save_all(&self, value: &T) -> Result<(), StorageError> {
        let data = serde_json::to_string_pretty(value).map_err(|source| StorageError::Encode {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, data).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "saved");
        Ok(())
    }
}

/// The three stores the application works with.
#[derive(Debug, Clone)]
pub struct Stores {
    pub credentials: CredentialStore,
    pub tasks: TaskStore,
    pub schedule: ScheduleStore,
}

impl Stores {
    pub fn from_config(config: &Config) -> Self {
        Self {
            credentials: JsonStore::new(config.users_path(), config.corrupt_files),
            tasks: JsonStore::new(config.tasks_path(), config.corrupt_files),
            schedule: JsonStore::new(config.schedule_path(), config.corrupt_files),
        }
    }
}
