use tracing::info;

use crate::{error::StorageError, store::ScheduleStore};

/// Append-only list of free-text schedule entries.
#[derive(Debug)]
pub struct Schedule {
    entries: Vec<String>,
    store: ScheduleStore,
}

impl Schedule {
    pub fn load(store: ScheduleStore) -> Result<Self, StorageError> {
        let entries = store.load_all()?;
        Ok(Self { entries, store })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Appends `entry` and saves. Blank input is ignored and returns `false`.
    pub fn add(&mut self, entry: &str) -> Result<bool, StorageError> {
        if entry.trim().is_empty() {
            return Ok(false);
        }

        self.entries.push(entry.to_string());
        if let Err(err) = self.store.save_all(&self.entries) {
            self.entries.pop();
            return Err(err);
        }
        info!(count = self.entries.len(), "schedule entry added");
        Ok(true)
    }
}
