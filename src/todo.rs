use tracing::info;
use uuid::Uuid;

use crate::{
    error::{Result, StorageError, ValidationError},
    notify::NotificationScheduler,
    store::TaskStore,
    task::{Priority, Task},
};

/// The raw contents of the "add task" inputs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub due_date: String,
    pub priority: Option<Priority>,
}

/// In-memory task list mirrored to the task store after every change.
///
/// If a save fails the in-memory change is undone before the error is
/// returned, so the list always matches the file.
#[derive(Debug)]
pub struct TodoList {
    tasks: Vec<Task>,
    store: TaskStore,
}

impl TodoList {
    pub fn load(store: TaskStore) -> Result<Self, StorageError> {
        let tasks = store.load_all()?;
        info!(path = %store.path().display(), count = tasks.len(), "task list loaded");
        Ok(Self { tasks, store })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn add(&mut self, draft: TaskDraft, notifier: &dyn NotificationScheduler) -> Result<Uuid> {
        if draft.text.trim().is_empty() {
            return Err(ValidationError::EmptyTask.into());
        }

        let task = Task::new(draft.text, Some(draft.due_date), draft.priority);
        let id = task.id;
        self.tasks.push(task);
        if let Err(err) = self.store.save_all(&self.tasks) {
            self.tasks.pop();
            return Err(err.into());
        }
        info!(task = %id, "task added");

        if let Some(task) = self.get(id).filter(|t| t.due_date.is_some()) {
            notifier.schedule(task);
        }
        Ok(id)
    }

    /// Flips `completed`. Returns the new value, or `None` for an unknown id.
    pub fn toggle(&mut self, id: Uuid) -> Result<Option<bool>, StorageError> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        self.tasks[index].completed = !self.tasks[index].completed;
        if let Err(err) = self.store.save_all(&self.tasks) {
            self.tasks[index].completed = !self.tasks[index].completed;
            return Err(err);
        }
        let completed = self.tasks[index].completed;
        info!(task = %id, completed, "task toggled");
        Ok(Some(completed))
    }

    /// Removes the task. Unknown ids are a no-op and nothing is written.
    pub fn delete(&mut self, id: Uuid) -> Result<bool, StorageError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let removed = self.tasks.remove(index);
        if let Err(err) = self.store.save_all(&self.tasks) {
            self.tasks.insert(index, removed);
            return Err(err);
        }
        info!(task = %id, "task deleted");
        Ok(true)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}
