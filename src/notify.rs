use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::task::Task;

/// Receives a request to remind the user about a task with a due date.
/// Fire-and-forget: callers do not wait for or observe delivery.
pub trait NotificationScheduler {
    fn schedule(&self, task: &Task);
}

/// Records reminder requests in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogScheduler;

impl LogScheduler {
    fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
        (due - today).num_days()
    }
}

impl NotificationScheduler for LogScheduler {
    fn schedule(&self, task: &Task) {
        match task.due_on() {
            Some(due) => {
                let days = Self::days_until(due, Local::now().date_naive());
                info!(task = %task.id, %due, days_until_due = days, "reminder requested");
            }
            None => warn!(
                task = %task.id,
                due_date = task.due_date.as_deref().unwrap_or_default(),
                "reminder requested for a due date that is not DD-MM-YYYY"
            ),
        }
    }
}
