use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DUE_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Cycles none -> Low -> Medium -> High -> none.
    pub fn next(current: Option<Priority>) -> Option<Priority> {
        match current {
            None => Some(Priority::Low),
            Some(Priority::Low) => Some(Priority::Medium),
            Some(Priority::Medium) => Some(Priority::High),
            Some(Priority::High) => None,
        }
    }

    pub fn previous(current: Option<Priority>) -> Option<Priority> {
        match current {
            None => Some(Priority::High),
            Some(Priority::High) => Some(Priority::Medium),
            Some(Priority::Medium) => Some(Priority::Low),
            Some(Priority::Low) => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    // Files written before ids existed get one on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub text: String,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(text: String, due_date: Option<String>, priority: Option<Priority>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            due_date: due_date.filter(|d| !d.is_empty()),
            priority,
            completed: false,
        }
    }

    /// Base label, always derived from the fields.
    pub fn label(&self) -> String {
        self.heading() + &self.due_suffix().unwrap_or_default()
    }

    pub fn display_label(&self) -> String {
        let (head, due) = self.display_parts();
        head + &due.unwrap_or_default()
    }

    /// [`display_label`](Self::display_label) split before ` (Due: ...)`, so
    /// the due part can be styled on its own.
    pub fn display_parts(&self) -> (String, Option<String>) {
        let head = if self.completed {
            format!("[X] {}", self.heading())
        } else {
            self.heading()
        };
        (head, self.due_suffix())
    }

    fn heading(&self) -> String {
        match self.priority {
            Some(priority) => format!("{} [{} Priority]", self.text, priority),
            None => self.text.clone(),
        }
    }

    fn due_suffix(&self) -> Option<String> {
        self.due_date.as_ref().map(|due| format!(" (Due: {})", due))
    }

    /// The due date when it is written as DD-MM-YYYY.
    pub fn due_on(&self) -> Option<NaiveDate> {
        self.due_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), DUE_DATE_FORMAT).ok())
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_on().is_some_and(|due| due < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_includes_priority_and_due_date() {
        let task = Task::new(
            "Buy milk".into(),
            Some("01-01-2026".into()),
            Some(Priority::High),
        );
        assert_eq!(task.label(), "Buy milk [High Priority] (Due: 01-01-2026)");
    }

    #[test]
    fn label_omits_missing_parts() {
        let task = Task::new("Read".into(), Some(String::new()), None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.label(), "Read");
    }

    #[test]
    fn double_toggle_restores_display_label() {
        let mut task = Task::new("Essay".into(), None, Some(Priority::Low));
        let original = task.display_label();

        task.completed = !task.completed;
        assert_eq!(task.display_label(), "[X] Essay [Low Priority]");
        task.completed = !task.completed;
        assert_eq!(task.display_label(), original);
    }

    #[test]
    fn display_parts_split_off_the_due_date() {
        let mut task = Task::new("Essay".into(), Some("01-01-2000".into()), Some(Priority::Low));
        task.completed = true;
        assert_eq!(
            task.display_parts(),
            ("[X] Essay [Low Priority]".to_string(), Some(" (Due: 01-01-2000)".to_string()))
        );
        assert_eq!(Task::new("Read".into(), None, None).display_parts().1, None);
    }

    #[test]
    fn legacy_record_without_id_loads() {
        let raw = r#"{"text": "Old", "due_date": null, "priority": "Medium", "completed": true}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.text, "Old");
        assert_eq!(task.priority, Some(Priority::Medium));
        assert!(task.completed);
    }

    #[test]
    fn overdue_needs_a_parseable_past_date() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let past = Task::new("a".into(), Some("09-03-2026".into()), None);
        let future = Task::new("b".into(), Some("11-03-2026".into()), None);
        let free_form = Task::new("c".into(), Some("next week".into()), None);
        let mut done = past.clone();
        done.completed = true;

        assert!(past.is_overdue(today));
        assert!(!future.is_overdue(today));
        assert!(!free_form.is_overdue(today));
        assert!(!done.is_overdue(today));
    }

    #[test]
    fn priority_cycles_through_none() {
        let mut p = None;
        for expected in [Some(Priority::Low), Some(Priority::Medium), Some(Priority::High), None] {
            p = Priority::next(p);
            assert_eq!(p, expected);
        }
        assert_eq!(Priority::previous(None), Some(Priority::High));
    }
}
