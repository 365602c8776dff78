// Text input parsing for new and edited tasks

use crate::task::{Deadline, Task};
use chrono::NaiveDate;
use thiserror::Error;

/// Date format accepted and shown for deadlines
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Name, deadline, and duration cannot be empty")]
    MissingEditFields,

    #[error("Invalid input format: duration must be a whole number of days, got {0:?}")]
    InvalidDuration(String),

    #[error("Invalid input format: deadline must be YYYY-MM-DD, got {0:?}")]
    InvalidDeadline(String),
}

/// Raw field values as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub name: String,
    pub deadline: String,
    pub duration: String,
    pub description: String,
    pub completed: bool,
}

impl TaskForm {
    /// Pre-fill a form with an existing task's values
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            deadline: task.deadline.to_string(),
            duration: task.duration.to_string(),
            description: task.description.clone(),
            completed: task.completed,
        }
    }

    /// Build a new, unpersisted task. Every field must be filled in.
    pub fn into_task(self) -> Result<Task, FormError> {
        let name = self.name.trim();
        let deadline = self.deadline.trim();
        let duration = self.duration.trim();
        let description = self.description.trim();

        if name.is_empty() || deadline.is_empty() || duration.is_empty() || description.is_empty() {
            return Err(FormError::MissingFields);
        }

        let mut task = Task::new(name, parse_deadline(deadline)?, parse_duration(duration)?, description);
        task.completed = self.completed;
        Ok(task)
    }

    /// Copy `task` with the form's values, keeping its id
    ///
    /// The description may be left empty when editing.
    pub fn apply_to(&self, task: &Task) -> Result<Task, FormError> {
        let name = self.name.trim();
        let deadline = self.deadline.trim();
        let duration = self.duration.trim();

        if name.is_empty() || deadline.is_empty() || duration.is_empty() {
            return Err(FormError::MissingEditFields);
        }

        let deadline = parse_deadline(deadline)?;
        // Unchanged text keeps the stored instant rather than snapping to midnight
        let deadline = if deadline.date().ok() == task.deadline.date().ok() {
            task.deadline
        } else {
            deadline
        };

        Ok(Task {
            id: task.id,
            name: name.to_string(),
            deadline,
            duration: parse_duration(duration)?,
            description: self.description.trim().to_string(),
            completed: self.completed,
        })
    }
}

/// Parse a `YYYY-MM-DD` date into a local-midnight deadline
pub fn parse_deadline(s: &str) -> Result<Deadline, FormError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map(Deadline::from_date)
        .map_err(|_| FormError::InvalidDeadline(s.to_string()))
}

/// Parse a day count; zero and negative values are accepted
pub fn parse_duration(s: &str) -> Result<i32, FormError> {
    s.trim()
        .parse()
        .map_err(|_| FormError::InvalidDuration(s.to_string()))
}
