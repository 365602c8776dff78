// Task model

use crate::error::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Store-assigned identity of a persisted task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl ToSql for TaskId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for TaskId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

/// Calendar deadline, kept as milliseconds since the Unix epoch (UTC)
///
/// The millisecond value is what gets stored, so a deadline read back from
/// the database compares equal to the one written. Day granularity only
/// applies when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deadline(i64);

impl Deadline {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Deadline at local midnight of the given date
    pub fn from_date(date: NaiveDate) -> Self {
        let midnight = date.and_time(NaiveTime::MIN);
        let millis = Local
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.timestamp_millis())
            // No local midnight on DST-gap days
            .unwrap_or_else(|| midnight.and_utc().timestamp_millis());
        Self(millis)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    pub fn to_local(self) -> Result<DateTime<Local>> {
        DateTime::from_timestamp_millis(self.0)
            .map(|dt| dt.with_timezone(&Local))
            .ok_or(Error::InvalidDeadline(self.0))
    }

    /// Local calendar date this deadline falls on
    pub fn date(self) -> Result<NaiveDate> {
        self.to_local().map(|dt| dt.date_naive())
    }
}

impl From<NaiveDate> for Deadline {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date() {
            Ok(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Err(_) => write!(f, "{}ms", self.0),
        }
    }
}

impl ToSql for Deadline {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Deadline {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// `None` until the store has persisted the task
    pub id: Option<TaskId>,
    pub name: String,
    pub deadline: Deadline,
    /// Number of days
    pub duration: i32,
    pub description: String,
    pub completed: bool,
}

impl Task {
    pub fn new(name: impl Into<String>, deadline: Deadline, duration: i32, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            deadline,
            duration,
            description: description.into(),
            completed: false,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.completed {
            write!(f, "[COMPLETED] ")?;
        }
        write!(f, "{} - Deadline: {}", self.name, self.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_task_is_unpersisted_and_pending() {
        let task = Task::new("Buy milk", Deadline::from_date(date(2024, 6, 1)), 1, "2%");
        assert_eq!(task.id, None);
        assert!(!task.is_persisted());
        assert!(!task.completed);
    }

    #[test]
    fn test_deadline_from_date_keeps_calendar_day() {
        let deadline = Deadline::from_date(date(2024, 6, 1));
        assert_eq!(deadline.date().unwrap(), date(2024, 6, 1));
        assert_eq!(deadline.to_string(), "2024-06-01");
    }

    #[test]
    fn test_deadline_orders_by_millis() {
        let earlier = Deadline::from_date(date(2024, 5, 1));
        let later = Deadline::from_date(date(2024, 6, 1));
        assert!(earlier < later);
        assert!(Deadline::from_millis(-1) < Deadline::from_millis(0));
    }

    #[test]
    fn test_deadline_out_of_range() {
        let deadline = Deadline::from_millis(i64::MAX);
        assert!(matches!(deadline.date(), Err(Error::InvalidDeadline(_))));
        assert_eq!(deadline.to_string(), format!("{}ms", i64::MAX));
    }

    #[test]
    fn test_task_display() {
        let mut task = Task::new("Buy milk", Deadline::from_date(date(2024, 6, 1)), 1, "2%");
        assert_eq!(task.to_string(), "Buy milk - Deadline: 2024-06-01");

        task.completed = true;
        assert_eq!(task.to_string(), "[COMPLETED] Buy milk - Deadline: 2024-06-01");
    }

    #[test]
    fn test_task_id_parse() {
        assert_eq!("42".parse::<TaskId>().unwrap(), TaskId::new(42));
        assert_eq!(" 7 ".parse::<TaskId>().unwrap().get(), 7);
        assert!("abc".parse::<TaskId>().is_err());
    }

    #[test]
    fn test_task_serialization() {
        let mut task = Task::new("Buy milk", Deadline::from_millis(1_717_200_000_000), 1, "2%");
        task.id = Some(TaskId::new(3));

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"id\":3"));
        assert!(json.contains("\"deadline\":1717200000000"));

        let deserialized: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, task);
    }
}
