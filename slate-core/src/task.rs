//! Task model for the assignment tracker.
//!
//! One `Task` is one concrete due-date record. Recurring schedules are
//! expanded into independent rows up front (see `crate::recurrence`), so
//! nothing here ever re-expands.

use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::weekday::WeekdaySet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Graded,
}

impl TaskStatus {
    /// Display string, also the value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Graded => "Graded",
        }
    }

    /// Parse either the stored form ("In Progress") or the CLI form
    /// ("in-progress"). Legacy rows with an empty status read as NotStarted.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "not started" | "not-started" => Ok(TaskStatus::NotStarted),
            "in progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "graded" => Ok(TaskStatus::Graded),
            other => bail!("unknown status '{other}' (expected not-started, in-progress, completed, or graded)"),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        TaskStatus::parse(s)
    }
}

/// A persisted task row. `id` is assigned by the store and immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub course: String,
    pub start: NaiveDateTime,
    pub due: NaiveDateTime,
    pub status: TaskStatus,
    /// Recurrence pattern of the originating series, kept on every instance
    /// for display. Generated instances never re-expand.
    pub recurrence_days: WeekdaySet,
    /// Lead time before `due`; 0 disables reminders for this task.
    pub reminder_hours: u32,
    /// Durable sent flag. Transitions 0 -> 1 exactly once.
    pub reminder_sent: bool,
}

/// An unsaved task: everything except the store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
    pub course: String,
    pub start: NaiveDateTime,
    pub due: NaiveDateTime,
    pub status: TaskStatus,
    pub recurrence_days: WeekdaySet,
    pub reminder_hours: u32,
    pub reminder_sent: bool,
}

impl TaskDraft {
    pub fn new(
        name: impl Into<String>,
        course: impl Into<String>,
        start: NaiveDateTime,
        due: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            course: course.into(),
            start,
            due,
            status: TaskStatus::NotStarted,
            recurrence_days: WeekdaySet::empty(),
            reminder_hours: 24,
            reminder_sent: false,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_recurrence(mut self, days: WeekdaySet) -> Self {
        self.recurrence_days = days;
        self
    }

    pub fn with_reminder_hours(mut self, hours: u32) -> Self {
        self.reminder_hours = hours;
        self
    }

    /// Mark the draft sent when its due time is already behind `now`.
    /// Applied at creation to the seed and to every generated recurrence
    /// instance, so backdated tasks never fire on the next cycle.
    pub fn mark_sent_if_past(mut self, now: NaiveDateTime) -> Self {
        if self.due < now {
            self.reminder_sent = true;
        }
        self
    }

    /// Field-level validation, run before any store write.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("name is required");
        }
        if self.due < self.start {
            bail!("due ({}) cannot be before start ({})", self.due, self.start);
        }
        Ok(())
    }

    /// Attach a store-assigned id, producing a full row.
    pub fn into_task(self, id: i64) -> Task {
        Task {
            id,
            name: self.name,
            course: self.course,
            start: self.start,
            due: self.due,
            status: self.status,
            recurrence_days: self.recurrence_days,
            reminder_hours: self.reminder_hours,
            reminder_sent: self.reminder_sent,
        }
    }
}
