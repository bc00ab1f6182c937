//! Roster, student record and task model.
//!
//! # Responsibility
//! - Define the persisted shape of the roster file.
//! - Normalize task fields on decode (`due` falls back to today, unknown
//!   `state` falls back to `NotStarted`).
//!
//! # Invariants
//! - `Roster` keys are trimmed, non-empty and unique.
//! - `Task::due` is always a concrete calendar date.
//! - Records produced by `StudentRecord::new` never hold blank-named tasks.

use chrono::{Local, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Wire format for task due dates.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a `YYYY-MM-DD` due date, tolerating surrounding whitespace.
pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DUE_DATE_FORMAT).ok()
}

/// Formats a due date in wire format.
pub fn format_due_date(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}

/// Trims a student name and rejects blank input.
pub fn normalize_student_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Progress state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskState {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

impl TaskState {
    pub const ALL: [TaskState; 3] = [Self::NotStarted, Self::InProgress, Self::Done];

    /// Canonical label written to the roster file.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::InProgress => "InProgress",
            Self::Done => "Done",
        }
    }

    /// Parses a state label.
    ///
    /// Accepts canonical labels, snake_case spellings and the labels written
    /// by the earlier desktop tool (`未着手`, `進行中`, `完了`).
    pub fn parse_label(value: &str) -> Option<Self> {
        match value.trim() {
            "NotStarted" | "not_started" | "未着手" => Some(Self::NotStarted),
            "InProgress" | "in_progress" | "進行中" => Some(Self::InProgress),
            "Done" | "done" | "完了" => Some(Self::Done),
            _ => None,
        }
    }

    /// Parses a state label, coercing anything unrecognized to `NotStarted`.
    pub fn from_label_lossy(value: &str) -> Self {
        Self::parse_label(value).unwrap_or_default()
    }
}

impl Display for TaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit of work attached to a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskWire", into = "TaskWire")]
pub struct Task {
    pub name: String,
    pub due: NaiveDate,
    pub state: TaskState,
}

impl Task {
    pub fn new(name: impl Into<String>, due: NaiveDate, state: TaskState) -> Self {
        Self {
            name: name.into(),
            due,
            state,
        }
    }

    /// Blank row as created by "add task": empty name, due today.
    pub fn blank(today: NaiveDate) -> Self {
        Self::new(String::new(), today, TaskState::NotStarted)
    }

    /// Returns whether this task would survive a save.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// A task is overdue when its due date lies strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due < today
    }
}

// `due` and `state` accept any JSON value so that one bad cell degrades to
// the default instead of failing the whole file.
#[derive(Serialize, Deserialize)]
struct TaskWire {
    #[serde(default)]
    name: String,
    #[serde(default)]
    due: Value,
    #[serde(default)]
    state: Value,
}

impl From<TaskWire> for Task {
    fn from(wire: TaskWire) -> Self {
        let due = wire
            .due
            .as_str()
            .and_then(parse_due_date)
            .unwrap_or_else(today);
        let state = wire
            .state
            .as_str()
            .map(TaskState::from_label_lossy)
            .unwrap_or_default();
        Self {
            name: wire.name,
            due,
            state,
        }
    }
}

impl From<Task> for TaskWire {
    fn from(task: Task) -> Self {
        Self {
            name: task.name,
            due: Value::String(format_due_date(task.due)),
            state: Value::String(task.state.label().to_string()),
        }
    }
}

/// Everything tracked for one student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(default)]
    pub research: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub memo: String,
}

impl StudentRecord {
    /// Builds a record ready for storage.
    ///
    /// Task names are trimmed and tasks left with a blank name are dropped.
    pub fn new(research: impl Into<String>, memo: impl Into<String>, tasks: Vec<Task>) -> Self {
        let tasks = tasks
            .into_iter()
            .filter(Task::has_name)
            .map(|mut task| {
                task.name = task.name.trim().to_string();
                task
            })
            .collect();
        Self {
            research: research.into(),
            tasks,
            memo: memo.into(),
        }
    }
}

/// Insertion-ordered mapping from student name to record.
///
/// Decoding goes through the repository, which normalizes names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Roster {
    students: IndexMap<String, StudentRecord>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.students.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&StudentRecord> {
        self.students.get(name)
    }

    /// Student names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.students.keys().map(String::as_str)
    }

    /// Inserts or replaces a record.
    ///
    /// Replacing keeps the student's existing position; new names go last.
    pub fn insert(&mut self, name: impl Into<String>, record: StudentRecord) {
        self.students.insert(name.into(), record);
    }

    /// Removes a record, keeping the order of the remaining students.
    pub fn remove(&mut self, name: &str) -> Option<StudentRecord> {
        self.students.shift_remove(name)
    }
}
