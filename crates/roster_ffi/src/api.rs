//! FFI use-case API for the desktop front-end.
//!
//! # Responsibility
//! - Expose roster commands as sync, use-case-level functions via FRB.
//! - Translate core types into plain envelopes (string dates and labels).
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Each mutating call loads, mutates and persists under one process-wide
//!   lock; calls never interleave on the roster file.
//! - A failed save writes nothing.

use chrono::NaiveDate;
use roster_core::{
    core_version as core_version_inner, format_due_date, init_logging as init_logging_inner,
    parse_due_date, ping as ping_inner, resolve_data_path, today, JsonFileRosterRepository,
    RosterResult, RosterService, StudentRecord, Task, TaskState,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

static DATA_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);
static ROSTER_LOCK: Mutex<()> = Mutex::new(());

/// Health-check call for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns empty string on success, error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Points subsequent calls at `data_path`.
///
/// Blank input restores default resolution (`ROSTER_DATA_PATH`, then the
/// executable's directory). Returns the effective path.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_configure(data_path: String) -> String {
    let trimmed = data_path.trim();
    let next = if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    };
    match DATA_PATH.lock() {
        Ok(mut guard) => *guard = next,
        Err(poisoned) => *poisoned.into_inner() = next,
    }
    effective_data_path().display().to_string()
}

/// Effective roster file path.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_data_path() -> String {
    effective_data_path().display().to_string()
}

/// State labels in display order, for the state picker.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_task_states() -> Vec<String> {
    TaskState::ALL
        .iter()
        .map(|state| state.label().to_string())
        .collect()
}

/// One task row as shown in the task table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub name: String,
    /// `YYYY-MM-DD`.
    pub due: String,
    /// One of `roster_task_states()`.
    pub state: String,
    /// Due date lies before today.
    pub overdue: bool,
}

/// Detail pane content for one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentView {
    pub name: String,
    pub research: String,
    pub memo: String,
    pub tasks: Vec<TaskView>,
}

/// Task row collected from the table on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub name: String,
    pub due: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterListResponse {
    pub ok: bool,
    /// Student names in display order.
    pub names: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentResponse {
    pub ok: bool,
    pub student: Option<StudentView>,
    pub message: String,
}

/// Generic action envelope for roster commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterActionResponse {
    pub ok: bool,
    /// Student affected by the command, as stored.
    pub name: Option<String>,
    pub message: String,
}

impl RosterActionResponse {
    fn success(message: impl Into<String>, name: String) -> Self {
        Self {
            ok: true,
            name: Some(name),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            name: None,
            message: message.into(),
        }
    }
}

/// Lists student names.
///
/// # FFI contract
/// - Sync call, file-backed.
/// - A malformed roster file yields `ok=false`; the file is not modified.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_list() -> RosterListResponse {
    match with_roster_service(|service| Ok(service.student_names())) {
        Ok(names) => RosterListResponse {
            ok: true,
            message: format!("{} student(s).", names.len()),
            names,
        },
        Err(err) => RosterListResponse {
            ok: false,
            names: Vec::new(),
            message: format!("roster_list failed: {err}"),
        },
    }
}

/// Loads the detail view of one student.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_get_student(name: String) -> StudentResponse {
    let key = name.trim().to_string();
    let result = with_roster_service(|service| Ok(service.student(&key).cloned()));
    match result {
        Ok(Some(record)) => StudentResponse {
            ok: true,
            student: Some(to_student_view(key, &record, today())),
            message: String::new(),
        },
        Ok(None) => StudentResponse {
            ok: false,
            student: None,
            message: format!("student not found: {key}"),
        },
        Err(err) => StudentResponse {
            ok: false,
            student: None,
            message: format!("roster_get_student failed: {err}"),
        },
    }
}

/// Adds a blank student record and persists the roster.
///
/// Duplicate or blank names return `ok=false` and write nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_add_student(name: String) -> RosterActionResponse {
    match with_roster_service(|service| service.add_student(&name)) {
        Ok(stored) => RosterActionResponse::success("Student added.", stored),
        Err(err) => RosterActionResponse::failure(format!("roster_add_student failed: {err}")),
    }
}

/// Deletes a student and persists the roster.
///
/// Confirmation is the caller's job; an absent name still succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_delete_student(name: String) -> RosterActionResponse {
    let key = name.trim().to_string();
    match with_roster_service(|service| service.delete_student(&key)) {
        Ok(true) => RosterActionResponse::success("Student deleted.", key),
        Ok(false) => RosterActionResponse::success("Student was already absent.", key),
        Err(err) => RosterActionResponse::failure(format!("roster_delete_student failed: {err}")),
    }
}

/// Replaces one student's record with the detail pane content.
///
/// # FFI contract
/// - Rows with a blank name are skipped.
/// - Any remaining row with an unparseable due date or unknown state aborts
///   the save; nothing is written.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_save_student(
    name: String,
    research: String,
    memo: String,
    tasks: Vec<TaskInput>,
) -> RosterActionResponse {
    let tasks = match collect_task_rows(&tasks) {
        Ok(tasks) => tasks,
        Err(err) => {
            log::warn!("event=student_save module=ffi status=rejected reason=invalid_row");
            return RosterActionResponse::failure(format!("roster_save_student aborted: {err}"));
        }
    };
    let key = name.trim().to_string();
    match with_roster_service(|service| service.save_student(&key, research, memo, tasks)) {
        Ok(()) => RosterActionResponse::success("Saved.", key),
        Err(err) => RosterActionResponse::failure(format!("roster_save_student failed: {err}")),
    }
}

fn collect_task_rows(rows: &[TaskInput]) -> Result<Vec<Task>, String> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| !row.name.trim().is_empty())
        .map(|(index, row)| -> Result<Task, String> {
            let due = parse_due_date(&row.due)
                .ok_or_else(|| format!("row {}: invalid due date `{}`", index + 1, row.due))?;
            let state = TaskState::parse_label(&row.state)
                .ok_or_else(|| format!("row {}: unknown state `{}`", index + 1, row.state))?;
            Ok(Task::new(row.name.trim(), due, state))
        })
        .collect()
}

fn to_student_view(name: String, record: &StudentRecord, today: NaiveDate) -> StudentView {
    StudentView {
        name,
        research: record.research.clone(),
        memo: record.memo.clone(),
        tasks: record
            .tasks
            .iter()
            .map(|task| TaskView {
                name: task.name.clone(),
                due: format_due_date(task.due),
                state: task.state.label().to_string(),
                overdue: task.is_overdue(today),
            })
            .collect(),
    }
}

fn effective_data_path() -> PathBuf {
    let configured = match DATA_PATH.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    configured.unwrap_or_else(|| resolve_data_path(None))
}

fn with_roster_service<T>(
    f: impl FnOnce(&mut RosterService<JsonFileRosterRepository>) -> RosterResult<T>,
) -> Result<T, String> {
    let _guard = ROSTER_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let path = effective_data_path();
    open_and_run(&path, f)
}

fn open_and_run<T>(
    path: &Path,
    f: impl FnOnce(&mut RosterService<JsonFileRosterRepository>) -> RosterResult<T>,
) -> Result<T, String> {
    let mut service = RosterService::open(JsonFileRosterRepository::new(path))
        .map_err(|err| format!("roster open failed: {err}"))?;
    f(&mut service).map_err(|err| err.to_string())
}
