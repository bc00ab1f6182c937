//! Edit session for the currently selected student.
//!
//! # Responsibility
//! - Hold draft research/memo text and task rows between explicit saves.
//! - Track the dirty flag and decide the exit prompt outcome.
//!
//! # Invariants
//! - Any draft edit sets the dirty flag; selecting a student or a
//!   successful save clears it.
//! - Draft rows may have blank names; they are dropped only when saved.
//! - Task row edits never touch the roster until `save`.

use crate::model::student::{normalize_student_name, today, Task, TaskState};
use crate::repo::roster_repo::{RosterError, RosterRepository};
use crate::service::roster_service::RosterService;
use chrono::NaiveDate;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error for edit session commands.
#[derive(Debug)]
pub enum SessionError {
    /// Command needs a selected student.
    NoSelection,
    /// Delete-row was requested without a selected row.
    NoRowSelected,
    RowOutOfRange { index: usize, len: usize },
    StudentNotFound(String),
    Roster(RosterError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSelection => write!(f, "no student selected"),
            Self::NoRowSelected => write!(f, "select a task row to delete"),
            Self::RowOutOfRange { index, len } => {
                write!(f, "task row {index} out of range (rows: {len})")
            }
            Self::StudentNotFound(name) => write!(f, "student not found: {name}"),
            Self::Roster(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Roster(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RosterError> for SessionError {
    fn from(value: RosterError) -> Self {
        Self::Roster(value)
    }
}

/// Partial update for one draft task row. `None` fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRowPatch {
    pub name: Option<String>,
    pub due: Option<NaiveDate>,
    pub state: Option<TaskState>,
}

/// User answer to the "save changes?" prompt on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// Whether the front-end should close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Exit,
    Stay,
}

/// Draft state behind the detail pane.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    selected: Option<String>,
    research: String,
    memo: String,
    rows: Vec<Task>,
    dirty: bool,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn research(&self) -> &str {
        &self.research
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn rows(&self) -> &[Task] {
        &self.rows
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Loads the named student's record into the drafts.
    ///
    /// Unsaved drafts of a previous selection are discarded; callers that
    /// care check `is_dirty` first.
    pub fn select<R: RosterRepository>(
        &mut self,
        service: &RosterService<R>,
        name: &str,
    ) -> Result<(), SessionError> {
        let key = name.trim();
        let record = service
            .student(key)
            .ok_or_else(|| SessionError::StudentNotFound(key.to_string()))?;
        self.selected = Some(key.to_string());
        self.research = record.research.clone();
        self.memo = record.memo.clone();
        self.rows = record.tasks.clone();
        self.dirty = false;
        debug!(
            "event=session_select module=session status=ok rows={}",
            self.rows.len()
        );
        Ok(())
    }

    /// Clears the selection and all drafts.
    pub fn clear_selection(&mut self) {
        *self = Self::default();
    }

    pub fn set_research(&mut self, text: impl Into<String>) {
        self.research = text.into();
        self.dirty = true;
    }

    pub fn set_memo(&mut self, text: impl Into<String>) {
        self.memo = text.into();
        self.dirty = true;
    }

    /// Appends a blank row due today. Returns the new row index.
    pub fn add_task_row(&mut self) -> usize {
        self.add_task_row_on(today())
    }

    /// Appends a blank row due on `due`. Returns the new row index.
    pub fn add_task_row_on(&mut self, due: NaiveDate) -> usize {
        self.rows.push(Task::blank(due));
        self.dirty = true;
        self.rows.len() - 1
    }

    pub fn update_task_row(
        &mut self,
        index: usize,
        patch: TaskRowPatch,
    ) -> Result<(), SessionError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(SessionError::RowOutOfRange { index, len })?;
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(due) = patch.due {
            row.due = due;
        }
        if let Some(state) = patch.state {
            row.state = state;
        }
        self.dirty = true;
        Ok(())
    }

    /// Removes the selected row and returns it.
    pub fn delete_task_row(&mut self, index: Option<usize>) -> Result<Task, SessionError> {
        let index = index.ok_or(SessionError::NoRowSelected)?;
        if index >= self.rows.len() {
            return Err(SessionError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        self.dirty = true;
        Ok(self.rows.remove(index))
    }

    /// Saves drafts into the selected student's record.
    ///
    /// On failure the dirty flag stays set and nothing is written.
    pub fn save<R: RosterRepository>(
        &mut self,
        service: &mut RosterService<R>,
    ) -> Result<(), SessionError> {
        let name = self.selected.clone().ok_or(SessionError::NoSelection)?;
        service.save_student(
            &name,
            self.research.clone(),
            self.memo.clone(),
            self.rows.clone(),
        )?;
        if let Some(record) = service.student(&name) {
            self.rows = record.tasks.clone();
        }
        self.dirty = false;
        info!(
            "event=session_save module=session status=ok rows={}",
            self.rows.len()
        );
        Ok(())
    }

    /// Adds a student and selects it.
    pub fn add_student<R: RosterRepository>(
        &mut self,
        service: &mut RosterService<R>,
        name: &str,
    ) -> Result<String, SessionError> {
        let name = service.add_student(name)?;
        self.select(service, &name)?;
        Ok(name)
    }

    /// Deletes a student; clears the drafts when it was selected.
    pub fn delete_student<R: RosterRepository>(
        &mut self,
        service: &mut RosterService<R>,
        name: &str,
    ) -> Result<bool, SessionError> {
        let removed = service.delete_student(name)?;
        let was_selected = normalize_student_name(name)
            .is_some_and(|key| self.selected.as_deref() == Some(key.as_str()));
        if was_selected {
            self.clear_selection();
        }
        Ok(removed)
    }

    /// Resolves an exit request.
    ///
    /// A clean session exits without asking. A dirty session follows
    /// `choice`; a failed save keeps the front-end open.
    pub fn on_close<R: RosterRepository>(
        &mut self,
        service: &mut RosterService<R>,
        choice: impl FnOnce() -> CloseChoice,
    ) -> Result<CloseDecision, SessionError> {
        if !self.dirty {
            return Ok(CloseDecision::Exit);
        }
        match choice() {
            CloseChoice::Save => {
                self.save(service)?;
                Ok(CloseDecision::Exit)
            }
            CloseChoice::Discard => Ok(CloseDecision::Exit),
            CloseChoice::Cancel => Ok(CloseDecision::Stay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CloseChoice, CloseDecision, EditSession, SessionError, TaskRowPatch};
    use crate::model::student::{today, TaskState};
    use crate::repo::roster_repo::InMemoryRosterRepository;
    use crate::service::roster_service::RosterService;

    #[test]
    fn new_row_defaults_to_today_and_not_started() {
        let mut session = EditSession::new();
        let index = session.add_task_row();
        let row = &session.rows()[index];
        assert_eq!(row.name, "");
        assert_eq!(row.due, today());
        assert_eq!(row.state, TaskState::NotStarted);
        assert!(session.is_dirty());
    }

    #[test]
    fn delete_row_requires_selection_and_range() {
        let mut session = EditSession::new();
        session.add_task_row();
        assert!(matches!(
            session.delete_task_row(None),
            Err(SessionError::NoRowSelected)
        ));
        assert!(matches!(
            session.delete_task_row(Some(3)),
            Err(SessionError::RowOutOfRange { index: 3, len: 1 })
        ));
        session.delete_task_row(Some(0)).expect("delete first row");
        assert!(session.rows().is_empty());
    }

    #[test]
    fn update_row_out_of_range_is_rejected() {
        let mut session = EditSession::new();
        let err = session
            .update_task_row(0, TaskRowPatch::default())
            .expect_err("empty session has no rows");
        assert!(matches!(err, SessionError::RowOutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn close_prompt_is_skipped_when_clean() {
        let repo = InMemoryRosterRepository::new();
        let mut service = RosterService::open(&repo).expect("open roster");
        let mut session = EditSession::new();
        let decision = session
            .on_close(&mut service, || panic!("clean sessions must not prompt"))
            .expect("resolve close");
        assert_eq!(decision, CloseDecision::Exit);
    }

    #[test]
    fn cancel_keeps_dirty_session_open() {
        let repo = InMemoryRosterRepository::new();
        let mut service = RosterService::open(&repo).expect("open roster");
        let mut session = EditSession::new();
        session.set_memo("unsaved");
        let decision = session
            .on_close(&mut service, || CloseChoice::Cancel)
            .expect("resolve close");
        assert_eq!(decision, CloseDecision::Stay);
        assert!(session.is_dirty());
    }

    #[test]
    fn save_without_selection_fails_and_stays_dirty() {
        let repo = InMemoryRosterRepository::new();
        let mut service = RosterService::open(&repo).expect("open roster");
        let mut session = EditSession::new();
        session.set_research("orphan");
        let err = session
            .on_close(&mut service, || CloseChoice::Save)
            .expect_err("resolve close must fail");
        assert!(matches!(err, SessionError::NoSelection));
        assert!(session.is_dirty());
        assert_eq!(repo.persist_count(), 0);
    }
}
