//! Roster use-case service.
//!
//! # Responsibility
//! - Own the in-memory roster and its repository.
//! - Provide add/delete/save commands that persist the whole roster.
//!
//! # Invariants
//! - Every successful mutation is persisted before it becomes visible.
//! - A failed mutation leaves the in-memory roster unchanged.
//! - Saved records never contain blank-named tasks.

use crate::model::student::{normalize_student_name, Roster, StudentRecord, Task};
use crate::repo::roster_repo::{RosterError, RosterRepository, RosterResult};
use log::{error, info, warn};
use std::time::Instant;

/// Explicit roster store handed to command handlers.
pub struct RosterService<R: RosterRepository> {
    repo: R,
    roster: Roster,
}

impl<R: RosterRepository> RosterService<R> {
    /// Loads the roster from `repo`.
    ///
    /// # Errors
    /// - Returns `RosterError::Storage` when the backing store is unreadable
    ///   or malformed.
    pub fn open(repo: R) -> RosterResult<Self> {
        let started_at = Instant::now();
        match repo.load() {
            Ok(roster) => {
                info!(
                    "event=roster_load module=service status=ok students={} duration_ms={}",
                    roster.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(Self { repo, roster })
            }
            Err(err) => {
                error!(
                    "event=roster_load module=service status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn student(&self, name: &str) -> Option<&StudentRecord> {
        self.roster.get(name.trim())
    }

    /// Student names in display order.
    pub fn student_names(&self) -> Vec<String> {
        self.roster.names().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Adds a blank record for `name` and persists the roster.
    ///
    /// Returns the trimmed name that was stored.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank.
    /// - `DuplicateKey` when the name is already present; nothing is written.
    pub fn add_student(&mut self, name: &str) -> RosterResult<String> {
        let name = normalize_student_name(name).ok_or(RosterError::EmptyName)?;
        if self.roster.contains(&name) {
            warn!("event=student_add module=service status=rejected reason=duplicate");
            return Err(RosterError::DuplicateKey(name));
        }

        let mut next = self.roster.clone();
        next.insert(name.clone(), StudentRecord::default());
        self.commit("student_add", next)?;
        Ok(name)
    }

    /// Removes `name` and persists the roster.
    ///
    /// Returns whether a record was removed. Absent names are not an error;
    /// the roster is still persisted.
    pub fn delete_student(&mut self, name: &str) -> RosterResult<bool> {
        let mut next = self.roster.clone();
        let removed = next.remove(name.trim()).is_some();
        self.commit("student_delete", next)?;
        Ok(removed)
    }

    /// Replaces the record of `name` wholesale and persists the roster.
    ///
    /// Blank-named tasks are dropped before storage. An unknown name is
    /// inserted at the end.
    pub fn save_student(
        &mut self,
        name: &str,
        research: impl Into<String>,
        memo: impl Into<String>,
        tasks: Vec<Task>,
    ) -> RosterResult<()> {
        let name = normalize_student_name(name).ok_or(RosterError::EmptyName)?;
        let record = StudentRecord::new(research, memo, tasks);
        let mut next = self.roster.clone();
        next.insert(name, record);
        self.commit("student_save", next)
    }

    fn commit(&mut self, event: &str, next: Roster) -> RosterResult<()> {
        let started_at = Instant::now();
        match self.repo.persist(&next) {
            Ok(()) => {
                info!(
                    "event={} module=service status=ok students={} duration_ms={}",
                    event,
                    next.len(),
                    started_at.elapsed().as_millis()
                );
                self.roster = next;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event={} module=service status=error duration_ms={} error={}",
                    event,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}
