//! Core domain logic for the student progress roster.
//! This crate is the single source of truth for roster invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{default_log_dir, resolve_data_path, DATA_FILE_NAME, DATA_PATH_ENV};
pub use logging::{default_log_level, init_logging, init_logging_for_data_path, logging_status};
pub use model::student::{
    format_due_date, parse_due_date, today, Roster, StudentRecord, Task, TaskState,
};
pub use repo::roster_repo::{
    InMemoryRosterRepository, JsonFileRosterRepository, RosterError, RosterRepository,
    RosterResult,
};
pub use service::edit_session::{
    CloseChoice, CloseDecision, EditSession, SessionError, TaskRowPatch,
};
pub use service::roster_service::RosterService;
pub use storage::StorageError;

/// Minimal health-check API for front-end wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
