//! Roster repository contracts, JSON-file and in-memory implementations.
//!
//! # Responsibility
//! - Load the whole roster from its backing store.
//! - Persist the whole roster, replacing any previous content.
//!
//! # Invariants
//! - A missing backing file loads as an empty roster.
//! - Malformed content surfaces as `StorageError::Parse`; the file is left
//!   untouched so the user can repair it.
//! - Loaded student names are trimmed; blank names and names that collide
//!   after trimming are malformed content.
//! - Documents are written as 2-space indented JSON with UTF-8 text kept
//!   verbatim.

use crate::model::student::{normalize_student_name, Roster, StudentRecord};
use crate::storage::{read_roster_file, write_roster_file_atomic, StorageError};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type RosterResult<T> = Result<T, RosterError>;

/// Error for roster store operations.
#[derive(Debug)]
pub enum RosterError {
    /// Backing store could not be read, decoded or written.
    Storage(StorageError),
    /// A student with this name already exists.
    DuplicateKey(String),
    /// Student name was blank after trimming.
    EmptyName,
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::DuplicateKey(name) => write!(f, "student already exists: {name}"),
            Self::EmptyName => write!(f, "student name cannot be empty"),
        }
    }
}

impl Error for RosterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::DuplicateKey(_) | Self::EmptyName => None,
        }
    }
}

impl From<StorageError> for RosterError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Repository interface for whole-roster persistence.
pub trait RosterRepository {
    fn load(&self) -> RosterResult<Roster>;
    fn persist(&self, roster: &Roster) -> RosterResult<()>;
}

/// Roster stored as one JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileRosterRepository {
    path: PathBuf,
}

impl JsonFileRosterRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterRepository for JsonFileRosterRepository {
    fn load(&self) -> RosterResult<Roster> {
        match read_roster_file(&self.path)? {
            Some(text) => Ok(decode_roster(&text, &self.path)?),
            None => Ok(Roster::new()),
        }
    }

    fn persist(&self, roster: &Roster) -> RosterResult<()> {
        let bytes = encode_roster(roster)?;
        write_roster_file_atomic(&self.path, &bytes)?;
        Ok(())
    }
}

/// Roster kept as an encoded document in memory.
///
/// Goes through the same encode/decode path as the file repository, which
/// keeps tests honest about the wire format.
#[derive(Debug, Default)]
pub struct InMemoryRosterRepository {
    document: RefCell<Option<String>>,
    persist_count: Cell<usize>,
}

impl InMemoryRosterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with raw document text.
    pub fn with_document(text: impl Into<String>) -> Self {
        Self {
            document: RefCell::new(Some(text.into())),
            persist_count: Cell::new(0),
        }
    }

    /// Currently stored document text, if anything was stored.
    pub fn document(&self) -> Option<String> {
        self.document.borrow().clone()
    }

    /// Number of successful `persist` calls.
    pub fn persist_count(&self) -> usize {
        self.persist_count.get()
    }
}

impl RosterRepository for InMemoryRosterRepository {
    fn load(&self) -> RosterResult<Roster> {
        match self.document.borrow().as_deref() {
            Some(text) => Ok(decode_roster(text, Path::new(":memory:"))?),
            None => Ok(Roster::new()),
        }
    }

    fn persist(&self, roster: &Roster) -> RosterResult<()> {
        let bytes = encode_roster(roster)?;
        let text = String::from_utf8(bytes).map_err(|err| StorageError::Parse {
            path: PathBuf::from(":memory:"),
            message: err.to_string(),
        })?;
        *self.document.borrow_mut() = Some(text);
        self.persist_count.set(self.persist_count.get() + 1);
        Ok(())
    }
}

impl<R: RosterRepository + ?Sized> RosterRepository for &R {
    fn load(&self) -> RosterResult<Roster> {
        (**self).load()
    }

    fn persist(&self, roster: &Roster) -> RosterResult<()> {
        (**self).persist(roster)
    }
}

fn decode_roster(text: &str, path: &Path) -> Result<Roster, StorageError> {
    let parse_error = |message: String| StorageError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let raw: IndexMap<String, StudentRecord> =
        serde_json::from_str(text).map_err(|err| parse_error(err.to_string()))?;

    let mut roster = Roster::new();
    for (position, (raw_name, record)) in raw.into_iter().enumerate() {
        let name = normalize_student_name(&raw_name)
            .ok_or_else(|| parse_error(format!("student #{} has a blank name", position + 1)))?;
        if roster.contains(&name) {
            return Err(parse_error(format!(
                "student #{} repeats an earlier name once trimmed",
                position + 1
            )));
        }
        roster.insert(name, record);
    }
    Ok(roster)
}

fn encode_roster(roster: &Roster) -> Result<Vec<u8>, StorageError> {
    let mut bytes = serde_json::to_vec_pretty(roster)?;
    bytes.push(b'\n');
    Ok(bytes)
}
