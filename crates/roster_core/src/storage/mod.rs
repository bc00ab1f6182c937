//! Roster file storage primitives.
//!
//! # Responsibility
//! - Read the roster file as raw JSON text.
//! - Replace the roster file atomically (temp file + rename).
//!
//! # Invariants
//! - A missing file is not an error; it reads as `None`.
//! - Writers never leave a partially written roster file behind.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod file;

pub use file::{read_roster_file, write_roster_file_atomic};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        message: String,
    },
    Serialize(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Parse { path, message } => {
                write!(f, "malformed roster file `{}`: {message}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to encode roster: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { .. } => None,
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
