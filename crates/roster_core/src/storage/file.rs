//! File read/write helpers for the roster JSON document.
//!
//! # Side effects
//! - Emits `roster_read` / `roster_write` logging events with duration and
//!   status. Events carry sizes and paths only, never record contents.

use super::{StorageError, StorageResult};
use log::{error, info};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;

/// Reads the roster file into a string.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_roster_file(path: &Path) -> StorageResult<Option<String>> {
    let started_at = Instant::now();
    match fs::read_to_string(path) {
        Ok(text) => {
            info!(
                "event=roster_read module=storage status=ok bytes={} duration_ms={}",
                text.len(),
                started_at.elapsed().as_millis()
            );
            Ok(Some(text))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                "event=roster_read module=storage status=missing path={}",
                path.display()
            );
            Ok(None)
        }
        Err(err) => {
            error!(
                "event=roster_read module=storage status=error error_code=read_failed path={} error={}",
                path.display(),
                err
            );
            Err(StorageError::Io {
                path: path.to_path_buf(),
                source: err,
            })
        }
    }
}

/// Replaces `path` with `contents`.
///
/// The bytes go to a temp file in the same directory, are synced, and the
/// temp file is then renamed over the target. Missing parent directories are
/// created first.
pub fn write_roster_file_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let started_at = Instant::now();
    match write_atomic_inner(path, contents) {
        Ok(()) => {
            info!(
                "event=roster_write module=storage status=ok bytes={} duration_ms={}",
                contents.len(),
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=roster_write module=storage status=error error_code=write_failed duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn write_atomic_inner(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let io_err = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_err)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(contents).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|err| io_err(err.error))?;
    Ok(())
}
