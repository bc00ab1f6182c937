//! Data file and log directory resolution.
//!
//! # Responsibility
//! - Decide where the roster file lives.
//! - Derive the default log directory from the roster location.
//!
//! # Invariants
//! - Precedence: explicit path, then `ROSTER_DATA_PATH`, then the
//!   executable's directory, then the working directory.
//! - Blank overrides are ignored.

use std::path::{Path, PathBuf};

/// File name of the roster document.
pub const DATA_FILE_NAME: &str = "students.json";
/// Environment variable overriding the roster file location.
pub const DATA_PATH_ENV: &str = "ROSTER_DATA_PATH";
/// Log directory name, created next to the roster file.
pub const LOG_DIR_NAME: &str = "logs";

/// Resolves the roster file path for the running process.
pub fn resolve_data_path(explicit: Option<&Path>) -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    resolve_data_path_from(explicit, std::env::var(DATA_PATH_ENV).ok(), exe_dir)
}

/// Pure form of [`resolve_data_path`] with all inputs supplied.
pub fn resolve_data_path_from(
    explicit: Option<&Path>,
    env_value: Option<String>,
    exe_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = explicit.filter(|path| !path.as_os_str().is_empty()) {
        return path.to_path_buf();
    }
    if let Some(raw) = env_value {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    exe_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_FILE_NAME)
}

/// Default absolute log directory for a roster file.
pub fn default_log_dir(data_path: &Path) -> PathBuf {
    let parent = match data_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let dir = parent.join(LOG_DIR_NAME);
    if dir.is_absolute() {
        dir
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&dir))
            .unwrap_or(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::{default_log_dir, resolve_data_path_from, DATA_FILE_NAME};
    use std::path::{Path, PathBuf};

    #[test]
    fn explicit_path_wins_over_env() {
        let path = resolve_data_path_from(
            Some(Path::new("/data/roster.json")),
            Some("/env/students.json".to_string()),
            Some(PathBuf::from("/opt/app")),
        );
        assert_eq!(path, PathBuf::from("/data/roster.json"));
    }

    #[test]
    fn blank_env_falls_back_to_exe_dir() {
        let path =
            resolve_data_path_from(None, Some("   ".to_string()), Some(PathBuf::from("/opt/app")));
        assert_eq!(path, PathBuf::from("/opt/app").join(DATA_FILE_NAME));
    }

    #[test]
    fn env_value_is_trimmed() {
        let path = resolve_data_path_from(None, Some(" /env/s.json ".to_string()), None);
        assert_eq!(path, PathBuf::from("/env/s.json"));
    }

    #[test]
    fn log_dir_is_absolute_sibling_of_data_file() {
        let dir = default_log_dir(Path::new("students.json"));
        assert!(dir.is_absolute());
        assert!(dir.ends_with("logs"));
    }
}
