//! File-based state persistence implementation.

use std::io::ErrorKind;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LoadResult, PersistedState, StateError, StateStore};

/// Current state file format version.
///
/// Increment this when making breaking changes to the format.
const STATE_FILE_VERSION: u32 = 1;

/// On-disk state file format.
///
/// JSON with RFC 3339 timestamps. Incompatible versions are treated as
/// corrupted; there is no migration.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    last_address: Option<IpAddr>,
    last_changed_at: Option<DateTime<Utc>>,
    last_checked_at: Option<DateTime<Utc>>,
}

impl From<&PersistedState> for StateFile {
    fn from(state: &PersistedState) -> Self {
        Self {
            version: STATE_FILE_VERSION,
            last_address: state.last_address,
            last_changed_at: state.last_changed_at.map(DateTime::<Utc>::from),
            last_checked_at: state.last_checked_at.map(DateTime::<Utc>::from),
        }
    }
}

impl From<StateFile> for PersistedState {
    fn from(file: StateFile) -> Self {
        Self {
            last_address: file.last_address,
            last_changed_at: file.last_changed_at.map(SystemTime::from),
            last_checked_at: file.last_checked_at.map(SystemTime::from),
        }
    }
}

/// File-based implementation of [`StateStore`].
///
/// # Atomic Writes
///
/// Uses write-to-temp-then-rename:
/// 1. Write to `{path}.tmp`
/// 2. Rename `{path}.tmp` to `{path}`
///
/// The file is either fully written or not written at all.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Creates a new file-based state store at the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Performs the blocking save operation.
    fn save_blocking(path: &Path, state: &StateFile) -> Result<(), StateError> {
        let content = serde_json::to_string_pretty(state).map_err(StateError::Serialize)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StateError::Write)?;
            }
        }

        // state.json -> state.json.tmp, not state.tmp
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));

        std::fs::write(&temp_path, content).map_err(StateError::Write)?;
        std::fs::rename(&temp_path, path).map_err(StateError::Write)?;

        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> LoadResult {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadResult::NotFound,
            Err(e) => {
                return LoadResult::Corrupted {
                    reason: format!("Failed to read file: {e}"),
                };
            }
        };

        match serde_json::from_str::<StateFile>(&content) {
            Ok(file) if file.version != STATE_FILE_VERSION => LoadResult::Corrupted {
                reason: format!(
                    "Incompatible version: expected {STATE_FILE_VERSION}, got {}",
                    file.version
                ),
            },
            Ok(file) => LoadResult::Loaded(file.into()),
            Err(e) => LoadResult::Corrupted {
                reason: format!("Invalid JSON: {e}"),
            },
        }
    }

    async fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        let path = self.path.clone();
        let file = StateFile::from(state);

        tokio::task::spawn_blocking(move || Self::save_blocking(&path, &file))
            .await
            .map_err(StateError::Task)?
    }
}
