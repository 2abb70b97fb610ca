//! Last-known address persistence across restarts.
//!
//! This module provides the [`PersistedState`] value and the [`StateStore`]
//! abstraction for storing and retrieving it between program executions.
//!
//! Only the watcher loop writes state; running several watcher processes
//! against the same state file is not supported.

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileStateStore;

use std::io;
use std::net::IpAddr;
use std::time::SystemTime;

use thiserror::Error;

use crate::monitor::AddressRecord;

/// The single piece of state the watcher keeps between cycles and restarts.
///
/// `Default` is the all-absent state ("no prior observation").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistedState {
    /// The most recently detected address, absent before the first observation.
    pub last_address: Option<IpAddr>,
    /// When `last_address` was detected.
    pub last_changed_at: Option<SystemTime>,
    /// When the state was last written by a cycle.
    pub last_checked_at: Option<SystemTime>,
}

impl PersistedState {
    /// Builds the state that records `record` as the current address.
    #[must_use]
    pub const fn observed(record: &AddressRecord) -> Self {
        Self {
            last_address: Some(record.address),
            last_changed_at: Some(record.observed_at),
            last_checked_at: Some(record.observed_at),
        }
    }

    /// Returns true if no address has been recorded yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.last_address.is_none()
    }
}

/// Result of loading state from persistent storage.
///
/// Explicitly models all valid states to avoid ambiguity:
/// - Successfully loaded previous state
/// - No previous state exists (first run)
/// - State exists but is corrupted/unreadable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// Successfully loaded previously saved state.
    Loaded(PersistedState),

    /// No state file exists (first run or explicitly deleted).
    NotFound,

    /// State file exists but could not be parsed.
    /// The watcher continues with fresh state and overwrites on next save.
    Corrupted {
        /// Reason for corruption (for logging).
        reason: String,
    },
}

impl LoadResult {
    /// Returns the loaded state, or the all-absent state for `NotFound`/`Corrupted`.
    #[must_use]
    pub fn into_state(self) -> PersistedState {
        match self {
            Self::Loaded(state) => state,
            Self::NotFound | Self::Corrupted { .. } => PersistedState::default(),
        }
    }

    /// Returns `true` if state was successfully loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Errors that can occur during state persistence operations.
///
/// Only covers write-side errors; read-side issues are modeled
/// as [`LoadResult`] variants to allow graceful degradation.
#[derive(Debug, Error)]
pub enum StateError {
    /// Failed to write the state file.
    #[error("Failed to write state file: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize state to JSON.
    #[error("Failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The blocking write task did not complete.
    #[error("State write task failed: {0}")]
    Task(#[source] tokio::task::JoinError),
}

/// Abstraction for persisting the watcher state between program runs.
///
/// Implementations should:
/// - Use atomic writes to prevent corruption from crashes
/// - Handle missing files gracefully (return `LoadResult::NotFound`)
/// - Degrade gracefully on read errors (return `LoadResult::Corrupted`)
pub trait StateStore: Send + Sync {
    /// Loads previously saved state.
    fn load(&self) -> LoadResult;

    /// Saves the state for future reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(
        &self,
        state: &PersistedState,
    ) -> impl std::future::Future<Output = Result<(), StateError>> + Send;
}

/// Mock state store for testing.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::RwLock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory [`StateStore`] whose `load` reflects the last successful `save`.
    #[derive(Debug)]
    pub struct MockStateStore {
        current: RwLock<LoadResult>,
        fail_saves: bool,
        save_calls: AtomicUsize,
    }

    impl MockStateStore {
        fn with_result(result: LoadResult) -> Self {
            Self {
                current: RwLock::new(result),
                fail_saves: false,
                save_calls: AtomicUsize::new(0),
            }
        }

        /// Creates a mock that starts with the given state.
        #[must_use]
        pub fn with_loaded(state: PersistedState) -> Self {
            Self::with_result(LoadResult::Loaded(state))
        }

        /// Creates a mock that starts with no state.
        #[must_use]
        pub fn not_found() -> Self {
            Self::with_result(LoadResult::NotFound)
        }

        /// Creates a mock that starts with a corrupted state file.
        #[must_use]
        pub fn corrupted(reason: impl Into<String>) -> Self {
            Self::with_result(LoadResult::Corrupted {
                reason: reason.into(),
            })
        }

        /// Makes every `save` fail with a write error.
        #[must_use]
        pub const fn failing_saves(mut self) -> Self {
            self.fail_saves = true;
            self
        }

        /// Returns the state `load` would currently return.
        #[must_use]
        pub fn current(&self) -> LoadResult {
            self.current.read().unwrap().clone()
        }

        /// Returns how many times `save` was called.
        #[must_use]
        pub fn save_calls(&self) -> usize {
            self.save_calls.load(Ordering::SeqCst)
        }
    }

    impl StateStore for MockStateStore {
        fn load(&self) -> LoadResult {
            self.current()
        }

        async fn save(&self, state: &PersistedState) -> Result<(), StateError> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_saves {
                return Err(StateError::Write(io::Error::other("disk full")));
            }
            *self.current.write().unwrap() = LoadResult::Loaded(*state);
            Ok(())
        }
    }
}
