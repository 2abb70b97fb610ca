//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::path::PathBuf;

/// Default HTTP method for notification requests.
pub const METHOD: &str = "POST";

/// Default polling interval in seconds.
pub const INTERVAL_SECS: u64 = 300;

/// Default lower jitter bound in seconds.
pub const JITTER_MIN_SECS: u64 = 0;

/// Default upper jitter bound in seconds.
pub const JITTER_MAX_SECS: u64 = 30;

/// Default per-provider lookup timeout in seconds.
pub const LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Default maximum number of delivery attempts.
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// Default initial retry delay in seconds.
pub const RETRY_INITIAL_DELAY_SECS: u64 = 2;

/// Default maximum retry delay in seconds.
pub const RETRY_MAX_DELAY_SECS: u64 = 60;

/// Default retry backoff multiplier.
pub const RETRY_MULTIPLIER: f64 = 2.0;

/// Application directory under the platform data directory.
pub const APP_DIR: &str = "ip-watcher";

/// File name of the state file.
pub const STATE_FILE_NAME: &str = "ip-watcher-state.json";

/// Default file name written by `init`.
pub const CONFIG_FILE_NAME: &str = "ip-watcher.toml";

/// Discord REST API base for bot channel delivery.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Default state file location.
///
/// Lives in the platform local-data directory; falls back to the working
/// directory when that cannot be determined.
#[must_use]
pub fn state_file() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(STATE_FILE_NAME),
        |dir| dir.join(APP_DIR).join(STATE_FILE_NAME),
    )
}
