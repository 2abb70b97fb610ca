//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Notification delivery section
    #[serde(default)]
    pub notify: NotifySection,

    /// Address lookup section
    #[serde(default)]
    pub resolver: ResolverSection,

    /// Polling loop section
    #[serde(default)]
    pub monitor: MonitorSection,

    /// Retry policy section
    #[serde(default)]
    pub retry: RetrySection,
}

/// Notification delivery section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifySection {
    /// Webhook URL
    pub url: Option<String>,

    /// Discord bot token (used with `channel_id` when `url` is absent)
    pub discord_token: Option<String>,

    /// Discord channel ID
    pub channel_id: Option<String>,

    /// HTTP method (default: POST)
    pub method: Option<String>,

    /// HTTP headers as key-value pairs
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Bearer token for Authorization header
    pub bearer: Option<String>,

    /// Payload format: "discord", "slack", "json" or "text"
    pub format: Option<String>,

    /// Handlebars body template
    pub body_template: Option<String>,

    /// "notify" or "seed"
    pub first_observation: Option<String>,
}

/// Address lookup section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverSection {
    /// Providers tried in order
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,

    /// Per-provider timeout in seconds
    pub timeout: Option<u64>,

    /// IP family: "ipv4", "ipv6" or "any"
    pub ip_version: Option<String>,
}

/// One `[[resolver.providers]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderEntry {
    /// Endpoint URL
    pub url: String,

    /// "text" (default) or "json"
    pub format: Option<String>,

    /// JSON field path (default: "ip")
    pub field: Option<String>,
}

/// Polling loop section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    /// Seconds between checks
    pub interval: Option<u64>,

    /// Minimum jitter in seconds
    pub jitter_min: Option<u64>,

    /// Maximum jitter in seconds
    pub jitter_max: Option<u64>,

    /// Path to the state file
    pub state_file: Option<String>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Maximum number of delivery attempts
    pub max_attempts: Option<u32>,

    /// Initial retry delay in seconds
    pub initial_delay: Option<u64>,

    /// Maximum retry delay in seconds
    pub max_delay: Option<u64>,

    /// Backoff multiplier
    pub multiplier: Option<f64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# ip-watcher configuration file
#
# Every setting can also be given on the command line; command-line flags and
# their environment variables take precedence over this file.

[notify]
# Webhook URL (or set IP_WATCHER_WEBHOOK_URL)
# url = "https://discord.com/api/webhooks/123/abc"

# Discord bot delivery, used when no url is set
# (or set DISCORD_TOKEN and NOTIFY_CHANNEL_ID)
# discord_token = "your-bot-token"
# channel_id = "123456789012345678"

# HTTP method (default: POST)
# method = "POST"

# HTTP headers
# [notify.headers]
# X-Custom-Header = "value"

# Bearer token for Authorization header
# bearer = "your-token-here"

# Payload format: "discord" (default), "slack", "json" or "text"
# format = "discord"

# Handlebars body template (overrides format)
# Available variables: {{message}}, {{previous_address}}, {{new_address}},
# {{detected_at}}, {{detected_at_unix}}, {{first_observation}}
# body_template = '{"ip": "{{new_address}}", "was": "{{previous_address}}"}'

# On the very first run: "notify" (default) sends a startup message,
# "seed" records the address silently
# first_observation = "notify"

[resolver]
# Per-provider timeout in seconds (default: 10)
# timeout = 10

# IP family to track: "ipv4", "ipv6" or "any" (default: ipv4)
# ip_version = "ipv4"

# Lookup providers, tried in order (default: ipify, ipv4.icanhazip, v4.ident.me)
# [[resolver.providers]]
# url = "https://api.ipify.org"
#
# [[resolver.providers]]
# url = "https://api.ipify.org?format=json"
# format = "json"
# field = "ip"

[monitor]
# Seconds between checks (default: 300)
interval = 300

# Random delay added to each interval, in seconds (default: 0 to 30)
# jitter_min = 0
# jitter_max = 30

# State file (default: ip-watcher/ip-watcher-state.json in the local data directory)
# state_file = "~/.local/share/ip-watcher/ip-watcher-state.json"

[retry]
# Maximum number of delivery attempts (default: 3)
# max_attempts = 3

# Initial retry delay in seconds (default: 2)
# initial_delay = 2

# Maximum retry delay in seconds (default: 60)
# max_delay = 60

# Backoff multiplier (default: 2.0)
# multiplier = 2.0
"#
    .to_string()
}
