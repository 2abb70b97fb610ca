//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.
//! Options marked with an environment variable can also be set that way;
//! an explicit flag wins over the variable.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use super::defaults;
use crate::monitor::FirstObservation;
use crate::resolver::IpVersion;
use crate::webhook::PayloadFormat;

/// ip-watcher: public IP change notifier
///
/// Periodically resolves this host's public IP address and notifies a
/// webhook or Discord channel when it changes.
#[derive(Debug, Parser)]
#[command(name = "ip-watcher")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (default: watch)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Notification URL (webhook endpoint)
    #[arg(long, env = "IP_WATCHER_WEBHOOK_URL")]
    pub url: Option<String>,

    /// Discord bot token, used with --channel-id when no URL is given
    #[arg(long = "discord-token", env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: Option<String>,

    /// Discord channel ID for bot delivery
    #[arg(long = "channel-id", env = "NOTIFY_CHANNEL_ID")]
    pub channel_id: Option<String>,

    /// HTTP method for notification requests
    #[arg(long)]
    pub method: Option<String>,

    /// HTTP headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V")]
    pub headers: Vec<String>,

    /// Bearer token for Authorization header
    #[arg(long, env = "IP_WATCHER_BEARER", hide_env_values = true)]
    pub bearer: Option<String>,

    /// Request body format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Handlebars body template (overrides --format)
    #[arg(long = "body-template")]
    pub body_template: Option<String>,

    /// What to do when no address has been stored yet
    #[arg(long = "first-observation", value_enum)]
    pub first_observation: Option<FirstObservationArg>,

    /// Lookup provider URL returning the address as plain text (can be specified multiple times)
    #[arg(
        long = "provider",
        value_name = "URL",
        env = "IP_WATCHER_PROVIDERS",
        value_delimiter = ',',
        global = true
    )]
    pub providers: Vec<String>,

    /// Per-provider lookup timeout in seconds
    #[arg(long = "lookup-timeout", global = true)]
    pub lookup_timeout: Option<u64>,

    /// IP family to track
    #[arg(long = "ip-version", value_enum, global = true)]
    pub ip_version: Option<IpVersionArg>,

    /// Seconds between checks
    #[arg(long, env = "CHECK_INTERVAL")]
    pub interval: Option<u64>,

    /// Minimum random delay added to each interval, in seconds
    #[arg(long = "jitter-min")]
    pub jitter_min: Option<u64>,

    /// Maximum random delay added to each interval, in seconds
    #[arg(long = "jitter-max")]
    pub jitter_max: Option<u64>,

    /// Maximum number of delivery attempts
    #[arg(long = "retry-max")]
    pub retry_max: Option<u32>,

    /// Initial retry delay in seconds
    #[arg(long = "retry-delay")]
    pub retry_delay: Option<u64>,

    /// Path to configuration file
    #[arg(long, short, env = "IP_WATCHER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Path to the state file holding the last known address
    #[arg(long = "state-file", env = "IP_WATCHER_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Test mode - log notifications without sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for ip-watcher
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE_NAME)]
        output: PathBuf,
    },
    /// Resolve and print the current public address once
    Check,
}

/// Payload format argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// `{"content": ...}` for Discord
    Discord,
    /// `{"text": ...}` for Slack
    Slack,
    /// Structured JSON event
    Json,
    /// Plain text message
    Text,
}

impl From<FormatArg> for PayloadFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Discord => Self::Discord,
            FormatArg::Slack => Self::Slack,
            FormatArg::Json => Self::Json,
            FormatArg::Text => Self::Text,
        }
    }
}

/// IP version argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IpVersionArg {
    /// Track IPv4 only
    #[value(name = "ipv4")]
    V4,
    /// Track IPv6 only
    #[value(name = "ipv6")]
    V6,
    /// Accept whatever the provider reports
    #[value(name = "any")]
    Any,
}

impl From<IpVersionArg> for IpVersion {
    fn from(arg: IpVersionArg) -> Self {
        match arg {
            IpVersionArg::V4 => Self::V4,
            IpVersionArg::V6 => Self::V6,
            IpVersionArg::Any => Self::Any,
        }
    }
}

/// First-observation policy argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FirstObservationArg {
    /// Send a startup notification
    Notify,
    /// Record silently
    Seed,
}

impl From<FirstObservationArg> for FirstObservation {
    fn from(arg: FirstObservationArg) -> Self {
        match arg {
            FirstObservationArg::Notify => Self::Notify,
            FirstObservationArg::Seed => Self::Seed,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }

    /// Returns true if this is the check command.
    #[must_use]
    pub const fn is_check(&self) -> bool {
        matches!(self.command, Some(Command::Check))
    }
}
