//! Configuration layer for ip-watcher.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`], [`ResolverConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - flags, or their environment variables
//!    (`IP_WATCHER_WEBHOOK_URL`, `DISCORD_TOKEN`, `NOTIFY_CHANNEL_ID`,
//!    `CHECK_INTERVAL`, ...). A `.env` file is loaded at startup.
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! A notification destination is required for the watcher: either a URL, or
//! a Discord bot token together with a channel ID. A URL wins when both are
//! present.
//!
//! Lookup providers given with `--provider` **replace** the TOML list
//! entirely (not merged); command-line providers are always plain text.
//!
//! # CLI-Only vs TOML-Only Options
//!
//! Some options are TOML-only:
//! - `retry.max_delay` (default: 60s) - Maximum retry delay
//! - `retry.multiplier` (default: 2.0) - Exponential backoff multiplier
//! - JSON lookup providers (`[[resolver.providers]]` with `format = "json"`)

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod toml_tests;
#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command, FirstObservationArg, FormatArg, IpVersionArg};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{Destination, ResolverConfig, ValidatedConfig, expand_tilde, write_default_config};
