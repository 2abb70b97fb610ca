//! Tests for validated configuration.

use http::Method;

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::{ResolverConfig, ValidatedConfig};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["ip-watcher"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

/// CLI args with a webhook URL plus `extra`
fn with_url(extra: &[&str]) -> Cli {
    let mut args = vec!["--url", "https://example.com/hook"];
    args.extend(extra);
    cli(&args)
}

mod precedence_tests;
mod resolver_tests;
