//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use handlebars::Handlebars;
use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use url::Url;

use crate::monitor::{FirstObservation, SchedulePolicy};
use crate::resolver::{IpVersion, LookupProvider, ResponseFormat, default_providers};
use crate::webhook::{PayloadFormat, RetryPolicy};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::{ProviderEntry, TomlConfig};

/// Where notifications are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A webhook URL given directly.
    Webhook(Url),
    /// A Discord channel reached through the bot API.
    DiscordBot {
        /// Channel messages endpoint
        url: Url,
        /// Numeric channel ID
        channel_id: String,
    },
}

impl Destination {
    /// Returns the URL requests are sent to.
    #[must_use]
    pub const fn url(&self) -> &Url {
        match self {
            Self::Webhook(url) | Self::DiscordBot { url, .. } => url,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Webhook paths often embed tokens
            Self::Webhook(url) => {
                let origin = url.origin().ascii_serialization();
                if url.path() == "/" && url.query().is_none() {
                    write!(f, "{origin}")
                } else {
                    write!(f, "{origin}/...")
                }
            }
            Self::DiscordBot { channel_id, .. } => write!(f, "discord channel {channel_id}"),
        }
    }
}

/// Validated address lookup settings.
///
/// Separate from [`ValidatedConfig`] so `check` can run without any
/// notification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Providers tried in order
    pub providers: Vec<LookupProvider>,

    /// Per-provider timeout
    pub timeout: Duration,

    /// IP family to accept
    pub ip_version: IpVersion,
}

impl ResolverConfig {
    /// Creates validated lookup settings from CLI arguments and optional TOML config.
    ///
    /// Providers given on the command line replace the TOML list entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider entry, the timeout or the IP version is invalid.
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let providers = Self::resolve_providers(cli, toml)?;
        let timeout = Self::resolve_timeout(cli, toml)?;
        let ip_version = Self::resolve_ip_version(cli, toml)?;

        Ok(Self {
            providers,
            timeout,
            ip_version,
        })
    }

    /// Loads lookup settings from CLI and optional config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or
    /// the settings are invalid.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = load_toml(cli)?;
        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_providers(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Vec<LookupProvider>, ConfigError> {
        let cli_urls: Vec<&str> = cli
            .providers
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if !cli_urls.is_empty() {
            return cli_urls
                .into_iter()
                .map(|u| parse_provider_url(u).map(LookupProvider::text))
                .collect();
        }

        match toml.map(|t| &t.resolver.providers) {
            Some(entries) if !entries.is_empty() => entries.iter().map(parse_provider).collect(),
            _ => Ok(default_providers()),
        }
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        let seconds = cli
            .lookup_timeout
            .or_else(|| toml.and_then(|t| t.resolver.timeout))
            .unwrap_or(defaults::LOOKUP_TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "lookup_timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn resolve_ip_version(cli: &Cli, toml: Option<&TomlConfig>) -> Result<IpVersion, ConfigError> {
        if let Some(version) = cli.ip_version {
            return Ok(version.into());
        }

        toml.and_then(|t| t.resolver.ip_version.as_deref())
            .map_or(Ok(IpVersion::default()), |s| {
                parse_named(field::IP_VERSION, s)
            })
    }
}

/// Fully validated configuration ready for use by the watcher.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Address lookup settings
    pub resolver: ResolverConfig,

    /// Where notifications go (required)
    pub destination: Destination,

    /// HTTP method for notification requests
    pub method: Method,

    /// HTTP headers for notification requests (includes authorization)
    pub headers: HeaderMap,

    /// Built-in body format
    pub format: PayloadFormat,

    /// Handlebars body template (overrides `format`)
    pub body_template: Option<String>,

    /// Behaviour when nothing has been stored yet
    pub first_observation: FirstObservation,

    /// Interval and jitter between checks
    pub schedule: SchedulePolicy,

    /// Retry policy for failed deliveries
    pub retry_policy: RetryPolicy,

    /// Path to the state file
    pub state_file: PathBuf,

    /// Dry-run mode (log notifications without sending them)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = if self.body_template.is_some() {
            "template".to_string()
        } else {
            self.format.to_string()
        };

        write!(
            f,
            "Config {{ destination: {}, method: {}, body: {}, first_observation: {}, \
             providers: {}, lookup_timeout: {}s, ip_version: {}, interval: {}s, \
             jitter: {}-{}s, retry: {}x/{}s, state_file: {}, dry_run: {} }}",
            self.destination,
            self.method,
            body,
            self.first_observation,
            self.resolver.providers.len(),
            self.resolver.timeout.as_secs(),
            self.resolver.ip_version,
            self.schedule.interval.as_secs(),
            self.schedule.jitter_min.as_secs(),
            self.schedule.jitter_max.as_secs(),
            self.retry_policy.max_attempts,
            self.retry_policy.initial_delay.as_secs(),
            self.state_file.display(),
            self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments (and their environment variables) take precedence over
    /// TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Neither a URL nor complete Discord bot credentials are given
    /// - A URL is invalid
    /// - Durations are zero or jitter bounds are inverted
    /// - Header, method, format or template values are invalid
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let resolver = ResolverConfig::from_raw(cli, toml)?;

        let (destination, bot_token) = Self::resolve_destination(cli, toml)?;

        let method = Self::resolve_method(cli, toml)?;

        let mut headers = Self::resolve_headers(cli, toml)?;
        if let Some(token) = bot_token {
            let value = parse_header_value("Authorization", &format!("Bot {token}"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let format = Self::resolve_format(cli, toml)?;

        let body_template = Self::resolve_body_template(cli, toml)?;

        let first_observation = Self::resolve_first_observation(cli, toml)?;

        let schedule = Self::resolve_schedule(cli, toml)?;

        let retry_policy = Self::build_retry_policy(cli, toml)?;

        let state_file = Self::resolve_state_file(cli, toml);

        Ok(Self {
            resolver,
            destination,
            method,
            headers,
            format,
            body_template,
            first_observation,
            schedule,
            retry_policy,
            state_file,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = load_toml(cli)?;
        Self::from_raw(cli, toml.as_ref())
    }

    /// Resolves the destination, returning the bot token separately so it
    /// only ends up in the headers.
    fn resolve_destination(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<(Destination, Option<String>), ConfigError> {
        let notify = toml.map(|t| &t.notify);

        if let Some(url_str) = non_empty(cli.url.as_deref())
            .or_else(|| non_empty(notify.and_then(|n| n.url.as_deref())))
        {
            return parse_url(url_str).map(|url| (Destination::Webhook(url), None));
        }

        let token = non_empty(cli.discord_token.as_deref())
            .or_else(|| non_empty(notify.and_then(|n| n.discord_token.as_deref())));
        let channel = non_empty(cli.channel_id.as_deref())
            .or_else(|| non_empty(notify.and_then(|n| n.channel_id.as_deref())));

        match (token, channel) {
            (Some(token), Some(channel)) => {
                if !channel.chars().all(|c| c.is_ascii_digit()) {
                    return Err(ConfigError::InvalidChannelId(channel.to_string()));
                }
                let url = parse_url(&format!(
                    "{}/channels/{channel}/messages",
                    defaults::DISCORD_API_BASE
                ))?;
                let destination = Destination::DiscordBot {
                    url,
                    channel_id: channel.to_string(),
                };
                Ok((destination, Some(token.to_string())))
            }
            (Some(_), None) => Err(ConfigError::missing(
                field::CHANNEL_ID,
                "Use --channel-id, set NOTIFY_CHANNEL_ID, or set notify.channel_id in config file",
            )),
            (None, Some(_)) => Err(ConfigError::missing(
                field::DISCORD_TOKEN,
                "Use --discord-token, set DISCORD_TOKEN, or set notify.discord_token in config file",
            )),
            (None, None) => Err(ConfigError::missing(
                field::URL,
                "Use --url, set IP_WATCHER_WEBHOOK_URL, or configure Discord bot credentials",
            )),
        }
    }

    fn resolve_method(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Method, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let method_str = cli
            .method
            .as_deref()
            .or_else(|| toml.and_then(|t| t.notify.method.as_deref()))
            .unwrap_or(defaults::METHOD);

        method_str
            .parse::<Method>()
            .map_err(|_| ConfigError::InvalidMethod(method_str.to_string()))
    }

    fn resolve_headers(cli: &Cli, toml: Option<&TomlConfig>) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();

        // TOML first so CLI can override
        if let Some(toml) = toml {
            for (name, value) in &toml.notify.headers {
                let header_name = parse_header_name(name)?;
                let header_value = parse_header_value(name, value)?;
                headers.insert(header_name, header_value);
            }
        }

        for header_str in &cli.headers {
            let (name, value) = parse_header_string(header_str)?;
            let header_name = parse_header_name(&name)?;
            let header_value = parse_header_value(&name, &value)?;
            headers.insert(header_name, header_value);
        }

        let bearer = non_empty(cli.bearer.as_deref())
            .or_else(|| non_empty(toml.and_then(|t| t.notify.bearer.as_deref())));

        if let Some(token) = bearer {
            let header_value = parse_header_value("Authorization", &format!("Bearer {token}"))?;
            headers.insert(AUTHORIZATION, header_value);
        }

        Ok(headers)
    }

    fn resolve_format(cli: &Cli, toml: Option<&TomlConfig>) -> Result<PayloadFormat, ConfigError> {
        if let Some(format) = cli.format {
            return Ok(format.into());
        }

        toml.and_then(|t| t.notify.format.as_deref())
            .map_or(Ok(PayloadFormat::default()), |s| {
                parse_named(field::FORMAT, s)
            })
    }

    fn resolve_body_template(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<String>, ConfigError> {
        let template = cli
            .body_template
            .clone()
            .or_else(|| toml.and_then(|t| t.notify.body_template.clone()));

        if let Some(ref tmpl) = template {
            Self::validate_template(tmpl)?;
        }

        Ok(template)
    }

    fn validate_template(template: &str) -> Result<(), ConfigError> {
        let hbs = Handlebars::new();
        // Syntax check: rendering against an empty context compiles the template
        hbs.render_template(template, &serde_json::json!({}))
            .map_err(|e| ConfigError::InvalidTemplate {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn resolve_first_observation(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<FirstObservation, ConfigError> {
        if let Some(policy) = cli.first_observation {
            return Ok(policy.into());
        }

        toml.and_then(|t| t.notify.first_observation.as_deref())
            .map_or(Ok(FirstObservation::default()), |s| {
                parse_named(field::FIRST_OBSERVATION, s)
            })
    }

    fn resolve_schedule(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<SchedulePolicy, ConfigError> {
        let monitor = toml.map(|t| &t.monitor);

        // Priority: CLI explicit > TOML > default
        let interval = cli
            .interval
            .or_else(|| monitor.and_then(|m| m.interval))
            .unwrap_or(defaults::INTERVAL_SECS);

        let jitter_min = cli
            .jitter_min
            .or_else(|| monitor.and_then(|m| m.jitter_min))
            .unwrap_or(defaults::JITTER_MIN_SECS);

        let jitter_max = cli
            .jitter_max
            .or_else(|| monitor.and_then(|m| m.jitter_max))
            .unwrap_or(defaults::JITTER_MAX_SECS);

        if interval == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "interval",
                reason: "must be greater than 0".to_string(),
            });
        }

        if jitter_min > jitter_max {
            return Err(ConfigError::InvalidDuration {
                field: "jitter",
                reason: format!("jitter_min ({jitter_min}s) must be <= jitter_max ({jitter_max}s)"),
            });
        }

        Ok(SchedulePolicy::new(Duration::from_secs(interval))
            .with_jitter(Duration::from_secs(jitter_min), Duration::from_secs(jitter_max)))
    }

    fn build_retry_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetryPolicy, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        // Priority: CLI explicit > TOML > default
        let max_attempts = cli
            .retry_max
            .or_else(|| retry.and_then(|r| r.max_attempts))
            .unwrap_or(defaults::RETRY_MAX_ATTEMPTS);

        let initial_delay_secs = cli
            .retry_delay
            .or_else(|| retry.and_then(|r| r.initial_delay))
            .unwrap_or(defaults::RETRY_INITIAL_DELAY_SECS);

        let max_delay_secs = retry
            .and_then(|r| r.max_delay)
            .unwrap_or(defaults::RETRY_MAX_DELAY_SECS);

        let multiplier = retry
            .and_then(|r| r.multiplier)
            .unwrap_or(defaults::RETRY_MULTIPLIER);

        if max_attempts == 0 {
            return Err(ConfigError::InvalidRetry(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if initial_delay_secs == 0 {
            return Err(ConfigError::InvalidRetry(
                "initial_delay must be greater than 0".to_string(),
            ));
        }

        if multiplier <= 0.0 || !multiplier.is_finite() {
            return Err(ConfigError::InvalidRetry(
                "multiplier must be a positive finite number".to_string(),
            ));
        }

        if max_delay_secs < initial_delay_secs {
            return Err(ConfigError::InvalidRetry(format!(
                "max_delay ({max_delay_secs}s) must be >= initial_delay ({initial_delay_secs}s)"
            )));
        }

        Ok(RetryPolicy::new()
            .with_max_attempts(max_attempts)
            .with_initial_delay(Duration::from_secs(initial_delay_secs))
            .with_max_delay(Duration::from_secs(max_delay_secs))
            .with_multiplier(multiplier))
    }

    fn resolve_state_file(cli: &Cli, toml: Option<&TomlConfig>) -> PathBuf {
        cli.state_file
            .clone()
            .or_else(|| toml.and_then(|t| t.monitor.state_file.as_ref().map(PathBuf::from)))
            .map_or_else(defaults::state_file, |p| expand_tilde(&p))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~` component, or when the home directory is
/// unknown, are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

// Helper functions

fn load_toml(cli: &Cli) -> Result<Option<TomlConfig>, ConfigError> {
    cli.config
        .as_ref()
        .map(|path| TomlConfig::load(&expand_tilde(path)))
        .transpose()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_named<T: FromStr<Err = String>>(field: &'static str, s: &str) -> Result<T, ConfigError> {
    s.parse::<T>().map_err(|reason| ConfigError::invalid(field, s, reason))
}

fn parse_url(s: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(s).map_err(|e| ConfigError::InvalidUrl {
        url: s.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: s.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }

    Ok(url)
}

fn parse_provider_url(s: &str) -> Result<Url, ConfigError> {
    parse_url(s).map_err(|e| match e {
        ConfigError::InvalidUrl { url, reason } => ConfigError::InvalidProvider { url, reason },
        other => other,
    })
}

fn parse_provider(entry: &ProviderEntry) -> Result<LookupProvider, ConfigError> {
    let url = parse_provider_url(&entry.url)?;
    let invalid = |reason: &str| ConfigError::InvalidProvider {
        url: entry.url.clone(),
        reason: reason.to_string(),
    };

    let format = entry.format.as_deref().unwrap_or("text").to_lowercase();
    match format.as_str() {
        "text" => {
            if entry.field.is_some() {
                return Err(invalid("'field' is only valid with format = \"json\""));
            }
            Ok(LookupProvider::text(url))
        }
        "json" => {
            let field = entry
                .field
                .as_deref()
                .unwrap_or(ResponseFormat::DEFAULT_JSON_FIELD)
                .trim();
            if field.is_empty() || field.split('.').any(str::is_empty) {
                return Err(invalid("JSON field path must not be empty"));
            }
            Ok(LookupProvider::json(url, field))
        }
        _ => Err(invalid("format must be \"text\" or \"json\"")),
    }
}

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    // "Key=Value" first, then "Key: Value"
    if let Some((name, value)) = s.split_once('=') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    if let Some((name, value)) = s.split_once(':') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    Err(ConfigError::InvalidHeader {
        value: s.to_string(),
    })
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
