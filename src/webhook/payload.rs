//! Notification message text and request body rendering.

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use handlebars::Handlebars;
use serde::Serialize;

use super::DeliveryError;
use crate::monitor::NotificationEvent;

/// Built-in request body shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    /// `{"content": message}`, accepted by Discord webhooks and the bot API.
    #[default]
    Discord,
    /// `{"text": message}`, accepted by Slack incoming webhooks.
    Slack,
    /// The full event as a JSON object.
    Json,
    /// The message as `text/plain`.
    Text,
}

impl PayloadFormat {
    /// Content type sent unless a header overrides it.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Discord | Self::Slack | Self::Json => "application/json",
        }
    }

    /// Renders the body for `event`.
    #[must_use]
    pub fn render(self, event: &NotificationEvent) -> Vec<u8> {
        let message = describe(event);
        let body = match self {
            Self::Discord => serde_json::json!({ "content": message }).to_string(),
            Self::Slack => serde_json::json!({ "text": message }).to_string(),
            Self::Json => serde_json::json!({
                "message": message,
                "previous_address": event.previous_address.map(|a| a.to_string()),
                "new_address": event.new_address.to_string(),
                "detected_at": format_timestamp(event.detected_at),
                "first_observation": event.is_first_observation(),
            })
            .to_string(),
            Self::Text => message,
        };
        body.into_bytes()
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discord => "discord",
            Self::Slack => "slack",
            Self::Json => "json",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

impl FromStr for PayloadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "discord" => Ok(Self::Discord),
            "slack" => Ok(Self::Slack),
            "json" => Ok(Self::Json),
            "text" | "plain" => Ok(Self::Text),
            _ => Err(format!(
                "expected discord, slack, json, or text, got '{s}'"
            )),
        }
    }
}

/// Human-readable description of an event.
///
/// ```
/// use std::time::{Duration, SystemTime};
/// use ip_watcher::monitor::NotificationEvent;
/// use ip_watcher::webhook::describe;
///
/// let event = NotificationEvent {
///     previous_address: Some("203.0.113.5".parse().unwrap()),
///     new_address: "203.0.113.9".parse().unwrap(),
///     detected_at: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
/// };
/// assert_eq!(
///     describe(&event),
///     "Public IP changed from 203.0.113.5 to 203.0.113.9 (at 2023-11-14T22:13:20Z)"
/// );
/// ```
#[must_use]
pub fn describe(event: &NotificationEvent) -> String {
    let at = format_timestamp(event.detected_at);
    match event.previous_address {
        Some(previous) => format!(
            "Public IP changed from {previous} to {} (at {at})",
            event.new_address
        ),
        None => format!(
            "Watcher started - current public IP is {} (at {at})",
            event.new_address
        ),
    }
}

/// Formats a timestamp as RFC 3339 UTC with second precision.
#[must_use]
pub fn format_timestamp(at: SystemTime) -> String {
    DateTime::<Utc>::from(at).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Variables available to body templates.
#[derive(Serialize)]
struct TemplateData {
    message: String,
    previous_address: Option<String>,
    new_address: String,
    detected_at: String,
    detected_at_unix: u64,
    first_observation: bool,
}

impl From<&NotificationEvent> for TemplateData {
    fn from(event: &NotificationEvent) -> Self {
        // Pre-epoch clocks render as 0
        let detected_at_unix = event
            .detected_at
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());

        Self {
            message: describe(event),
            previous_address: event.previous_address.map(|a| a.to_string()),
            new_address: event.new_address.to_string(),
            detected_at: format_timestamp(event.detected_at),
            detected_at_unix,
            first_observation: event.is_first_observation(),
        }
    }
}

/// Renders a Handlebars body template for `event`.
///
/// Values are inserted verbatim; no HTML escaping is applied.
///
/// # Errors
///
/// Returns [`DeliveryError::Template`] if the template is invalid.
pub fn render_template(template: &str, event: &NotificationEvent) -> Result<Vec<u8>, DeliveryError> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .render_template(template, &TemplateData::from(event))
        .map(String::into_bytes)
        .map_err(|e| DeliveryError::Template(e.to_string()))
}
