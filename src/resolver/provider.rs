//! Lookup provider descriptions and response parsing.

use std::borrow::Cow;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use super::ProviderError;

/// Which IP family the watcher tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpVersion {
    /// IPv4 addresses only
    #[default]
    V4,
    /// IPv6 addresses only
    V6,
    /// Whatever the provider reports
    Any,
}

impl IpVersion {
    /// Returns true if `address` belongs to this family.
    #[must_use]
    pub const fn matches(self, address: &IpAddr) -> bool {
        match self {
            Self::V4 => address.is_ipv4(),
            Self::V6 => address.is_ipv6(),
            Self::Any => true,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "IPv4"),
            Self::V6 => write!(f, "IPv6"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl FromStr for IpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ipv4" | "v4" | "4" => Ok(Self::V4),
            "ipv6" | "v6" | "6" => Ok(Self::V6),
            "any" | "both" | "all" => Ok(Self::Any),
            _ => Err(format!("expected ipv4, ipv6, or any, got '{s}'")),
        }
    }
}

/// How a provider encodes the address in its response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFormat {
    /// The whole body, trimmed, is the address.
    Text,
    /// The body is JSON; the address is the string at a dot-separated path.
    Json {
        /// Path such as `ip` or `data.address`; numeric segments index arrays.
        field: String,
    },
}

impl ResponseFormat {
    /// The field most JSON lookup services use.
    pub const DEFAULT_JSON_FIELD: &'static str = "ip";

    /// JSON format reading the default `ip` field.
    #[must_use]
    pub fn json() -> Self {
        Self::Json {
            field: Self::DEFAULT_JSON_FIELD.to_string(),
        }
    }

    /// Extracts the address text from a response body.
    fn extract<'a>(&self, body: &'a str) -> Result<Cow<'a, str>, ProviderError> {
        match self {
            Self::Text => Ok(Cow::Borrowed(body.trim())),
            Self::Json { field } => {
                let value: serde_json::Value = serde_json::from_str(body)
                    .map_err(|e| ProviderError::Malformed(format!("invalid JSON: {e}")))?;

                let mut node = &value;
                for segment in field.split('.') {
                    let next = match node {
                        serde_json::Value::Array(items) => {
                            segment.parse::<usize>().ok().and_then(|i| items.get(i))
                        }
                        _ => node.get(segment),
                    };
                    node = next.ok_or_else(|| {
                        ProviderError::Malformed(format!("field '{field}' not found"))
                    })?;
                }

                node.as_str()
                    .map(|s| Cow::Owned(s.trim().to_string()))
                    .ok_or_else(|| {
                        ProviderError::Malformed(format!("field '{field}' is not a string"))
                    })
            }
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json { field } => write!(f, "json({field})"),
        }
    }
}

/// One external address-lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupProvider {
    /// Endpoint queried with a GET request.
    pub url: url::Url,
    /// How to read the response body.
    pub format: ResponseFormat,
}

impl LookupProvider {
    /// Creates a provider returning the address as plain text.
    #[must_use]
    pub const fn text(url: url::Url) -> Self {
        Self {
            url,
            format: ResponseFormat::Text,
        }
    }

    /// Creates a provider returning JSON with the address at `field`.
    #[must_use]
    pub fn json(url: url::Url, field: impl Into<String>) -> Self {
        Self {
            url,
            format: ResponseFormat::Json {
                field: field.into(),
            },
        }
    }

    /// Parses a response body into an address of the requested family.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Malformed`] if the body holds no valid address,
    /// or [`ProviderError::WrongFamily`] if the address is of the other family.
    pub fn parse_body(&self, body: &str, version: IpVersion) -> Result<IpAddr, ProviderError> {
        let text = self.format.extract(body)?;

        let address = text.parse::<IpAddr>().map_err(|_| {
            ProviderError::Malformed(format!("'{}' is not an IP address", truncate(&text)))
        })?;

        if !version.matches(&address) {
            return Err(ProviderError::WrongFamily {
                address,
                expected: version,
            });
        }

        Ok(address)
    }
}

impl fmt::Display for LookupProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.url, self.format)
    }
}

/// Endpoints used when none are configured. All answer over IPv4 only.
const DEFAULT_PROVIDER_URLS: &[&str] = &[
    "https://api.ipify.org",
    "https://ipv4.icanhazip.com",
    "https://v4.ident.me",
];

/// Returns the built-in provider list (all plain text).
#[must_use]
pub fn default_providers() -> Vec<LookupProvider> {
    DEFAULT_PROVIDER_URLS
        .iter()
        .filter_map(|u| url::Url::parse(u).ok())
        .map(LookupProvider::text)
        .collect()
}

/// Keeps error messages readable when a provider returns an HTML page.
fn truncate(text: &str) -> String {
    const MAX: usize = 64;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{head}...")
    }
}
