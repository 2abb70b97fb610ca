//! Error types for address resolution.

use std::fmt;
use std::net::IpAddr;

use thiserror::Error;

use crate::http::HttpError;

use super::IpVersion;

/// Why a single lookup provider failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request itself failed (connection, timeout, bad URL).
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The provider answered with a non-2xx status.
    #[error("Unexpected status {0}")]
    Status(http::StatusCode),

    /// The body did not contain a usable address.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The address is not of the requested family.
    #[error("Expected {expected} address, got {address}")]
    WrongFamily {
        /// The address the provider returned
        address: IpAddr,
        /// The configured family
        expected: IpVersion,
    },
}

/// A provider failure tagged with the provider URL.
#[derive(Debug)]
pub struct ProviderFailure {
    /// The provider endpoint.
    pub url: url::Url,
    /// What went wrong.
    pub error: ProviderError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.error)
    }
}

/// Error type for a complete resolution attempt.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every configured provider failed.
    #[error("All lookup providers failed: {}", join_failures(.failures))]
    AllProvidersUnreachable {
        /// One entry per provider, in the order they were tried.
        failures: Vec<ProviderFailure>,
    },

    /// The resolver has no providers to ask.
    #[error("No lookup providers configured")]
    NoProviders,
}

fn join_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
