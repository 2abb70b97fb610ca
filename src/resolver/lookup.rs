//! Resolver trait and the multi-provider HTTP implementation.

use std::time::Duration;

use crate::http::{HttpClient, HttpError, HttpRequest};
use crate::monitor::AddressRecord;
use crate::time::{Clock, SystemClock};

use super::{IpVersion, LookupProvider, ProviderError, ProviderFailure, ResolveError};

/// Largest provider response accepted. An address answer is a few dozen bytes.
pub(super) const MAX_BODY_BYTES: usize = 4 * 1024;

/// Trait for determining the host's current public address.
///
/// Implementations must not retry on their own beyond trying alternative
/// sources; the caller owns the retry policy for total failure.
pub trait AddressResolver: Send + Sync {
    /// Resolves the current public address.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if no source produced a valid address.
    fn resolve(&self) -> impl std::future::Future<Output = Result<AddressRecord, ResolveError>> + Send;
}

/// Resolver that queries HTTP lookup providers in order.
///
/// Each provider gets one GET request bounded by the per-provider timeout.
/// Timeouts, transport errors, non-2xx statuses, malformed bodies and
/// addresses of the wrong family all fall through to the next provider.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `C`: The clock used to timestamp observations (defaults to [`SystemClock`])
#[derive(Debug)]
pub struct HttpResolver<H, C = SystemClock> {
    client: H,
    clock: C,
    providers: Vec<LookupProvider>,
    timeout: Duration,
    ip_version: IpVersion,
}

impl<H> HttpResolver<H, SystemClock> {
    /// Default per-provider timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a resolver with the default timeout, accepting IPv4 only.
    #[must_use]
    pub const fn new(client: H, providers: Vec<LookupProvider>) -> Self {
        Self {
            client,
            clock: SystemClock,
            providers,
            timeout: Self::DEFAULT_TIMEOUT,
            ip_version: IpVersion::V4,
        }
    }
}

impl<H, C> HttpResolver<H, C> {
    /// Sets a custom clock for observation timestamps.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> HttpResolver<H, C2> {
        HttpResolver {
            client: self.client,
            clock,
            providers: self.providers,
            timeout: self.timeout,
            ip_version: self.ip_version,
        }
    }

    /// Sets the per-provider timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Restricts accepted addresses to one IP family.
    #[must_use]
    pub const fn with_ip_version(mut self, version: IpVersion) -> Self {
        self.ip_version = version;
        self
    }

    /// Returns the configured providers in lookup order.
    #[must_use]
    pub fn providers(&self) -> &[LookupProvider] {
        &self.providers
    }

    /// Returns the per-provider timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<H: HttpClient, C: Clock> HttpResolver<H, C> {
    /// Queries a single provider.
    async fn query(&self, provider: &LookupProvider) -> Result<std::net::IpAddr, ProviderError> {
        let request = HttpRequest::get(provider.url.clone())
            .with_timeout(self.timeout)
            .with_max_body(MAX_BODY_BYTES);

        // The request timeout is enforced by the client; this bounds clients
        // that ignore it.
        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| ProviderError::Http(HttpError::Timeout))??;

        if !response.is_success() {
            return Err(ProviderError::Status(response.status));
        }

        if response.body.len() > MAX_BODY_BYTES {
            return Err(ProviderError::Http(HttpError::BodyTooLarge {
                limit: MAX_BODY_BYTES,
            }));
        }

        let body = response
            .body_text()
            .ok_or_else(|| ProviderError::Malformed("body is not valid UTF-8".to_string()))?;

        provider.parse_body(body, self.ip_version)
    }
}

impl<H: HttpClient, C: Clock> AddressResolver for HttpResolver<H, C> {
    async fn resolve(&self) -> Result<AddressRecord, ResolveError> {
        if self.providers.is_empty() {
            return Err(ResolveError::NoProviders);
        }

        let mut failures = Vec::new();

        for provider in &self.providers {
            match self.query(provider).await {
                Ok(address) => {
                    tracing::debug!("Resolved {address} via {}", provider.url);
                    return Ok(AddressRecord::new(address, self.clock.now()));
                }
                Err(error) => {
                    tracing::debug!("Lookup provider {} failed: {error}", provider.url);
                    failures.push(ProviderFailure {
                        url: provider.url.clone(),
                        error,
                    });
                }
            }
        }

        Err(ResolveError::AllProvidersUnreachable { failures })
    }
}
