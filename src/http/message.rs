//! HTTP request/response types and client trait.

use std::sync::Arc;
use std::time::Duration;

use super::HttpError;

/// An outgoing request: a provider lookup or a notification delivery.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: http::Method,
    pub url: url::Url,
    pub headers: http::HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Bound on the whole exchange; `None` leaves it to the client.
    pub timeout: Option<Duration>,
    /// Largest response body accepted, in bytes; `None` means unbounded.
    pub max_body: Option<usize>,
}

impl HttpRequest {
    /// Creates a request with no headers, body, timeout or body limit.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: http::HeaderMap::new(),
            body: None,
            timeout: None,
            max_body: None,
        }
    }

    /// Shorthand for a bodiless GET, as sent to lookup providers.
    #[must_use]
    pub fn get(url: url::Url) -> Self {
        Self::new(http::Method::GET, url)
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Rejects responses whose body is longer than `limit` bytes.
    #[must_use]
    pub const fn with_max_body(mut self, limit: usize) -> Self {
        self.max_body = Some(limit);
        self
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: http::StatusCode,
    pub headers: http::HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub const fn new(status: http::StatusCode, headers: http::HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// True for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The body as UTF-8, or `None` if it is not valid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Sends [`HttpRequest`]s. Implemented by [`ReqwestClient`] in production
/// and by scripted mocks in tests.
///
/// [`ReqwestClient`]: super::ReqwestClient
pub trait HttpClient: Send + Sync {
    /// Sends `req` and buffers the response. Non-2xx statuses are not errors.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, timeout or an unusable URL.
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send;
}

impl<T: HttpClient> HttpClient for Arc<T> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).request(req).await
    }
}
