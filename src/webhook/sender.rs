//! Notifier trait and HTTP implementation.

use std::time::Duration;

use crate::http::{HttpClient, HttpError, HttpRequest};
use crate::monitor::NotificationEvent;
use crate::time::{Sleeper, TokioSleeper};

use super::{DeliveryError, NotifyError, PayloadFormat, RetryPolicy, describe, render_template};

/// Trait for delivering address-change notifications.
///
/// Implementations handle retries internally, returning
/// [`NotifyError::DeliveryFailed`] when all attempts fail.
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the notification could not be delivered.
    fn notify(
        &self,
        event: &NotificationEvent,
    ) -> impl std::future::Future<Output = Result<(), NotifyError>> + Send;
}

/// HTTP notifier with retry support.
///
/// Sends one request per event. The body is either a built-in
/// [`PayloadFormat`] or a Handlebars template with these variables:
/// - `message`: the human-readable description
/// - `previous_address`: prior address, absent on first observation
/// - `new_address`: the newly observed address
/// - `detected_at`: RFC 3339 timestamp
/// - `detected_at_unix`: Unix timestamp (seconds)
/// - `first_observation`: true when there was no previous address
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper implementation for retry delays (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```
/// use ip_watcher::http::ReqwestClient;
/// use ip_watcher::webhook::{HttpNotifier, PayloadFormat};
/// use url::Url;
///
/// let notifier = HttpNotifier::new(
///     ReqwestClient::new(),
///     Url::parse("https://discord.com/api/webhooks/1/abc").unwrap(),
/// )
/// .with_format(PayloadFormat::Discord);
/// ```
#[derive(Debug)]
pub struct HttpNotifier<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    url: url::Url,
    method: http::Method,
    headers: http::HeaderMap,
    format: PayloadFormat,
    body_template: Option<String>,
    retry_policy: RetryPolicy,
    timeout: Duration,
}

impl<H> HttpNotifier<H, TokioSleeper> {
    /// Default per-attempt timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a notifier posting Discord-style JSON with the default retry policy.
    #[must_use]
    pub fn new(client: H, url: url::Url) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            url,
            method: http::Method::POST,
            headers: http::HeaderMap::new(),
            format: PayloadFormat::default(),
            body_template: None,
            retry_policy: RetryPolicy::default(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl<H, S> HttpNotifier<H, S> {
    /// Sets a custom sleeper for retry delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> HttpNotifier<H, S2> {
        HttpNotifier {
            client: self.client,
            sleeper,
            url: self.url,
            method: self.method,
            headers: self.headers,
            format: self.format,
            body_template: self.body_template,
            retry_policy: self.retry_policy,
            timeout: self.timeout,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: http::Method) -> Self {
        self.method = method;
        self
    }

    /// Sets extra request headers.
    #[must_use]
    pub fn with_headers(mut self, headers: http::HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the built-in body format.
    #[must_use]
    pub const fn with_format(mut self, format: PayloadFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a body template (Handlebars syntax), replacing the built-in format.
    #[must_use]
    pub fn with_body_template(mut self, template: impl Into<String>) -> Self {
        self.body_template = Some(template.into());
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured URL.
    #[must_use]
    pub const fn url(&self) -> &url::Url {
        &self.url
    }

    /// Returns the configured HTTP method.
    #[must_use]
    pub const fn method(&self) -> &http::Method {
        &self.method
    }

    /// Returns the built-in body format.
    #[must_use]
    pub const fn format(&self) -> PayloadFormat {
        self.format
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

impl<H: HttpClient, S: Sleeper> HttpNotifier<H, S> {
    /// Builds the HTTP request for the given event.
    fn build_request(&self, event: &NotificationEvent) -> Result<HttpRequest, DeliveryError> {
        let mut request = HttpRequest::new(self.method.clone(), self.url.clone())
            .with_timeout(self.timeout);

        for (name, value) in &self.headers {
            request.headers.append(name, value.clone());
        }

        let (body, content_type) = match &self.body_template {
            Some(template) => (render_template(template, event)?, None),
            None => (self.format.render(event), Some(self.format.content_type())),
        };

        if let Some(content_type) = content_type {
            if !request.headers.contains_key(http::header::CONTENT_TYPE) {
                request.headers.insert(
                    http::header::CONTENT_TYPE,
                    http::HeaderValue::from_static(content_type),
                );
            }
        }

        request.body = Some(body);
        Ok(request)
    }

    /// Executes a single request attempt.
    async fn execute_request(&self, request: &HttpRequest) -> Result<(), DeliveryError> {
        let response = tokio::time::timeout(self.timeout, self.client.request(request.clone()))
            .await
            .map_err(|_| HttpError::Timeout)??;

        if response.is_success() {
            return Ok(());
        }

        Err(DeliveryError::NonSuccessStatus {
            status: response.status,
            body: response.body_text().map(ToString::to_string),
        })
    }

    /// Sends with retry logic.
    async fn send_with_retry(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let request = self.build_request(event)?;
        let mut waits = self.retry_policy.delays();
        let mut attempt = 1;

        loop {
            let error = match self.execute_request(&request).await {
                Ok(()) => return Ok(()),
                Err(e) if !e.is_retryable() => return Err(NotifyError::Rejected(e)),
                Err(e) => e,
            };

            let Some(delay) = waits.next() else {
                return Err(NotifyError::DeliveryFailed {
                    attempts: attempt,
                    last_error: error,
                });
            };

            tracing::debug!(
                "Notification attempt {attempt} failed: {error}; retrying in {:.1}s",
                delay.as_secs_f64()
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}

impl<H: HttpClient, S: Sleeper> Notifier for HttpNotifier<H, S> {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        self.send_with_retry(event).await
    }
}

/// Notifier that only logs what would have been sent.
///
/// Used for `--dry-run`; always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        tracing::info!("[dry-run] Would notify: {}", describe(event));
        Ok(())
    }
}

/// Extension trait for checking if an error is retryable.
///
/// Determines whether an error represents a transient failure that
/// warrants another attempt.
pub trait IsRetryable {
    /// Returns true if the error is potentially transient and should be retried.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for HttpError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            Self::InvalidUrl(_) | Self::BodyTooLarge { .. } => false,
        }
    }
}

impl IsRetryable for DeliveryError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_retryable(),
            // 5xx, 429 and 408 are transient; other 4xx are not
            Self::NonSuccessStatus { status, .. } => {
                status.is_server_error()
                    || *status == http::StatusCode::TOO_MANY_REQUESTS
                    || *status == http::StatusCode::REQUEST_TIMEOUT
            }
            Self::Template(_) => false,
        }
    }
}
