//! Error types for notification delivery.

use thiserror::Error;

use crate::http::HttpError;

/// Failure of a single delivery attempt.
///
/// Whether the attempt is worth repeating is decided by
/// [`IsRetryable`](super::IsRetryable).
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The request did not complete.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The endpoint answered with a non-2xx status.
    #[error("Endpoint returned HTTP {status}: {}", body.as_deref().unwrap_or("<no body>"))]
    NonSuccessStatus {
        /// The HTTP status code
        status: http::StatusCode,
        /// The response body, if readable
        body: Option<String>,
    },

    /// The body template could not be rendered.
    #[error("Template rendering failed: {0}")]
    Template(String),
}

/// Error returned by a [`Notifier`](super::Notifier).
#[derive(Debug, Error)]
pub enum NotifyError {
    /// A failure that retrying cannot fix (4xx, bad template).
    #[error("Notification rejected: {0}")]
    Rejected(#[source] DeliveryError),

    /// Every allowed attempt failed with a transient error.
    #[error("Notification failed after {attempts} attempts")]
    DeliveryFailed {
        /// Number of attempts made
        attempts: u32,
        /// The error from the final attempt
        #[source]
        last_error: DeliveryError,
    },
}

impl From<DeliveryError> for NotifyError {
    fn from(error: DeliveryError) -> Self {
        Self::Rejected(error)
    }
}
