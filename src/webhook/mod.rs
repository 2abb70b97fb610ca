//! Notification delivery for address changes.
//!
//! This module provides:
//! - The [`Notifier`] abstraction and its HTTP implementation ([`HttpNotifier`])
//! - Built-in payload shapes ([`PayloadFormat`]) and Handlebars body templates
//! - Bounded exponential backoff ([`RetryPolicy`])

mod error;
mod payload;
mod retry;
mod sender;


pub use error::{DeliveryError, NotifyError};
pub use payload::{PayloadFormat, describe, format_timestamp, render_template};
pub use retry::RetryPolicy;
pub use sender::{HttpNotifier, IsRetryable, LogNotifier, Notifier};
