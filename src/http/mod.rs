//! HTTP abstraction shared by the address resolver and the notifier.
//!
//! This module provides:
//! - Request/response value types ([`HttpRequest`], [`HttpResponse`])
//! - The client trait used for dependency injection ([`HttpClient`])
//! - The production implementation on top of reqwest ([`ReqwestClient`])

mod client;
mod error;
mod message;

#[cfg(test)]
mod message_tests;

pub use client::ReqwestClient;
pub use error::HttpError;
pub use message::{HttpClient, HttpRequest, HttpResponse};
