//! ip-watcher: public IP change notifier
//!
//! A library for periodically resolving the host's public IP address,
//! detecting changes against persisted state, and notifying a webhook
//! or Discord channel.

pub mod config;
pub mod http;
pub mod monitor;
pub mod resolver;
pub mod state;
pub mod time;
pub mod webhook;
