//! Public address resolution.
//!
//! This module provides:
//! - Lookup provider descriptions ([`LookupProvider`], [`ResponseFormat`])
//! - IP family selection ([`IpVersion`])
//! - The resolver trait and its HTTP implementation ([`AddressResolver`], [`HttpResolver`])
//! - Error types ([`ResolveError`], [`ProviderError`])
//!
//! Providers are tried in order and the first valid answer wins. There is no
//! retry beyond falling through the list; a fully failed lookup is reported
//! to the caller, which skips the cycle.

mod error;
mod lookup;
mod provider;


pub use error::{ProviderError, ProviderFailure, ResolveError};
pub use lookup::{AddressResolver, HttpResolver};
pub use provider::{IpVersion, LookupProvider, ResponseFormat, default_providers};
