//! Address observation types and the change-detection policy.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::SystemTime;

use crate::state::PersistedState;

/// A single resolved observation of the public address.
///
/// Immutable once created; scoped to one watcher cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRecord {
    /// The public address reported by a lookup provider.
    pub address: IpAddr,
    /// When the address was observed.
    pub observed_at: SystemTime,
}

impl AddressRecord {
    /// Creates a new observation.
    #[must_use]
    pub const fn new(address: IpAddr, observed_at: SystemTime) -> Self {
        Self {
            address,
            observed_at,
        }
    }
}

/// A confirmed address change, consumed exactly once by the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationEvent {
    /// The previously stored address, `None` on the first observation.
    pub previous_address: Option<IpAddr>,
    /// The newly observed address.
    pub new_address: IpAddr,
    /// When the change was detected.
    pub detected_at: SystemTime,
}

impl NotificationEvent {
    /// Returns true if this event reports the very first observation.
    #[must_use]
    pub const fn is_first_observation(&self) -> bool {
        self.previous_address.is_none()
    }
}

/// What to do when no address has ever been stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstObservation {
    /// Emit an event so operators get a startup confirmation.
    #[default]
    Notify,
    /// Record the address without notifying.
    Seed,
}

impl FromStr for FirstObservation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "notify" => Ok(Self::Notify),
            "seed" | "silent" => Ok(Self::Seed),
            _ => Err(format!("expected 'notify' or 'seed', got '{s}'")),
        }
    }
}

impl fmt::Display for FirstObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notify => write!(f, "notify"),
            Self::Seed => write!(f, "seed"),
        }
    }
}

/// Outcome of comparing an observation against stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The address matches the stored one; nothing to do.
    Unchanged,
    /// First observation under [`FirstObservation::Seed`]: persist, don't notify.
    Seed(AddressRecord),
    /// The address changed (or first observation under [`FirstObservation::Notify`]).
    Changed(NotificationEvent),
}

impl Verdict {
    /// Returns the event to deliver, if any.
    #[must_use]
    pub const fn into_event(self) -> Option<NotificationEvent> {
        match self {
            Self::Changed(event) => Some(event),
            Self::Unchanged | Self::Seed(_) => None,
        }
    }
}

/// Pure change-detection policy.
///
/// Addresses are compared as parsed [`IpAddr`] values, so textual case
/// differences in IPv6 addresses never count as a change.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector {
    first_observation: FirstObservation,
}

impl ChangeDetector {
    /// Creates a detector with the given first-observation policy.
    #[must_use]
    pub const fn new(first_observation: FirstObservation) -> Self {
        Self { first_observation }
    }

    /// Returns the configured first-observation policy.
    #[must_use]
    pub const fn first_observation(&self) -> FirstObservation {
        self.first_observation
    }

    /// Classifies an observation against the stored state.
    #[must_use]
    pub fn evaluate(&self, current: &AddressRecord, state: &PersistedState) -> Verdict {
        match state.last_address {
            Some(previous) if previous == current.address => Verdict::Unchanged,
            Some(previous) => Verdict::Changed(NotificationEvent {
                previous_address: Some(previous),
                new_address: current.address,
                detected_at: current.observed_at,
            }),
            None => match self.first_observation {
                FirstObservation::Notify => Verdict::Changed(NotificationEvent {
                    previous_address: None,
                    new_address: current.address,
                    detected_at: current.observed_at,
                }),
                FirstObservation::Seed => Verdict::Seed(*current),
            },
        }
    }

    /// Returns the notification event for this observation, if one is due.
    #[must_use]
    pub fn detect(&self, current: &AddressRecord, state: &PersistedState) -> Option<NotificationEvent> {
        self.evaluate(current, state).into_event()
    }
}
