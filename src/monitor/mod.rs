//! Change detection and the watcher loop.
//!
//! This module provides:
//! - Observation and event types ([`AddressRecord`], [`NotificationEvent`])
//! - The first-observation policy and comparison ([`FirstObservation`], [`ChangeDetector`])
//! - The periodic loop ([`Watcher`], [`SchedulePolicy`], [`CycleOutcome`])

mod change;
mod watcher;


pub use change::{AddressRecord, ChangeDetector, FirstObservation, NotificationEvent, Verdict};
pub use watcher::{CycleOutcome, SchedulePolicy, Watcher};
