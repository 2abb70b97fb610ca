//! The polling loop: resolve, compare, notify, persist, sleep.

use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use super::change::{AddressRecord, ChangeDetector, NotificationEvent, Verdict};
use crate::resolver::AddressResolver;
use crate::state::{LoadResult, PersistedState, StateStore};
use crate::webhook::Notifier;

/// Delay between cycles: a fixed interval plus uniform random jitter.
///
/// Jitter spreads requests from many watchers that started at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    /// Base delay between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Lower bound of the added jitter.
    pub jitter_min: Duration,
    /// Upper bound of the added jitter (inclusive).
    pub jitter_max: Duration,
}

impl SchedulePolicy {
    /// Default interval (5 minutes).
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

    /// Default upper jitter bound (30 seconds).
    pub const DEFAULT_JITTER_MAX: Duration = Duration::from_secs(30);

    /// Creates a policy with the given interval and the default jitter.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            jitter_min: Duration::ZERO,
            jitter_max: Self::DEFAULT_JITTER_MAX,
        }
    }

    /// Sets the jitter bounds.
    ///
    /// # Panics
    ///
    /// Panics if `min` is greater than `max`.
    #[must_use]
    pub fn with_jitter(mut self, min: Duration, max: Duration) -> Self {
        assert!(min <= max, "jitter_min must not exceed jitter_max");
        self.jitter_min = min;
        self.jitter_max = max;
        self
    }

    /// Samples the delay before the next cycle.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        let jitter = if self.jitter_min >= self.jitter_max {
            self.jitter_min
        } else {
            rand::thread_rng().gen_range(self.jitter_min..=self.jitter_max)
        };
        self.interval.saturating_add(jitter)
    }
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

/// Result of one watcher cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No provider produced an address; stored state was not touched.
    ResolutionFailed,
    /// The address matches the stored one.
    Unchanged,
    /// The first address was recorded without notifying.
    Seeded {
        /// Whether the state was saved.
        persisted: bool,
    },
    /// A change was detected.
    Changed {
        /// The emitted event.
        event: NotificationEvent,
        /// Whether the notifier reported success.
        notified: bool,
        /// Whether the state was saved.
        persisted: bool,
    },
}

/// Periodic public-address watcher.
///
/// Composes a resolver, a notifier and a state store. Cycles never overlap:
/// the next one starts only after the previous one and the following sleep
/// have both completed.
///
/// # Type Parameters
///
/// - `R`: The address resolver
/// - `N`: The notifier
/// - `S`: The state store
#[derive(Debug)]
pub struct Watcher<R, N, S> {
    resolver: R,
    notifier: N,
    store: S,
    detector: ChangeDetector,
    schedule: SchedulePolicy,
}

impl<R, N, S> Watcher<R, N, S> {
    /// Creates a watcher with the default detector and schedule.
    #[must_use]
    pub fn new(resolver: R, notifier: N, store: S) -> Self {
        Self {
            resolver,
            notifier,
            store,
            detector: ChangeDetector::default(),
            schedule: SchedulePolicy::default(),
        }
    }

    /// Sets the change detector.
    #[must_use]
    pub const fn with_detector(mut self, detector: ChangeDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Sets the schedule.
    #[must_use]
    pub const fn with_schedule(mut self, schedule: SchedulePolicy) -> Self {
        self.schedule = schedule;
        self
    }

    /// Returns the schedule.
    #[must_use]
    pub const fn schedule(&self) -> &SchedulePolicy {
        &self.schedule
    }

    /// Returns the resolver.
    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Returns the state store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the notifier.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }
}

impl<R, N, S> Watcher<R, N, S>
where
    R: AddressResolver,
    N: Notifier,
    S: StateStore,
{
    /// Runs cycles until `shutdown` is cancelled.
    ///
    /// Cancellation interrupts the sleep between cycles immediately; a cycle
    /// already in progress runs to completion first.
    pub async fn run(&self, shutdown: CancellationToken) {
        loop {
            self.run_cycle().await;

            if shutdown.is_cancelled() {
                break;
            }

            let delay = self.schedule.next_delay();
            tracing::debug!("Next check in {:.1}s", delay.as_secs_f64());

            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!("Watcher stopped");
    }

    /// Runs a single resolve/compare/notify/persist cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let current = match self.resolver.resolve().await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Could not determine public address: {e}");
                return CycleOutcome::ResolutionFailed;
            }
        };

        let stored = self.load_state();

        match self.detector.evaluate(&current, &stored) {
            Verdict::Unchanged => {
                tracing::debug!("Public address unchanged: {}", current.address);
                CycleOutcome::Unchanged
            }
            Verdict::Seed(record) => {
                tracing::info!("Recorded initial public address {}", record.address);
                let persisted = self.persist(&record).await;
                CycleOutcome::Seeded { persisted }
            }
            Verdict::Changed(event) => {
                match event.previous_address {
                    Some(previous) => tracing::info!(
                        "Public address changed: {previous} -> {}",
                        event.new_address
                    ),
                    None => tracing::info!("Public address is {}", event.new_address),
                }

                let notified = match self.notifier.notify(&event).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!("Notification failed: {e}");
                        false
                    }
                };

                let record = AddressRecord::new(event.new_address, event.detected_at);
                let persisted = self.persist(&record).await;

                CycleOutcome::Changed {
                    event,
                    notified,
                    persisted,
                }
            }
        }
    }

    fn load_state(&self) -> PersistedState {
        match self.store.load() {
            LoadResult::Loaded(state) => state,
            LoadResult::NotFound => {
                tracing::debug!("No saved state, treating as first run");
                PersistedState::default()
            }
            LoadResult::Corrupted { reason } => {
                tracing::warn!("Saved state unreadable ({reason}), treating as first run");
                PersistedState::default()
            }
        }
    }

    async fn persist(&self, record: &AddressRecord) -> bool {
        match self.store.save(&PersistedState::observed(record)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to save state: {e}");
                false
            }
        }
    }
}
