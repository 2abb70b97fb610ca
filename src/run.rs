//! Application execution logic.
//!
//! This module wires the validated configuration into a [`Watcher`] and runs
//! it until a shutdown signal arrives, and implements the one-shot `check`
//! command.

use thiserror::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use ip_watcher::config::{ResolverConfig, ValidatedConfig};
use ip_watcher::http::ReqwestClient;
use ip_watcher::monitor::{AddressRecord, ChangeDetector, Watcher};
use ip_watcher::resolver::{AddressResolver, HttpResolver, ResolveError};
use ip_watcher::state::{FileStateStore, StateStore};
use ip_watcher::webhook::{HttpNotifier, LogNotifier, Notifier};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to install an OS signal handler.
    #[error("Failed to install signal handler: {0}")]
    SignalHandler(#[source] std::io::Error),

    /// The one-shot lookup found no address.
    #[error("Could not determine public address: {0}")]
    Resolve(#[source] ResolveError),
}

/// Runs the watcher until Ctrl+C or SIGTERM.
///
/// A cycle in progress when the signal arrives completes before this
/// function returns.
///
/// # Errors
///
/// Returns an error if the signal handlers cannot be installed.
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires
/// real network access and OS signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let shutdown = CancellationToken::new();
    spawn_shutdown_listener(shutdown.clone())?;

    // Resolver and notifier share one connection pool
    let client = ReqwestClient::new();
    let resolver = create_resolver(&config.resolver, client.clone());
    let store = FileStateStore::new(config.state_file.clone());
    tracing::info!("State file: {}", store.path().display());

    if config.dry_run {
        tracing::info!("Dry-run mode enabled - notifications will be logged but not sent");
        watch(resolver, LogNotifier, store, &config, shutdown).await;
    } else {
        let notifier = create_notifier(&config, client);
        watch(resolver, notifier, store, &config, shutdown).await;
    }

    Ok(())
}

/// Resolves the public address once without touching state or notifying.
///
/// # Errors
///
/// Returns [`RunError::Resolve`] if no provider produced an address.
pub async fn check(config: &ResolverConfig) -> Result<AddressRecord, RunError> {
    create_resolver(config, ReqwestClient::new())
        .resolve()
        .await
        .map_err(RunError::Resolve)
}

async fn watch<R, N, S>(
    resolver: R,
    notifier: N,
    store: S,
    config: &ValidatedConfig,
    shutdown: CancellationToken,
) where
    R: AddressResolver,
    N: Notifier,
    S: StateStore,
{
    let watcher = Watcher::new(resolver, notifier, store)
        .with_detector(ChangeDetector::new(config.first_observation))
        .with_schedule(config.schedule);

    tracing::info!(
        "Checking every {}s (+{}-{}s jitter)",
        config.schedule.interval.as_secs(),
        config.schedule.jitter_min.as_secs(),
        config.schedule.jitter_max.as_secs(),
    );

    watcher.run(shutdown).await;
}

/// Creates the HTTP resolver from lookup settings.
fn create_resolver(config: &ResolverConfig, client: ReqwestClient) -> HttpResolver<ReqwestClient> {
    HttpResolver::new(client, config.providers.clone())
        .with_timeout(config.timeout)
        .with_ip_version(config.ip_version)
}

/// Creates the HTTP notifier from configuration.
fn create_notifier(config: &ValidatedConfig, client: ReqwestClient) -> HttpNotifier<ReqwestClient> {
    let mut notifier = HttpNotifier::new(client, config.destination.url().clone())
        .with_method(config.method.clone())
        .with_headers(config.headers.clone())
        .with_format(config.format)
        .with_retry_policy(config.retry_policy.clone());

    if let Some(ref template) = config.body_template {
        notifier = notifier.with_body_template(template);
    }

    notifier
}

/// Cancels `token` when Ctrl+C or SIGTERM is received.
///
/// Both handlers are registered before this returns, so a signal sent right
/// after startup is not missed.
fn spawn_shutdown_listener(token: CancellationToken) -> Result<(), RunError> {
    #[cfg(unix)]
    let (mut interrupt, mut terminate) = {
        use signal::unix::{SignalKind, signal};
        (
            signal(SignalKind::interrupt()).map_err(RunError::SignalHandler)?,
            signal(SignalKind::terminate()).map_err(RunError::SignalHandler)?,
        )
    };

    #[cfg(windows)]
    let mut interrupt = signal::windows::ctrl_c().map_err(RunError::SignalHandler)?;

    tokio::spawn(async move {
        #[cfg(unix)]
        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
        }

        #[cfg(windows)]
        interrupt.recv().await;

        tracing::info!("Shutdown signal received, stopping...");
        token.cancel();
    });

    Ok(())
}
