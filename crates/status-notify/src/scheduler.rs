//! Timer-driven polling: fetch, diff, reconcile.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use statuspage_client::{IncidentSet, StatusPageClient, StatusPageError};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::coordinator::BannerCoordinator;
use crate::diff;
use crate::settings::{SettingsStore, keys};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Source of the current unresolved incident set.
///
/// Implemented by [`StatusPageClient`]; tests substitute in-memory
/// fakes.
pub trait IncidentSource: Send + Sync {
    fn fetch_unresolved(
        &self,
    ) -> impl Future<Output = Result<IncidentSet, StatusPageError>> + Send;
}

impl IncidentSource for StatusPageClient {
    fn fetch_unresolved(
        &self,
    ) -> impl Future<Output = Result<IncidentSet, StatusPageError>> + Send {
        self.unresolved_incidents()
    }
}

/// Periodic fetch→diff→reconcile driver with an enable/disable gate.
///
/// The enabled flag is seeded from settings and kept current through
/// change notification; flipping it takes effect on the next tick.
pub struct StatusPoller<P: IncidentSource + 'static> {
    source: Arc<P>,
    settings: Arc<dyn SettingsStore>,
    coordinator: BannerCoordinator,
    enabled: Arc<AtomicBool>,
    poll_token: CancellationToken,
}

impl<P: IncidentSource + 'static> StatusPoller<P> {
    pub fn new(
        source: Arc<P>,
        settings: Arc<dyn SettingsStore>,
        coordinator: BannerCoordinator,
    ) -> Self {
        let enabled = Arc::new(AtomicBool::new(
            settings.get_bool(keys::NOTIFICATIONS_ENABLED).unwrap_or(true),
        ));
        {
            let enabled = enabled.clone();
            settings.on_change(
                keys::NOTIFICATIONS_ENABLED,
                Box::new(move |value| {
                    if let Some(value) = value.as_bool() {
                        enabled.store(value, Ordering::Relaxed);
                    }
                }),
            );
        }

        Self {
            source,
            settings,
            coordinator,
            enabled,
            poll_token: CancellationToken::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Start the poll loop. The first tick runs immediately after the
    /// persisted state is restored; later ticks follow the configured
    /// interval.
    pub fn start(&self, default_interval: Duration) -> tokio::task::JoinHandle<()> {
        let interval = self.poll_interval(default_interval);
        let source = self.source.clone();
        let coordinator = self.coordinator.clone();
        let enabled = self.enabled.clone();
        let token = self.poll_token.clone();

        tracing::info!(interval_secs = interval.as_secs(), "Incident poll loop started");

        tokio::spawn(async move {
            coordinator.load_persisted().await;
            loop {
                if enabled.load(Ordering::Relaxed) {
                    if let Err(e) = poll_once(source.as_ref(), &coordinator).await {
                        tracing::debug!("Incident poll failed: {e}");
                    }
                } else {
                    tracing::trace!("Incident notifications disabled, skipping poll");
                }

                if sleep_or_cancel(&token, interval).await {
                    tracing::info!("Incident poll loop stopped (shutdown)");
                    return;
                }
            }
        })
    }

    /// Stop polling and tear down the coordinator. Pending resolved-
    /// banner waits are cancelled; lingering banners may self-expire.
    /// Idempotent.
    pub async fn stop(&self) {
        self.poll_token.cancel();
        self.coordinator.shutdown().await;
    }

    /// Resolve the poll interval: settings override or the given
    /// default.
    fn poll_interval(&self, default: Duration) -> Duration {
        self.settings
            .get_number(keys::POLL_INTERVAL_SECS)
            .filter(|secs| *secs >= 1.0)
            .map(Duration::from_secs_f64)
            .unwrap_or(default)
    }
}

/// One poll cycle: fetch the unresolved set, diff it against the
/// last-known set, reconcile banners. A fetch failure aborts only
/// this cycle; the next tick retries naturally.
async fn poll_once<P: IncidentSource>(
    source: &P,
    coordinator: &BannerCoordinator,
) -> Result<(), StatusPageError> {
    let current = source.fetch_unresolved().await?;
    let previous = coordinator.last_known().await;
    let changes = diff::diff(&previous, &current);
    coordinator.reconcile(changes, current).await;
    Ok(())
}

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}
