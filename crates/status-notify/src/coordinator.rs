//! Banner lifecycle coordination.
//!
//! Shows a persistent banner per newly opened incident. On resolution
//! the old banner is dismissed, an independent wait watches for it to
//! fully close, and only then is the resolved banner shown, expiring
//! on its own after a configurable duration. The last-known
//! unresolved set is persisted through the settings store after every
//! reconciliation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use statuspage_client::{Incident, IncidentSet};
use tokio::sync::RwLock;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::banner::{BannerDisplay, BannerHandle, render};
use crate::diff::IncidentDiff;
use crate::settings::{SettingsStore, keys};

const CLOSE_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_BANNER_DURATION_SECS: f64 = 5.0;

/// Coordinates banner lifecycles across poll cycles.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct BannerCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    display: Arc<dyn BannerDisplay>,
    settings: Arc<dyn SettingsStore>,
    /// Active new-incident banner handles keyed by incident id.
    active: RwLock<HashMap<String, Arc<dyn BannerHandle>>>,
    /// Last-known unresolved set, mirrored to the settings store.
    last_known: RwLock<IncidentSet>,
    /// Cancelled on teardown; gates every deferred banner action.
    shutdown: CancellationToken,
}

impl BannerCoordinator {
    pub fn new(display: Arc<dyn BannerDisplay>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                display,
                settings,
                active: RwLock::new(HashMap::new()),
                last_known: RwLock::new(IncidentSet::new()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Restore the last-known unresolved set from the settings store.
    ///
    /// A missing or corrupt blob degrades to an empty set: previously
    /// seen incidents are then re-reported as appeared, which is the
    /// accepted restart behavior.
    pub async fn load_persisted(&self) {
        let set = match self.inner.settings.get_json(keys::UNRESOLVED_INCIDENTS) {
            Some(value) => match serde_json::from_value::<IncidentSet>(value) {
                Ok(set) => set,
                Err(e) => {
                    tracing::warn!("Persisted incident set is corrupt, starting empty: {e}");
                    IncidentSet::new()
                }
            },
            None => IncidentSet::new(),
        };
        *self.inner.last_known.write().await = set;
    }

    /// Last-known unresolved set as of the previous reconciliation.
    pub async fn last_known(&self) -> IncidentSet {
        self.inner.last_known.read().await.clone()
    }

    /// Apply one poll cycle's diff: show banners for appeared
    /// incidents, sequence resolved banners behind their new-incident
    /// banners, then persist `current` as the new last-known set.
    pub async fn reconcile(&self, changes: IncidentDiff, current: IncidentSet) {
        for incident in &changes.appeared {
            self.show_new_banner(incident).await;
        }
        for incident in changes.resolved {
            self.schedule_resolved_banner(incident).await;
        }

        *self.inner.last_known.write().await = current.clone();
        self.persist(&current);
    }

    /// Cancel pending waits and forget active handles. Banners still
    /// on screen are not force-dismissed; they may self-expire.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.active.write().await.clear();
        tracing::info!("Banner coordinator shut down");
    }

    async fn show_new_banner(&self, incident: &Incident) {
        let mut active = self.inner.active.write().await;
        if active.contains_key(&incident.id) {
            // At most one active banner per incident id.
            return;
        }
        tracing::info!(id = %incident.id, name = %incident.name, "New incident reported");
        let handle = self
            .inner
            .display
            .show(&render::new_incident(incident), true);
        active.insert(incident.id.clone(), handle);
    }

    /// Dismiss the active banner for a resolved incident and spawn an
    /// independent wait that shows the resolved banner once the old
    /// banner has fully closed. The handle leaves ActiveBanners here
    /// and is owned by the wait from then on, so the same incident
    /// can reappear and track a fresh banner while the wait is still
    /// pending.
    async fn schedule_resolved_banner(&self, incident: Incident) {
        let handle = self.inner.active.write().await.remove(&incident.id);
        if let Some(handle) = &handle {
            handle.dismiss();
        }
        tracing::info!(id = %incident.id, name = %incident.name, "Incident resolved");

        let coordinator = self.clone();
        tokio::spawn(async move {
            coordinator.resolved_banner_task(incident, handle).await;
        });
    }

    async fn resolved_banner_task(
        &self,
        incident: Incident,
        handle: Option<Arc<dyn BannerHandle>>,
    ) {
        let shutdown = &self.inner.shutdown;

        if let Some(handle) = handle {
            // First check is immediate so an already-closed banner
            // adds no extra delay.
            while !handle.has_closed() {
                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    _ = sleep(CLOSE_POLL_INTERVAL) => {}
                }
            }
        }

        if shutdown.is_cancelled() {
            return;
        }

        let resolved = self
            .inner
            .display
            .show(&render::resolved_incident(&incident), true);
        tokio::select! {
            _ = shutdown.cancelled() => {}
            _ = sleep(self.banner_duration()) => resolved.dismiss(),
        }
    }

    fn banner_duration(&self) -> Duration {
        let secs = self
            .inner
            .settings
            .get_number(keys::BANNER_DURATION_SECS)
            .filter(|secs| *secs >= 1.0)
            .unwrap_or(DEFAULT_BANNER_DURATION_SECS);
        Duration::from_secs_f64(secs)
    }

    fn persist(&self, current: &IncidentSet) {
        let value = match serde_json::to_value(current) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to serialize unresolved incident set: {e}");
                return;
            }
        };
        if let Err(e) = self
            .inner
            .settings
            .set_json(keys::UNRESOLVED_INCIDENTS, value)
        {
            tracing::warn!("Failed to persist unresolved incident set: {e}");
            return;
        }
        if let Err(e) = self.inner.settings.save() {
            tracing::warn!("Failed to flush settings: {e}");
        }
    }

    #[cfg(test)]
    pub(crate) async fn active_banner_ids(&self) -> Vec<String> {
        self.inner.active.read().await.keys().cloned().collect()
    }
}
