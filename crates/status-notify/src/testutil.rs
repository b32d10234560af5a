//! Shared in-memory fakes for coordinator and scheduler tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use statuspage_client::{Incident, IncidentSet, IncidentStatus, StatusPageError};

use crate::banner::{BannerDisplay, BannerHandle};
use crate::scheduler::IncidentSource;
use crate::settings::{ChangeCallback, SettingsError, SettingsStore};

pub fn incident(id: &str) -> Incident {
    Incident {
        id: id.into(),
        name: format!("Incident {id}"),
        status: IncidentStatus::Investigating,
        shortlink: format!("https://stspg.io/{id}"),
        page_id: "testpage".into(),
    }
}

pub fn incident_set(ids: &[&str]) -> IncidentSet {
    ids.iter().map(|id| (id.to_string(), incident(id))).collect()
}

/// Banner handle whose close behavior is controlled by the test.
pub struct FakeBanner {
    dismissed: AtomicBool,
    closed: AtomicBool,
    close_on_dismiss: bool,
}

impl FakeBanner {
    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn was_dismissed(&self) -> bool {
        self.dismissed.load(Ordering::SeqCst)
    }
}

impl BannerHandle for FakeBanner {
    fn dismiss(&self) {
        self.dismissed.store(true, Ordering::SeqCst);
        if self.close_on_dismiss {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn has_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Records every shown banner and hands out [`FakeBanner`] handles.
pub struct RecordingDisplay {
    /// Whether handles close as soon as they are dismissed, or only
    /// once the test calls [`FakeBanner::mark_closed`].
    close_on_dismiss: bool,
    shown: Mutex<Vec<(String, bool)>>,
    handles: Mutex<Vec<Arc<FakeBanner>>>,
}

impl RecordingDisplay {
    pub fn new(close_on_dismiss: bool) -> Self {
        Self {
            close_on_dismiss,
            shown: Mutex::new(Vec::new()),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn shown(&self) -> Vec<(String, bool)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn shown_count(&self) -> usize {
        self.shown.lock().unwrap().len()
    }

    pub fn handle(&self, index: usize) -> Arc<FakeBanner> {
        self.handles.lock().unwrap()[index].clone()
    }
}

impl BannerDisplay for RecordingDisplay {
    fn show(&self, html: &str, persistent: bool) -> Arc<dyn BannerHandle> {
        let handle = Arc::new(FakeBanner {
            dismissed: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            close_on_dismiss: self.close_on_dismiss,
        });
        self.shown.lock().unwrap().push((html.to_string(), persistent));
        self.handles.lock().unwrap().push(handle.clone());
        handle
    }
}

/// In-memory settings store with working change notification.
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, Value>>,
    callbacks: Mutex<HashMap<String, Vec<ChangeCallback>>>,
    saves: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemorySettings {
    pub fn with_value(self, key: &str, value: Value) -> Self {
        self.values.lock().unwrap().insert(key.to_string(), value);
        self
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Write a value and fire registered change callbacks, the way a
    /// host settings UI would.
    pub fn set(&self, key: &str, value: Value) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.clone());
        if let Some(callbacks) = self.callbacks.lock().unwrap().get(key) {
            for callback in callbacks {
                callback(&value);
            }
        }
    }
}

impl SettingsStore for MemorySettings {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.lock().unwrap().get(key).and_then(Value::as_bool)
    }

    fn get_number(&self, key: &str) -> Option<f64> {
        self.values.lock().unwrap().get(key).and_then(Value::as_f64)
    }

    fn get_json(&self, key: &str) -> Option<Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set_json(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SettingsError::Write {
                key: key.to_string(),
                message: "store is read-only".into(),
            });
        }
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn save(&self) -> Result<(), SettingsError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SettingsError::Flush("store is read-only".into()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_change(&self, key: &str, callback: ChangeCallback) {
        self.callbacks
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push(callback);
    }
}

/// Incident source returning a fixed set, counting fetches.
pub struct StaticSource {
    set: Mutex<IncidentSet>,
    fetches: AtomicUsize,
    fail: AtomicBool,
}

impl StaticSource {
    pub fn new(set: IncidentSet) -> Self {
        Self {
            set: Mutex::new(set),
            fetches: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_incidents(&self, set: IncidentSet) {
        *self.set.lock().unwrap() = set;
    }

    pub fn fail_next_fetches(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl IncidentSource for StaticSource {
    fn fetch_unresolved(
        &self,
    ) -> impl Future<Output = Result<IncidentSet, StatusPageError>> + Send {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail.load(Ordering::SeqCst) {
            Err(StatusPageError::ApiError {
                status: 503,
                message: "unavailable".into(),
            })
        } else {
            Ok(self.set.lock().unwrap().clone())
        };
        async move { result }
    }
}
