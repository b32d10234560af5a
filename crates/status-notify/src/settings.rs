//! Settings store collaborator contract.

use serde_json::Value;

/// Settings keys used by this crate.
pub mod keys {
    /// Master toggle for incident banners.
    pub const NOTIFICATIONS_ENABLED: &str = "notifications.enabled";
    /// Poll interval override, in seconds.
    pub const POLL_INTERVAL_SECS: &str = "notifications.interval_secs";
    /// Resolved-banner auto-dismiss duration, in seconds.
    pub const BANNER_DURATION_SECS: &str = "notifications.duration_secs";
    /// Last-known unresolved incident set, as a JSON object.
    pub const UNRESOLVED_INCIDENTS: &str = "statuspage.unresolved_incidents";
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to write setting {key}: {message}")]
    Write { key: String, message: String },

    #[error("failed to flush settings: {0}")]
    Flush(String),
}

/// Change callback registered via [`SettingsStore::on_change`],
/// invoked with the new value.
pub type ChangeCallback = Box<dyn Fn(&Value) + Send + Sync>;

/// Key/value settings store provided by the host environment.
///
/// Typed getters return `None` for absent keys; callers supply the
/// default. Writes are buffered until [`SettingsStore::save`] flushes
/// them to durable storage.
pub trait SettingsStore: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn get_number(&self, key: &str) -> Option<f64>;
    fn get_json(&self, key: &str) -> Option<Value>;
    fn set_json(&self, key: &str, value: Value) -> Result<(), SettingsError>;

    /// Flush pending writes to durable storage.
    fn save(&self) -> Result<(), SettingsError>;

    /// Register a callback invoked whenever `key` changes.
    fn on_change(&self, key: &str, callback: ChangeCallback);
}
