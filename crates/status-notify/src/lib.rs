//! Incident banner notifications for a status page.
//!
//! Polls a status page for unresolved incidents, diffs each poll
//! against the last-known set, and drives transient banners for newly
//! opened and newly resolved incidents. The host environment supplies
//! the settings store and the notification display through the traits
//! in [`settings`] and [`banner`].

pub mod banner;
pub mod coordinator;
pub mod diff;
pub mod scheduler;
pub mod settings;

#[cfg(test)]
pub(crate) mod testutil;

pub use banner::{BannerDisplay, BannerHandle};
pub use coordinator::BannerCoordinator;
pub use diff::{IncidentDiff, diff};
pub use scheduler::{DEFAULT_POLL_INTERVAL, IncidentSource, StatusPoller};
pub use settings::{SettingsError, SettingsStore, keys};
