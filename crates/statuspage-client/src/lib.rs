//! Statuspage API client library.
//!
//! Provides typed access to the public Statuspage v2 incident
//! endpoints for a single status page.

pub mod api;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use api::{IncidentFilter, StatusPageClient};

/// Lifecycle status reported for an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Investigating,
    Identified,
    Monitoring,
    Resolved,
    Postmortem,
    /// Any status string this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl IncidentStatus {
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved | Self::Postmortem)
    }
}

/// A single incident reported by the status page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub name: String,
    pub status: IncidentStatus,
    pub shortlink: String,
    pub page_id: String,
}

/// Unresolved incidents keyed by incident id, as of one poll.
pub type IncidentSet = HashMap<String, Incident>;

/// Unified error type for the statuspage-client crate.
#[derive(Debug, thiserror::Error)]
pub enum StatusPageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Statuspage API error (status {status}): {message}")]
    ApiError { status: u16, message: String },
}
