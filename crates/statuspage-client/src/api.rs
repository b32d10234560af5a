//! Statuspage v2 REST API client.
//!
//! Fetches incident lists for one fixed status page. Incidents that
//! belong to a different page or are missing required fields are
//! dropped from the result instead of failing the request.

use serde::Deserialize;
use serde_json::Value;

use crate::{Incident, IncidentSet, StatusPageError};

/// Which incident list endpoint to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentFilter {
    Unresolved,
    All,
}

impl IncidentFilter {
    fn endpoint(self) -> &'static str {
        match self {
            Self::Unresolved => "incidents/unresolved.json",
            Self::All => "incidents.json",
        }
    }
}

/// Raw incident list payload. Entries stay as raw JSON so one
/// malformed incident cannot fail the whole poll.
#[derive(Debug, Deserialize)]
struct IncidentListResponse {
    #[serde(default)]
    incidents: Vec<Value>,
}

/// Statuspage API client bound to a single page id.
pub struct StatusPageClient {
    http: reqwest::Client,
    base_url: String,
    page_id: String,
}

impl StatusPageClient {
    pub fn new(page_id: impl Into<String>) -> Self {
        let page_id = page_id.into();
        let base_url = format!("https://{page_id}.statuspage.io/api/v2");
        Self {
            http: reqwest::Client::new(),
            base_url,
            page_id,
        }
    }

    /// Override the API base URL (tests, self-hosted mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Fetch the incident list for the given filter.
    pub async fn incidents(
        &self,
        filter: IncidentFilter,
    ) -> Result<Vec<Incident>, StatusPageError> {
        let url = format!("{}/{}", self.base_url, filter.endpoint());
        let resp = self.http.get(&url).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(StatusPageError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: IncidentListResponse = serde_json::from_str(&body)?;
        Ok(self.collect_incidents(parsed))
    }

    /// Fetch unresolved incidents keyed by incident id.
    pub async fn unresolved_incidents(&self) -> Result<IncidentSet, StatusPageError> {
        let incidents = self.incidents(IncidentFilter::Unresolved).await?;
        Ok(incidents
            .into_iter()
            .map(|incident| (incident.id.clone(), incident))
            .collect())
    }

    fn collect_incidents(&self, response: IncidentListResponse) -> Vec<Incident> {
        let mut incidents = Vec::with_capacity(response.incidents.len());
        for raw in response.incidents {
            let incident: Incident = match serde_json::from_value(raw) {
                Ok(incident) => incident,
                Err(e) => {
                    tracing::debug!("Dropping malformed incident entry: {e}");
                    continue;
                }
            };
            if incident.page_id != self.page_id {
                continue;
            }
            incidents.push(incident);
        }
        incidents
    }
}
