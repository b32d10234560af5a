//! Incident set diffing.

use statuspage_client::{Incident, IncidentSet};

/// Result of comparing two consecutive unresolved incident sets.
#[derive(Debug, Default, Clone)]
pub struct IncidentDiff {
    /// Incidents present now that were absent from the previous poll.
    pub appeared: Vec<Incident>,
    /// Incidents from the previous poll no longer reported unresolved.
    /// Carries the previously seen data; the current poll no longer
    /// has it.
    pub resolved: Vec<Incident>,
}

impl IncidentDiff {
    pub fn is_empty(&self) -> bool {
        self.appeared.is_empty() && self.resolved.is_empty()
    }
}

/// Classify incidents by presence in the previous vs current set.
///
/// Only presence drives classification: an id present in both sets is
/// unchanged even if its status moved between unresolved states. No
/// ordering is guaranteed within either list.
pub fn diff(previous: &IncidentSet, current: &IncidentSet) -> IncidentDiff {
    let mut result = IncidentDiff::default();
    for (id, incident) in previous {
        if !current.contains_key(id) {
            result.resolved.push(incident.clone());
        }
    }
    for (id, incident) in current {
        if !previous.contains_key(id) {
            result.appeared.push(incident.clone());
        }
    }
    result
}
