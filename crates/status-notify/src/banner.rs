//! Banner display collaborator contract and banner markup.

use std::sync::Arc;

/// Dismiss handle for a banner that is currently shown.
pub trait BannerHandle: Send + Sync {
    /// Ask the host to close the banner. Closing may complete
    /// asynchronously; observe [`BannerHandle::has_closed`].
    fn dismiss(&self);

    /// Whether the banner has fully closed.
    fn has_closed(&self) -> bool;
}

/// Notification display primitive provided by the host environment.
pub trait BannerDisplay: Send + Sync {
    /// Show a banner with the given HTML content. A persistent banner
    /// stays up until dismissed through the returned handle.
    fn show(&self, html: &str, persistent: bool) -> Arc<dyn BannerHandle>;
}

/// Banner markup for incident notifications.
pub mod render {
    use statuspage_client::Incident;

    /// Banner for a newly opened incident.
    pub fn new_incident(incident: &Incident) -> String {
        format!(
            "<div class=\"status-banner\">\
             <a href=\"{}\" target=\"_blank\">{}</a></div>",
            escape(&incident.shortlink),
            escape(&incident.name),
        )
    }

    /// Banner for a resolved incident, styled distinctly.
    pub fn resolved_incident(incident: &Incident) -> String {
        format!(
            "<div class=\"status-banner status-banner-resolved\">\
             <strong>Resolved:</strong> \
             <a href=\"{}\" target=\"_blank\">{}</a></div>",
            escape(&incident.shortlink),
            escape(&incident.name),
        )
    }

    /// Minimal HTML escaping for text and attribute positions.
    fn escape(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(c),
            }
        }
        escaped
    }

}
