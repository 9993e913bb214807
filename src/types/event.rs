//! Event metadata shown under the lap table

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::value::text;

/// Descriptive strings for the running event. Used only for change detection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventInfoSnapshot {
    pub event_name: String,
    pub session_label: String,
    pub venue: String,
    pub country: String,
}

impl EventInfoSnapshot {
    /// Apply a meetings feed record.
    pub fn apply_meeting(&mut self, meeting: &Value) {
        self.event_name = text(meeting, "meeting_name").unwrap_or_default();
    }

    /// Apply a sessions feed record. Empty venue/country fields keep prior values.
    pub fn apply_session(&mut self, session: &Value) {
        let parts: Vec<String> =
            [text(session, "session_type"), text(session, "session_name")].into_iter().flatten().collect();
        self.session_label = parts.join(" - ");
        if let Some(venue) = text(session, "circuit_short_name") {
            self.venue = venue;
        }
        if let Some(country) = text(session, "country_name") {
            self.country = country;
        }
    }

    /// Non-empty lines in display order.
    pub fn lines(&self) -> Vec<&str> {
        [&self.event_name, &self.session_label, &self.venue, &self.country]
            .into_iter()
            .map(String::as_str)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_label_joins_type_and_name() {
        let mut info = EventInfoSnapshot::default();
        info.apply_session(&json!({
            "session_type": "Race",
            "session_name": "Sprint",
            "circuit_short_name": "Spa-Francorchamps",
            "country_name": "Belgium"
        }));
        assert_eq!(info.session_label, "Race - Sprint");
        assert_eq!(info.venue, "Spa-Francorchamps");
        assert_eq!(info.country, "Belgium");
    }

    #[test]
    fn empty_fields_keep_prior_venue() {
        let mut info = EventInfoSnapshot { venue: "Monza".to_string(), ..Default::default() };
        info.apply_session(&json!({"session_name": "Practice 1", "circuit_short_name": ""}));
        assert_eq!(info.session_label, "Practice 1");
        assert_eq!(info.venue, "Monza");
    }

    #[test]
    fn lines_skip_empty() {
        let mut info = EventInfoSnapshot::default();
        info.apply_meeting(&json!({"meeting_name": "Italian Grand Prix"}));
        assert_eq!(info.lines(), vec!["Italian Grand Prix"]);
    }
}
