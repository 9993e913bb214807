//! Board configuration
//!
//! All tunables live in one [`BoardConfig`], deserialized from JSON with every
//! field optional. Missing fields take the defaults below.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::roster::default_roster;
use crate::types::DriverNumber;
use crate::{BoardError, Result};

/// Which standings table a list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandingsKind {
    Drivers,
    Constructors,
}

impl StandingsKind {
    /// Key of the array holding the standings rows.
    pub fn array_key(self) -> &'static str {
        match self {
            StandingsKind::Drivers => "DriverStandings",
            StandingsKind::Constructors => "ConstructorStandings",
        }
    }

    /// Title shown above the list.
    pub fn title(self) -> &'static str {
        match self {
            StandingsKind::Drivers => "Driver standings",
            StandingsKind::Constructors => "Constructor standings",
        }
    }
}

/// Runtime configuration for the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Base URL of the lap/session API, trailing slash stripped on use
    pub api_base_url: String,
    /// Base URL of the championship standings API
    pub standings_base_url: String,
    /// Pause between poll cycles on the home screen
    pub poll_interval_ms: u64,
    /// Bytes requested from the byte source per read
    pub http_read_chunk_bytes: usize,
    /// Trailing window retained by the tail extractor
    pub http_tail_bytes: usize,
    /// Largest single array element the scanners will buffer
    pub max_object_bytes: usize,
    /// Input probe interval while idle
    pub button_poll_ms: u64,
    /// Probe interval while waiting for all buttons to be released
    pub button_release_poll_ms: u64,
    /// Settle time after release
    pub button_release_debounce_ms: u64,
    /// Number of tracked slots on the home screen
    pub tracked_count: usize,
    /// Tracked keys used when the startup ranking fetch fails
    pub default_tracked: Vec<DriverNumber>,
    /// Rows retained from a standings feed
    pub standings_capacity: usize,
    /// List rows visible below the title
    pub visible_rows: usize,
    /// Attempts per fetch when buffering runs out of memory
    pub alloc_retries: u32,
    /// Completed poll cycles between event info refreshes; 0 refreshes only at startup
    pub event_info_refresh_cycles: u32,
    /// Event info lines are shown on the home screen from boot
    pub show_event_info: bool,
    /// Driver number to short code
    pub roster: BTreeMap<DriverNumber, String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://192.168.26.249:8000".to_string(),
            standings_base_url: "https://api.jolpi.ca/ergast/f1/current".to_string(),
            poll_interval_ms: 5000,
            http_read_chunk_bytes: 256,
            http_tail_bytes: 4096,
            max_object_bytes: 16 * 1024,
            button_poll_ms: 20,
            button_release_poll_ms: 10,
            button_release_debounce_ms: 30,
            tracked_count: 3,
            default_tracked: vec![44, 81, 3],
            standings_capacity: 10,
            visible_rows: 7,
            alloc_retries: 3,
            event_info_refresh_cycles: 12,
            show_event_info: true,
            roster: default_roster(),
        }
    }
}

impl BoardConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BoardConfig = serde_json::from_str(json)
            .map_err(|e| BoardError::config(format!("JSON parsing failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: BoardConfig = serde_json::from_reader(reader)
            .map_err(|e| BoardError::config(format!("JSON parsing failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the board cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.http_read_chunk_bytes == 0 {
            return Err(BoardError::config("http_read_chunk_bytes must be positive"));
        }
        if self.http_tail_bytes == 0 {
            return Err(BoardError::config("http_tail_bytes must be positive"));
        }
        if self.max_object_bytes == 0 {
            return Err(BoardError::config("max_object_bytes must be positive"));
        }
        if self.standings_capacity == 0 {
            return Err(BoardError::config("standings_capacity must be positive"));
        }
        if self.visible_rows == 0 {
            return Err(BoardError::config("visible_rows must be positive"));
        }
        if self.tracked_count == 0 || self.default_tracked.len() != self.tracked_count {
            return Err(BoardError::config(format!(
                "default_tracked has {} entries, tracked_count is {}",
                self.default_tracked.len(),
                self.tracked_count
            )));
        }
        let unique: HashSet<_> = self.default_tracked.iter().collect();
        if unique.len() != self.default_tracked.len() {
            return Err(BoardError::config("default_tracked contains duplicates"));
        }
        if self.roster.is_empty() {
            return Err(BoardError::config("roster is empty"));
        }
        debug!(tracked = ?self.default_tracked, "Configuration validated");
        Ok(())
    }

    fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Lap feed for one driver in the latest session.
    pub fn laps_url(&self, driver: DriverNumber) -> String {
        format!("{}/v1/laps?session_key=latest&driver_number={}", self.base_url(), driver)
    }

    /// Classification of the latest session.
    pub fn session_result_url(&self) -> String {
        format!("{}/v1/session_result?session_key=latest", self.base_url())
    }

    /// Latest meeting (event) metadata.
    pub fn meetings_url(&self) -> String {
        format!("{}/v1/meetings?meeting_key=latest", self.base_url())
    }

    /// Latest session metadata.
    pub fn sessions_url(&self) -> String {
        format!("{}/v1/sessions?session_key=latest", self.base_url())
    }

    /// Championship standings table.
    pub fn standings_url(&self, kind: StandingsKind) -> String {
        let base = self.standings_base_url.trim_end_matches('/');
        match kind {
            StandingsKind::Drivers => format!("{}/driverStandings.json", base),
            StandingsKind::Constructors => format!("{}/constructorStandings.json", base),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn button_poll(&self) -> Duration {
        Duration::from_millis(self.button_poll_ms)
    }

    pub fn button_release_poll(&self) -> Duration {
        Duration::from_millis(self.button_release_poll_ms)
    }

    pub fn button_release_debounce(&self) -> Duration {
        Duration::from_millis(self.button_release_debounce_ms)
    }

    /// Idle probes that make up one poll interval.
    pub fn idle_polls_per_interval(&self) -> u64 {
        self.poll_interval_ms.checked_div(self.button_poll_ms).unwrap_or(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = BoardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.idle_polls_per_interval(), 250);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            BoardConfig::from_json_str(r#"{"api_base_url": "http://example.com/", "poll_interval_ms": 2000}"#)
                .unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.http_tail_bytes, 4096);
        assert!(config.show_event_info);
        assert_eq!(
            config.laps_url(7),
            "http://example.com/v1/laps?session_key=latest&driver_number=7"
        );
        assert_eq!(config.meetings_url(), "http://example.com/v1/meetings?meeting_key=latest");
    }

    #[test]
    fn standings_urls() {
        let config = BoardConfig {
            standings_base_url: "https://stats.example/f1/current/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.standings_url(StandingsKind::Drivers),
            "https://stats.example/f1/current/driverStandings.json"
        );
        assert_eq!(
            config.standings_url(StandingsKind::Constructors),
            "https://stats.example/f1/current/constructorStandings.json"
        );
    }

    #[test]
    fn rejects_mismatched_tracked_count() {
        let err = BoardConfig::from_json_str(r#"{"tracked_count": 4}"#).unwrap_err();
        assert!(matches!(err, BoardError::Config { .. }));
    }

    #[test]
    fn rejects_duplicate_defaults() {
        let err = BoardConfig::from_json_str(r#"{"default_tracked": [1, 1, 3]}"#).unwrap_err();
        assert!(err.to_string().contains("duplicates"));
    }

    #[test]
    fn rejects_zero_chunk() {
        assert!(BoardConfig::from_json_str(r#"{"http_read_chunk_bytes": 0}"#).is_err());
    }

    #[test]
    fn reads_from_reader() {
        let json = br#"{"visible_rows": 5}"#;
        let config = BoardConfig::from_reader(&json[..]).unwrap();
        assert_eq!(config.visible_rows, 5);
    }

    #[test]
    fn roster_keys_parse_from_strings() {
        let config = BoardConfig::from_json_str(r#"{"roster": {"99": "TST"}}"#).unwrap();
        assert_eq!(config.roster.get(&99).map(String::as_str), Some("TST"));
    }
}
