//! Session-level feeds: startup ranking and event metadata

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::BoardConfig;
use crate::extract::{ArrayLocator, RankedScanner, TailExtractor};
use crate::source::{Transport, fetch_feed};
use crate::types::value::{first_int, first_present, to_int};
use crate::types::{DriverNumber, EventInfoSnapshot};
use crate::Result;

/// Keys a session classification array may live under.
const RESULT_ARRAY_KEYS: &[&str] =
    &["results", "data", "session_result", "session_results", "classification", "items", "drivers"];

const DRIVER_KEYS: &[&str] = &["driver_number", "driverNumber", "number", "driver"];
const NESTED_DRIVER_KEYS: &[&str] = &["driver_number", "driverNumber", "number", "id"];
const POSITION_KEYS: &[&str] =
    &["position", "pos", "rank", "classification_position", "final_position", "placement", "order"];

/// Classification rows retained before de-duplication.
const RANKING_POOL: usize = 32;

/// Driver number of a classification entry, in any of the shapes feeds use.
fn entry_driver(entry: &Value) -> Option<DriverNumber> {
    let value = first_present(entry, DRIVER_KEYS)?;
    let number = if value.is_object() { first_int(value, NESTED_DRIVER_KEYS)? } else { to_int(value)? };
    DriverNumber::try_from(number).ok()
}

/// Rank a classification entry by its position field, else arrival order.
pub fn classification_entry(entry: &Value, arrival: usize) -> (Option<DriverNumber>, i64) {
    let rank = first_int(entry, POSITION_KEYS).unwrap_or(arrival as i64);
    (entry_driver(entry), rank)
}

/// Best-placed drivers of the latest session, best first.
///
/// Duplicates are dropped and the list is padded from `default_tracked`, so
/// the result always holds exactly `limit` distinct drivers when the defaults
/// allow it.
pub async fn fetch_top_drivers(transport: &mut dyn Transport, config: &BoardConfig, limit: usize) -> Vec<DriverNumber> {
    let url = config.session_result_url();
    let locator = ArrayLocator::Keys(RESULT_ARRAY_KEYS.iter().map(|key| key.to_string()).collect());
    let scanner = RankedScanner::new(
        locator,
        RANKING_POOL.max(limit),
        config.http_read_chunk_bytes,
        config.max_object_bytes,
        classification_entry,
    );

    let ranked: Vec<DriverNumber> = match fetch_feed(transport, &url, scanner).await {
        Ok(entries) => entries.into_iter().map(|entry| entry.row).collect(),
        // An object with no result array is itself the only entry
        Err(e) if e.is_no_data() => match fetch_single_entry(transport, config, &url).await {
            Ok(driver) => {
                debug!(driver, "Session result is a single entry");
                vec![driver]
            }
            Err(e) => {
                warn!(error = %e, "Session ranking unavailable, using defaults");
                Vec::new()
            }
        },
        Err(e) => {
            warn!(error = %e, "Session ranking unavailable, using defaults");
            Vec::new()
        }
    };

    let mut drivers: Vec<DriverNumber> = Vec::with_capacity(limit);
    for driver in ranked.into_iter().chain(config.default_tracked.iter().copied()) {
        if drivers.len() == limit {
            break;
        }
        if !drivers.contains(&driver) {
            drivers.push(driver);
        }
    }
    info!(?drivers, "Tracked drivers chosen");
    drivers
}

async fn fetch_single_entry(transport: &mut dyn Transport, config: &BoardConfig, url: &str) -> Result<DriverNumber> {
    let reader = TailExtractor::new(
        config.http_tail_bytes,
        config.http_read_chunk_bytes,
        config.max_object_bytes,
        entry_driver as fn(&Value) -> Option<DriverNumber>,
    );
    fetch_feed(transport, url, reader).await
}

fn meeting_record(object: &Value) -> Option<Value> {
    object.get("meeting_name").map(|_| object.clone())
}

fn session_record(object: &Value) -> Option<Value> {
    (object.get("session_name").is_some() || object.get("session_type").is_some()).then(|| object.clone())
}

async fn fetch_latest_object(
    transport: &mut dyn Transport,
    config: &BoardConfig,
    url: &str,
    select: fn(&Value) -> Option<Value>,
) -> Result<Value> {
    let reader =
        TailExtractor::new(config.http_tail_bytes, config.http_read_chunk_bytes, config.max_object_bytes, select);
    fetch_feed(transport, url, reader).await
}

/// Refresh `info` from the meetings and sessions feeds.
///
/// Each feed that fails leaves its fields at their prior values.
pub async fn fetch_event_info(transport: &mut dyn Transport, config: &BoardConfig, info: &mut EventInfoSnapshot) {
    match fetch_latest_object(transport, config, &config.meetings_url(), meeting_record).await {
        Ok(meeting) => info.apply_meeting(&meeting),
        Err(e) => debug!(error = %e, "Meeting info unavailable"),
    }
    match fetch_latest_object(transport, config, &config.sessions_url(), session_record).await {
        Ok(session) => info.apply_session(&session),
        Err(e) => debug!(error = %e, "Session info unavailable"),
    }
}
