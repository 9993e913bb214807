//! Per-driver lap feed

use serde_json::Value;
use tracing::debug;

use crate::config::BoardConfig;
use crate::extract::TailExtractor;
use crate::source::{Transport, fetch_feed};
use crate::types::{DriverNumber, LapRecord, LapResult};
use crate::Result;

/// Latest timed lap for `driver` from the lap feed's tail.
pub async fn fetch_latest_lap(
    transport: &mut dyn Transport,
    config: &BoardConfig,
    driver: DriverNumber,
) -> Result<LapResult> {
    let url = config.laps_url(driver);
    let reader = TailExtractor::new(
        config.http_tail_bytes,
        config.http_read_chunk_bytes,
        config.max_object_bytes,
        |object: &Value| LapRecord::from_object(object),
    );

    let record = fetch_feed(transport, &url, reader).await?;
    if record.driver_number.is_some_and(|reported| reported != driver) {
        debug!(driver, reported = ?record.driver_number, "Lap feed returned a record for another driver");
    }
    debug!(driver, duration = record.duration, lap = ?record.lap_number, "Latest lap");
    Ok(record.into())
}
