//! Lap records and per-driver results

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DriverNumber;
use super::value::{to_float, to_int};

/// Field that marks a completed, timed lap.
pub const LAP_DURATION_FIELD: &str = "lap_duration";

/// Latest lap for one tracked driver.
///
/// Absent values stay `None`; a lap number of zero is a real value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LapResult {
    /// Lap time in seconds
    pub duration: Option<f64>,
    /// Lap counter within the session
    pub lap_number: Option<i64>,
}

impl LapResult {
    pub fn new(duration: Option<f64>, lap_number: Option<i64>) -> Self {
        Self { duration, lap_number }
    }
}

/// One qualifying record pulled out of a lap feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapRecord {
    pub duration: f64,
    pub lap_number: Option<i64>,
    pub driver_number: Option<DriverNumber>,
}

impl LapRecord {
    /// Decode a lap object, or `None` when it has no usable `lap_duration`.
    ///
    /// An explicit `null` duration counts as absent.
    pub fn from_object(object: &Value) -> Option<Self> {
        if !object.is_object() {
            return None;
        }
        let duration = object.get(LAP_DURATION_FIELD).and_then(to_float)?;
        let lap_number = object.get("lap_number").and_then(to_int);
        let driver_number = object
            .get("driver_number")
            .and_then(to_int)
            .and_then(|n| DriverNumber::try_from(n).ok());
        Some(Self { duration, lap_number, driver_number })
    }
}

impl From<LapRecord> for LapResult {
    fn from(record: LapRecord) -> Self {
        LapResult { duration: Some(record.duration), lap_number: record.lap_number }
    }
}
