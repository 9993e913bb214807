//! Display formatting for lap times, gaps and lap counters

use std::collections::BTreeMap;

use crate::roster::format_driver_code;
use crate::types::{DriverNumber, FormattedRow, ResultSnapshot, TrackedKeySet};

pub const UNKNOWN_DURATION: &str = "--:--.---";
pub const UNKNOWN_GAP: &str = "+--.---";
pub const UNKNOWN_LAP: &str = "lap --";

/// `MM:SS.mmm`, rounding to the nearest millisecond.
pub fn format_lap_duration(total_seconds: f64) -> String {
    if !total_seconds.is_finite() {
        return UNKNOWN_DURATION.to_string();
    }
    let mut minutes = (total_seconds / 60.0).floor() as i64;
    let mut seconds = total_seconds.rem_euclid(60.0).floor() as i64;
    let mut millis = ((total_seconds - total_seconds.trunc()) * 1000.0).round() as i64;

    if millis == 1000 {
        seconds += 1;
        millis = 0;
    }
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{:02}:{:02}.{:03}", minutes, seconds, millis)
}

/// Signed gap to the leader with three decimals, e.g. `+1.625` or `-1.500`.
///
/// Unknown when either duration is missing.
pub fn format_gap(duration: Option<f64>, leader: Option<f64>) -> String {
    let (Some(duration), Some(leader)) = (duration, leader) else {
        return UNKNOWN_GAP.to_string();
    };
    let gap = duration - leader;
    if !gap.is_finite() {
        return UNKNOWN_GAP.to_string();
    }
    let sign = if gap >= 0.0 { '+' } else { '-' };
    let gap = gap.abs();

    let mut whole = gap.trunc() as i64;
    let mut millis = ((gap - gap.trunc()) * 1000.0).round() as i64;
    if millis == 1000 {
        whole += 1;
        millis = 0;
    }
    format!("{}{}.{:03}", sign, whole, millis)
}

/// `lap NN`.
pub fn format_lap_number(lap: Option<i64>) -> String {
    match lap {
        Some(lap) => format!("lap {:02}", lap),
        None => UNKNOWN_LAP.to_string(),
    }
}

/// One home screen row per tracked slot, in slot order.
///
/// Gaps are relative to slot 0; when slot 0 has no duration every gap is unknown.
pub fn build_lap_rows(
    tracked: &TrackedKeySet,
    snapshot: &ResultSnapshot,
    roster: &BTreeMap<DriverNumber, String>,
) -> Vec<FormattedRow> {
    let leader = snapshot.leader_duration(tracked);
    tracked
        .iter()
        .map(|driver| {
            let code = format_driver_code(roster, driver);
            match snapshot.get(driver) {
                Some(result) => FormattedRow::new(
                    code,
                    result.duration.map(format_lap_duration).unwrap_or_else(|| UNKNOWN_DURATION.to_string()),
                    format_gap(result.duration, leader),
                    format_lap_number(result.lap_number),
                ),
                None => FormattedRow::new(code, UNKNOWN_DURATION, UNKNOWN_GAP, UNKNOWN_LAP),
            }
        })
        .collect()
}
