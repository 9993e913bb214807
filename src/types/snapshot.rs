//! Per-cycle result snapshot

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DriverNumber, LapResult, TrackedKeySet};

/// Latest result for every tracked driver.
///
/// `None` is the explicit "no result" sentinel. Two snapshots are equal when
/// every driver maps to an equal result, which is what gates home redraws.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSnapshot {
    results: BTreeMap<DriverNumber, Option<LapResult>>,
}

impl ResultSnapshot {
    /// A snapshot where every tracked driver has no result.
    pub fn no_results(tracked: &TrackedKeySet) -> Self {
        Self { results: tracked.iter().map(|driver| (driver, None)).collect() }
    }

    /// Latest result for `driver`, if one is known.
    pub fn get(&self, driver: DriverNumber) -> Option<&LapResult> {
        self.results.get(&driver).and_then(Option::as_ref)
    }

    pub fn set(&mut self, driver: DriverNumber, result: Option<LapResult>) {
        self.results.insert(driver, result);
    }

    pub fn contains(&self, driver: DriverNumber) -> bool {
        self.results.contains_key(&driver)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Keep only drivers still tracked; newly tracked drivers start with no result.
    pub fn restricted_to(&self, tracked: &TrackedKeySet) -> Self {
        Self {
            results: tracked
                .iter()
                .map(|driver| (driver, self.results.get(&driver).copied().flatten()))
                .collect(),
        }
    }

    /// Leader duration, when slot 0 has a present duration.
    pub fn leader_duration(&self, tracked: &TrackedKeySet) -> Option<f64> {
        tracked.leader().and_then(|leader| self.get(leader)).and_then(|result| result.duration)
    }
}
