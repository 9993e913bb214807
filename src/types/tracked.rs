//! The fixed-length set of drivers polled each cycle

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::DriverNumber;

/// Ordered tracked drivers. Slot 0 is the gap reference.
///
/// The length never changes after construction; the only mutation is
/// [`replace`](TrackedKeySet::replace). Duplicates introduced by a manual
/// replacement are permitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedKeySet {
    slots: Vec<DriverNumber>,
}

impl TrackedKeySet {
    pub fn new(slots: Vec<DriverNumber>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<DriverNumber> {
        self.slots.get(slot).copied()
    }

    /// The gap reference driver.
    pub fn leader(&self) -> Option<DriverNumber> {
        self.get(0)
    }

    pub fn as_slice(&self) -> &[DriverNumber] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = DriverNumber> + '_ {
        self.slots.iter().copied()
    }

    pub fn contains(&self, driver: DriverNumber) -> bool {
        self.slots.contains(&driver)
    }

    /// Write `driver` into `slot`. Returns false and leaves the set unchanged
    /// when the slot does not exist.
    pub fn replace(&mut self, slot: usize, driver: DriverNumber) -> bool {
        match self.slots.get_mut(slot) {
            Some(current) => {
                debug!(slot, from = *current, to = driver, "Replacing tracked driver");
                *current = driver;
                true
            }
            None => false,
        }
    }

    /// Replace the whole set with a new ranking of the same length.
    pub(crate) fn reseed(&mut self, drivers: &[DriverNumber]) -> bool {
        if drivers.len() != self.slots.len() {
            return false;
        }
        self.slots.copy_from_slice(drivers);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_only_touches_one_slot() {
        let mut set = TrackedKeySet::new(vec![44, 81, 3]);
        assert!(set.replace(1, 99));
        assert_eq!(set.as_slice(), &[44, 99, 3]);
        assert_eq!(set.leader(), Some(44));
    }

    #[test]
    fn out_of_range_replace_is_rejected() {
        let mut set = TrackedKeySet::new(vec![44, 81, 3]);
        assert!(!set.replace(3, 99));
        assert_eq!(set.as_slice(), &[44, 81, 3]);
    }

    #[test]
    fn duplicates_are_permitted() {
        let mut set = TrackedKeySet::new(vec![44, 81, 3]);
        assert!(set.replace(2, 44));
        assert_eq!(set.as_slice(), &[44, 81, 44]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn reseed_requires_same_length() {
        let mut set = TrackedKeySet::new(vec![44, 81, 3]);
        assert!(!set.reseed(&[1, 2]));
        assert!(set.reseed(&[1, 16, 63]));
        assert_eq!(set.as_slice(), &[1, 16, 63]);
    }
}
