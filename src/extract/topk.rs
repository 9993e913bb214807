//! Bounded best-of collection ordered by rank

use serde::Serialize;

/// One ranked row.
///
/// `rank` is the sort key (lower is better); `sequence` is the element's
/// arrival position in the feed and only breaks ties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry<R> {
    pub rank: i64,
    pub sequence: usize,
    pub row: R,
}

/// Holds at most `capacity` entries; overflow evicts the worst-ranked.
#[derive(Debug, Clone)]
pub struct RankedTopK<R> {
    capacity: usize,
    entries: Vec<RankEntry<R>>,
}

impl<R> RankedTopK<R> {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: Vec::with_capacity(capacity.saturating_add(1)) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry, evicting the worst one if over capacity.
    pub fn insert(&mut self, rank: i64, sequence: usize, row: R) {
        self.entries.push(RankEntry { rank, sequence, row });
        if self.entries.len() > self.capacity {
            self.sort();
            self.entries.truncate(self.capacity);
        }
    }

    fn sort(&mut self) {
        self.entries.sort_by_key(|entry| (entry.rank, entry.sequence));
    }

    /// Sorted ascending by `(rank, sequence)`, at most `capacity` long.
    pub fn finalize(mut self) -> Vec<RankEntry<R>> {
        self.sort();
        self.entries.truncate(self.capacity);
        self.entries
    }

    pub(crate) fn shrink(&mut self) {
        self.entries.shrink_to_fit();
    }
}
