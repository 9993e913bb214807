//! Streaming top-K scanner for arrays inside larger documents
//!
//! [`RankedScanner`] reads a document chunk by chunk in two phases:
//!
//! 1. **Locate** the target array: roll a small header buffer over the stream
//!    looking for the quoted key, then for the `[` that follows it. While the
//!    key is missing the buffer is trimmed to twice the key literal's length,
//!    enough that a key split across chunks is still found; while looking for
//!    `[` it is trimmed to 64 bytes.
//! 2. **Stream** the array's elements through an [`ObjectSplitter`], decoding
//!    each complete object, ranking it and keeping only the best `capacity`
//!    rows in a [`RankedTopK`].
//!
//! The closing `]` ends the scan without reading the rest of the stream. A
//! stream that ends early still yields whatever parsed.

use serde_json::Value;
use tracing::{debug, trace};

use super::splitter::{Boundary, ObjectSplitter};
use super::topk::{RankEntry, RankedTopK};
use crate::source::{ByteSource, FeedReader};
use crate::{BoardError, Result};

/// Bytes kept while searching for the `[` after a located key.
const BRACKET_WINDOW: usize = 64;

/// How the target array is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayLocator {
    /// The document itself is the array
    TopLevel,
    /// The array under the first of these keys to appear in the stream.
    /// A document that is itself an array is accepted as well.
    Keys(Vec<String>),
}

impl ArrayLocator {
    /// Array under a single key, e.g. `"DriverStandings"`.
    pub fn key(name: impl Into<String>) -> Self {
        ArrayLocator::Keys(vec![name.into()])
    }
}

#[derive(Debug)]
enum Phase {
    /// Waiting for the first significant byte to tell an array document from an object
    Sniffing,
    SeekingKey,
    SeekingBracket,
    Streaming,
    Finished,
}

/// Counters reported when a scan completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub bytes_read: usize,
    pub elements: usize,
    pub ranked: usize,
    pub skipped: usize,
    pub malformed: usize,
    pub closed: bool,
}

/// Two-phase streaming scanner producing a ranked top-K.
///
/// `rank` receives each decoded element and its 1-based arrival position and
/// returns `(row, rank)`; a `None` row skips the element. Arrival positions
/// count every element, so skipping one never shifts another's tie-break.
pub struct RankedScanner<R, F> {
    literals: Vec<Vec<u8>>,
    key_window: usize,
    phase: Phase,
    header: Vec<u8>,
    splitter: ObjectSplitter,
    top: RankedTopK<R>,
    rank: F,
    chunk_bytes: usize,
    stats: ScanStats,
}

impl<R, F> RankedScanner<R, F>
where
    F: FnMut(&Value, usize) -> (Option<R>, i64) + Send,
    R: Send,
{
    pub fn new(
        locator: ArrayLocator,
        capacity: usize,
        chunk_bytes: usize,
        max_object_bytes: usize,
        rank: F,
    ) -> Self {
        let (literals, phase) = match locator {
            ArrayLocator::TopLevel => (Vec::new(), Phase::SeekingBracket),
            ArrayLocator::Keys(keys) => (
                keys.iter().map(|key| format!("\"{}\"", key).into_bytes()).collect::<Vec<_>>(),
                Phase::Sniffing,
            ),
        };
        let key_window = 2 * literals.iter().map(Vec::len).max().unwrap_or(0);

        Self {
            literals,
            key_window,
            phase,
            header: Vec::new(),
            splitter: ObjectSplitter::new(max_object_bytes),
            top: RankedTopK::new(capacity),
            rank,
            chunk_bytes,
            stats: ScanStats::default(),
        }
    }

    /// True once the array has closed; further input is ignored.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Feed one chunk. Returns true once the array has closed.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<bool> {
        self.stats.bytes_read += chunk.len();
        match self.phase {
            Phase::Finished => {}
            Phase::Streaming => self.stream(chunk)?,
            Phase::Sniffing | Phase::SeekingKey | Phase::SeekingBracket => {
                self.header
                    .try_reserve(chunk.len())
                    .map_err(|e| BoardError::out_of_memory("array header", e))?;
                self.header.extend_from_slice(chunk);
                self.locate()?;
            }
        }
        Ok(self.is_finished())
    }

    fn locate(&mut self) -> Result<()> {
        if matches!(self.phase, Phase::Sniffing) {
            match self.header.iter().copied().find(|b| !b.is_ascii_whitespace()) {
                None => {
                    self.header.clear();
                    return Ok(());
                }
                Some(b'[') => self.phase = Phase::SeekingBracket,
                Some(_) => self.phase = Phase::SeekingKey,
            }
        }

        if matches!(self.phase, Phase::SeekingKey) {
            match self.find_key() {
                Some(end) => {
                    trace!(offset = end, "Located array key");
                    self.header.drain(..end);
                    self.phase = Phase::SeekingBracket;
                }
                None => {
                    trim_to_last(&mut self.header, self.key_window);
                    return Ok(());
                }
            }
        }

        if matches!(self.phase, Phase::SeekingBracket) {
            match self.header.iter().position(|&b| b == b'[') {
                Some(open) => {
                    let rest = self.header.split_off(open + 1);
                    self.header = Vec::new();
                    self.phase = Phase::Streaming;
                    debug!("Streaming array elements");
                    self.stream(&rest)?;
                }
                None => trim_to_last(&mut self.header, BRACKET_WINDOW),
            }
        }
        Ok(())
    }

    /// Offset just past the earliest key literal in the header.
    fn find_key(&self) -> Option<usize> {
        self.literals
            .iter()
            .filter_map(|literal| {
                self.header
                    .windows(literal.len())
                    .position(|window| window == literal.as_slice())
                    .map(|start| start + literal.len())
            })
            .min()
    }

    fn stream(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            match self.splitter.push(byte)? {
                None => {}
                Some(Boundary::Object(raw)) => self.accept(&raw),
                Some(Boundary::Oversized { bytes }) => {
                    self.stats.elements += 1;
                    self.stats.malformed += 1;
                    trace!(bytes, "Skipping oversized element");
                }
                Some(Boundary::ArrayClose) => {
                    self.stats.closed = true;
                    self.phase = Phase::Finished;
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn accept(&mut self, raw: &[u8]) {
        self.stats.elements += 1;
        let arrival = self.stats.elements;
        match serde_json::from_slice::<Value>(raw) {
            Ok(value) => match (self.rank)(&value, arrival) {
                (Some(row), rank) => {
                    self.top.insert(rank, arrival, row);
                    self.stats.ranked += 1;
                }
                (None, _) => self.stats.skipped += 1,
            },
            Err(e) => {
                trace!(arrival, error = %e, "Skipping malformed element");
                self.stats.malformed += 1;
            }
        }
    }

    /// Release buffers held by a failed scan.
    pub fn reclaim(&mut self) {
        self.header = Vec::new();
        self.splitter.reclaim();
        self.top.shrink();
    }

    /// Sorted top rows, or `NoData` when nothing qualified.
    pub fn finish(self) -> Result<Vec<RankEntry<R>>> {
        let stats = self.stats;
        debug!(
            bytes = stats.bytes_read,
            elements = stats.elements,
            ranked = stats.ranked,
            skipped = stats.skipped,
            malformed = stats.malformed,
            closed = stats.closed,
            "Scan complete"
        );
        if self.top.is_empty() {
            return Err(BoardError::no_data(if stats.elements == 0 {
                "no records in feed"
            } else {
                "no qualifying records in feed"
            }));
        }
        Ok(self.top.finalize())
    }
}

fn trim_to_last(buffer: &mut Vec<u8>, keep: usize) {
    if buffer.len() > keep {
        buffer.drain(..buffer.len() - keep);
    }
}

#[async_trait::async_trait]
impl<R, F> FeedReader for RankedScanner<R, F>
where
    F: FnMut(&Value, usize) -> (Option<R>, i64) + Send,
    R: Send,
{
    type Output = Vec<RankEntry<R>>;

    async fn read_feed(mut self, source: &mut dyn ByteSource) -> Result<Self::Output> {
        loop {
            let chunk = source.read(self.chunk_bytes).await?;
            if chunk.is_empty() {
                trace!("Stream ended before array closed");
                break;
            }
            if self.feed(&chunk)? {
                break;
            }
        }
        self.finish()
    }
}
