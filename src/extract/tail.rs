//! Latest-record extraction from the tail of a stream
//!
//! Lap feeds are arrays ordered oldest first and can be far larger than the
//! board can hold. [`TailExtractor`] keeps only a trailing window of the body,
//! then walks that window forward with the same [`ObjectSplitter`] the ranked
//! scanner uses and returns the last object the selector accepts.
//!
//! Walking begins at the first `{` in the window, which drops the partial
//! record the window usually starts inside, and moves on to later braces when
//! that start turns out to sit inside a string. Nested objects are handled by
//! the splitter's depth tracking.

use std::borrow::Cow;
use std::collections::VecDeque;

use serde_json::Value;
use tracing::{debug, trace};

use super::splitter::{Boundary, ObjectSplitter};
use crate::source::{ByteSource, FeedReader};
use crate::{BoardError, Result};

/// Trailing-window extractor returning the most recent accepted record.
pub struct TailExtractor<F> {
    tail_bytes: usize,
    chunk_bytes: usize,
    max_object_bytes: usize,
    select: F,
}

impl<T, F> TailExtractor<F>
where
    F: FnMut(&Value) -> Option<T> + Send,
    T: Send,
{
    /// `select` returns `Some` for records that qualify.
    pub fn new(tail_bytes: usize, chunk_bytes: usize, max_object_bytes: usize, select: F) -> Self {
        Self { tail_bytes, chunk_bytes, max_object_bytes, select }
    }

    /// Find the last accepted record in an already retained tail.
    ///
    /// The window can begin inside a string, where a `{` is text rather than
    /// structure. A walk that finds nothing or ends inside a string or object
    /// is retried from the next `{`; the record ending furthest into the
    /// window across all walks is returned.
    pub fn extract_from_tail(&mut self, tail: &[u8]) -> Result<T> {
        if tail.is_empty() {
            return Err(BoardError::no_data("empty response body"));
        }

        let text = decode_tail(tail);
        let bytes = text.as_bytes();
        let mut starts = bytes.iter().enumerate().filter(|&(_, &b)| b == b'{').map(|(i, _)| i).peekable();
        if starts.peek().is_none() {
            return Err(BoardError::no_data("no record in response tail"));
        }

        let mut best: Option<(usize, T)> = None;
        for (attempt, start) in starts.enumerate() {
            match self.walk(bytes, start)? {
                Walk { latest: Some((_, record)), clean: true } => return Ok(record),
                Walk { latest: Some((end, record)), clean: false } => {
                    if best.as_ref().is_none_or(|(best_end, _)| end > *best_end) {
                        best = Some((end, record));
                    }
                }
                Walk { latest: None, .. } => {}
            }
            trace!(attempt, start, "Retrying tail walk from next brace");
        }

        best.map(|(_, record)| record).ok_or_else(|| BoardError::no_data("no usable record"))
    }

    fn walk(&mut self, bytes: &[u8], start: usize) -> Result<Walk<T>> {
        let mut splitter = ObjectSplitter::new(self.max_object_bytes);
        let mut latest = None;
        let mut candidates = 0usize;
        let mut rejected = 0usize;

        for (offset, &byte) in bytes.iter().enumerate().skip(start) {
            match splitter.push(byte)? {
                Some(Boundary::Object(raw)) => {
                    candidates += 1;
                    match serde_json::from_slice::<Value>(&raw) {
                        Ok(value) => match (self.select)(&value) {
                            Some(record) => latest = Some((offset, record)),
                            None => rejected += 1,
                        },
                        Err(e) => {
                            trace!(error = %e, "Skipping malformed tail candidate");
                            rejected += 1;
                        }
                    }
                }
                Some(Boundary::Oversized { bytes }) => {
                    trace!(bytes, "Skipping oversized tail candidate");
                    rejected += 1;
                }
                // Truncated windows can contain closers of the partial leading record
                Some(Boundary::ArrayClose) | None => {}
            }
        }

        let clean = splitter.is_between_elements();
        debug!(start, candidates, rejected, clean, found = latest.is_some(), "Scanned response tail");
        Ok(Walk { latest, clean })
    }
}

struct Walk<T> {
    /// Accepted record and the offset of its closing brace
    latest: Option<(usize, T)>,
    /// The walk ended outside any string or object
    clean: bool,
}

#[async_trait::async_trait]
impl<T, F> FeedReader for TailExtractor<F>
where
    F: FnMut(&Value) -> Option<T> + Send,
    T: Send,
{
    type Output = T;

    async fn read_feed(mut self, source: &mut dyn ByteSource) -> Result<T> {
        let mut tail: VecDeque<u8> = VecDeque::new();
        let mut total = 0usize;

        loop {
            let chunk = source.read(self.chunk_bytes).await?;
            if chunk.is_empty() {
                break;
            }
            total += chunk.len();
            // Only the newest tail_bytes of an oversized chunk can survive
            let keep = &chunk[chunk.len().saturating_sub(self.tail_bytes)..];
            let overflow = (tail.len() + keep.len()).saturating_sub(self.tail_bytes);
            tail.drain(..overflow);
            tail.try_reserve(keep.len()).map_err(|e| BoardError::out_of_memory("response tail", e))?;
            tail.extend(keep);
        }

        trace!(total, retained = tail.len(), "Response body consumed");
        self.extract_from_tail(tail.make_contiguous())
    }
}

/// Decode a retained window as UTF-8, dropping the partial characters a byte
/// cut can leave at either edge.
pub fn decode_tail(bytes: &[u8]) -> Cow<'_, str> {
    let start = bytes.iter().position(|&b| !is_continuation(b)).unwrap_or(bytes.len());
    let mut trimmed = &bytes[start..];

    let search_from = trimmed.len().saturating_sub(4);
    if let Some(offset) = trimmed[search_from..].iter().rposition(|&b| !is_continuation(b)) {
        let lead = search_from + offset;
        if lead + sequence_width(trimmed[lead]) > trimmed.len() {
            trimmed = &trimmed[..lead];
        }
    }

    String::from_utf8_lossy(trimmed)
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

fn sequence_width(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}
