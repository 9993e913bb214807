//! # Bounded-Memory JSON Extraction
//!
//! Feeds arrive as streamed JSON arrays that can be much larger than the
//! memory the board is willing to spend on them. Nothing here materializes a
//! whole document.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 Extraction Pipeline                    │
//! │                                                        │
//! │  ByteSource ──► TailExtractor ──► latest record        │
//! │      │          (trailing window)                      │
//! │      │                                                 │
//! │      └────────► RankedScanner ──► RankedTopK ──► rows  │
//! │                 (locate key, stream elements)          │
//! │                        │                               │
//! │                        ▼                               │
//! │                 ObjectSplitter (shared)                │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Handling
//!
//! - Malformed or truncated elements are skipped; they never fail a scan
//! - A scan that ranked nothing fails with [`BoardError::NoData`](crate::BoardError::NoData)
//! - Buffer growth uses `try_reserve`, so allocation failure is a
//!   [`BoardError::ResourceExhausted`](crate::BoardError::ResourceExhausted) the caller can retry

pub mod scanner;
pub mod splitter;
pub mod tail;
pub mod topk;

pub use scanner::{ArrayLocator, RankedScanner, ScanStats};
pub use splitter::{Boundary, ObjectSplitter};
pub use tail::{TailExtractor, decode_tail};
pub use topk::{RankEntry, RankedTopK};
