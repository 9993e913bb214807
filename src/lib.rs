//! Live lap-time board for a small four-button display.
//!
//! Pitboard polls a lap telemetry API for a handful of tracked drivers, keeps
//! the latest lap of each in a result cache and redraws the screen only when
//! something changed. Championship standings are fetched on demand and paged
//! through with the buttons.
//!
//! # Features
//!
//! - **Bounded memory**: feeds are streamed; lap feeds keep only a trailing
//!   window and standings keep only the best K rows
//! - **Tolerant parsing**: truncated or malformed array elements are skipped
//! - **Redraw gating**: the home screen is drawn only when results change
//! - **Responsive input**: a press stops an in-flight poll cycle before its next fetch
//!
//! Hardware stays outside the crate. Plug in a [`Transport`], a [`Display`],
//! [`Buttons`] and a [`Clock`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pitboard::sources::MemoryTransport;
//! use pitboard::{Board, BoardConfig, Button, Buttons, Display, Screen, TokioClock};
//!
//! struct Terminal;
//!
//! impl Display for Terminal {
//!     fn render(&mut self, screen: &Screen) {
//!         println!("{:?}", screen);
//!     }
//! }
//!
//! struct NoButtons;
//!
//! impl Buttons for NoButtons {
//!     fn is_pressed(&self, _button: Button) -> bool {
//!         false
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> pitboard::Result<()> {
//!     let transport = MemoryTransport::new(256);
//!     let mut board = Board::new(BoardConfig::default(), transport, Terminal, NoButtons, TokioClock)?;
//!     board.run().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Example (ranked scan)
//!
//! ```rust
//! use pitboard::extract::{ArrayLocator, RankedScanner};
//! use pitboard::types::value::first_int;
//!
//! let mut scanner = RankedScanner::new(
//!     ArrayLocator::key("DriverStandings"),
//!     2,
//!     64,
//!     4096,
//!     |entry: &serde_json::Value, arrival: usize| {
//!         let rank = first_int(entry, &["position"]).unwrap_or(arrival as i64);
//!         (entry.get("code").and_then(|code| code.as_str()).map(str::to_string), rank)
//!     },
//! );
//! scanner.feed(br#"{"DriverStandings":[{"position":"2","code":"NOR"},{"position":"1","code":"PIA"},{"position":"3","code":"VER"}]}"#)?;
//! let rows: Vec<String> = scanner.finish()?.into_iter().map(|entry| entry.row).collect();
//! assert_eq!(rows, ["PIA", "NOR"]);
//! # Ok::<(), pitboard::BoardError>(())
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

pub mod config;
pub mod roster;

// Streaming extraction
pub mod extract;
pub mod source;
pub mod sources;

// Feeds and presentation
pub mod feeds;
pub mod format;

// Session control
pub mod board;
pub mod display;
pub mod input;
pub mod nav;

// Core exports
pub use error::*;
pub use types::*;

pub use board::{Board, InputOutcome};
pub use config::{BoardConfig, StandingsKind};
pub use display::{Display, Screen, Tone};
pub use input::{Button, Buttons, Clock, TokioClock};
pub use nav::{NavAction, NavigationState};
pub use source::{ByteSource, FeedReader, Transport, fetch_feed};
