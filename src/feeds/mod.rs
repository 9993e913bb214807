//! Feed-specific readers built on the extraction engine
//!
//! Each function opens one URL through a [`Transport`](crate::source::Transport),
//! runs the matching extractor and closes the source on every path.

pub mod laps;
pub mod session;
pub mod standings;

pub use laps::fetch_latest_lap;
pub use session::{classification_entry, fetch_event_info, fetch_top_drivers};
pub use standings::{constructor_standing_row, driver_standing_row, fetch_standings};
