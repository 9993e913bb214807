//! Core types for lap telemetry and standings data.
//!
//! ## Architecture
//!
//! - [`TrackedKeySet`] is the fixed-length list of drivers polled each cycle
//! - [`LapResult`] is one driver's latest lap, with absent fields kept distinct from zero
//! - [`ResultSnapshot`] maps every tracked driver to its latest result (or none) and
//!   gates home screen redraws by structural equality
//! - [`EventInfoSnapshot`] describes the running event and is compared the same way
//! - [`FormattedRow`] is a pre-formatted four-column display row
//! - [`value`] coerces loosely-typed JSON fields (numbers or numeric strings)

mod event;
mod lap;
mod row;
mod snapshot;
mod tracked;
pub mod value;

pub use event::EventInfoSnapshot;
pub use lap::{LapRecord, LapResult};
pub use row::FormattedRow;
pub use snapshot::ResultSnapshot;
pub use tracked::TrackedKeySet;

/// Opaque tracked identifier (a permanent car number).
pub type DriverNumber = u32;
