//! Playback of walkthrough scripts.
//!
//! - [`PlaybackController`] - position, memory mirror and the
//!   advance / retreat / reset transitions
//! - [`highlight`] - which memory cells the current step touches

pub mod controller;
pub mod highlight;

pub use controller::{PlaybackController, PlaybackState, Transition};
pub use highlight::{cell_highlight, is_bus_targeting, CellHighlight};
