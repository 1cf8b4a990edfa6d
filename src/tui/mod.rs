//! Terminal walkthrough.
//!
//! An interactive terminal view of the fetch-decode-execute cycle with:
//! - CPU registers, control unit and ALU, lit when active
//! - Address and data bus transfers
//! - Memory view with per-cell highlighting
//! - Step/back/reset/autoplay controls

mod app;
mod ui;

pub use app::{WalkthroughApp, run_walkthrough};
