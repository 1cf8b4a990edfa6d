//! # Fetch-Decode-Execute Walkthrough
//!
//! A step-by-step, animated walkthrough of the instruction cycle of a small
//! accumulator CPU.
//!
//! The walkthrough replays an authored script rather than emulating a CPU:
//! every step states the registers, the highlighted components, the bus
//! transfer and any memory writes. The playback controller moves through
//! the script and keeps a memory mirror consistent with the current step.

pub mod script;
pub mod playback;
pub mod config;
pub mod logging;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use script::{ScriptStore, ScriptError, Step, Phase, Component, MemoryCell, load_script, save_script};
pub use playback::{PlaybackController, PlaybackState, Transition, CellHighlight};
pub use config::Config;

#[cfg(feature = "tui")]
pub use tui::run_walkthrough;
