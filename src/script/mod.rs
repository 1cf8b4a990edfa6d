//! Walkthrough scripts.
//!
//! A script is an authored, read-only trace of the fetch-decode-execute
//! cycle:
//! - a seed memory table ([`MemoryCell`])
//! - an ordered list of [`Step`]s, each a complete snapshot of registers,
//!   highlighted components, the bus transfer and any memory writes
//!
//! Nothing is computed from one step to the next; the register values are
//! written down by the author.

pub mod builtin;
pub mod file;
pub mod isa;
pub mod memory;
pub mod step;
pub mod store;

pub use file::{load_script, save_script, parse_script, script_to_json, ScriptDocument, ScriptFileError};
pub use isa::{Instruction, InstructionParseError, Opcode};
pub use memory::{Address, CellKind, Memory, MemoryCell, MemoryError, MemoryUpdate};
pub use step::{BusSignal, BusTransfer, Component, Phase, Registers, Step};
pub use store::{ScriptError, ScriptStore};
