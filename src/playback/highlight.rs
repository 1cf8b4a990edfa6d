//! Per-cell highlight predicates.
//!
//! A cell is highlighted when the current step's bus transfer selects it by
//! address, carries data read from or written to it, or when the step writes
//! to it. Matches are always made on the address a step declares, never by
//! comparing a bus value against cell content.

use crate::script::{BusSignal, MemoryCell, Step};
use serde::Serialize;

/// Why a memory cell is highlighted in a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellHighlight {
    /// Not involved in this step.
    None,
    /// Selected by the address bus.
    Address,
    /// Source or destination of a data-bus transfer.
    Data,
    /// Written by this step.
    Write,
}

impl CellHighlight {
    pub fn is_highlighted(self) -> bool {
        self != CellHighlight::None
    }
}

/// Classify how `step` involves `cell`.
///
/// Writes take precedence over bus involvement so the view can show the
/// store distinctly from an ordinary read.
pub fn cell_highlight(step: &Step, cell: &MemoryCell) -> CellHighlight {
    if step.memory_updates.iter().any(|u| u.address == cell.address) {
        return CellHighlight::Write;
    }

    let Some(transfer) = step.bus_transfer.as_ref().filter(|t| t.touches_memory()) else {
        return CellHighlight::None;
    };

    match transfer.signal {
        BusSignal::Address { address } if address == cell.address => CellHighlight::Address,
        BusSignal::Data { cell: Some(address), .. } if address == cell.address => CellHighlight::Data,
        _ => CellHighlight::None,
    }
}

/// Whether the step's bus transfer or memory writes target `cell`.
pub fn is_bus_targeting(step: &Step, cell: &MemoryCell) -> bool {
    cell_highlight(step, cell).is_highlighted()
}
