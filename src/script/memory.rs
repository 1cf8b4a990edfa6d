//! Memory cells and the memory mirror.
//!
//! The walkthrough machine has a small, closed set of addressable cells.
//! The set of addresses is fixed by the seed table; playback only ever
//! overwrites the content of cells that already exist.

use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A memory address.
pub type Address = u32;

/// What a memory cell holds, for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Instruction,
    Data,
    Empty,
}

/// One addressable memory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCell {
    pub address: Address,
    pub content: String,
    pub kind: CellKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MemoryCell {
    /// An instruction cell.
    pub fn instruction(address: Address, content: &str, description: &str) -> Self {
        Self {
            address,
            content: content.to_string(),
            kind: CellKind::Instruction,
            description: Some(description.to_string()),
        }
    }

    /// A data cell.
    pub fn data(address: Address, content: &str, description: &str) -> Self {
        Self {
            address,
            content: content.to_string(),
            kind: CellKind::Data,
            description: Some(description.to_string()),
        }
    }

    /// An unused cell.
    pub fn empty(address: Address) -> Self {
        Self {
            address,
            content: String::new(),
            kind: CellKind::Empty,
            description: None,
        }
    }
}

/// A single declared write into memory, attached to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUpdate {
    pub address: Address,
    pub value: String,
}

impl MemoryUpdate {
    pub fn new(address: Address, value: &str) -> Self {
        Self {
            address,
            value: value.to_string(),
        }
    }
}

/// Memory contents keyed by address.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    cells: BTreeMap<Address, MemoryCell>,
}

impl Memory {
    /// Build memory from a table of cells.
    ///
    /// Fails if two cells share an address.
    pub fn from_cells<I>(cells: I) -> Result<Self, MemoryError>
    where
        I: IntoIterator<Item = MemoryCell>,
    {
        let mut map = BTreeMap::new();
        for cell in cells {
            let address = cell.address;
            if map.insert(address, cell).is_some() {
                return Err(MemoryError::DuplicateAddress(address));
            }
        }
        Ok(Self { cells: map })
    }

    /// Look up a cell.
    pub fn get(&self, address: Address) -> Option<&MemoryCell> {
        self.cells.get(&address)
    }

    /// Whether the address exists.
    pub fn contains(&self, address: Address) -> bool {
        self.cells.contains_key(&address)
    }

    /// Overwrite the content of an existing cell.
    pub fn apply(&mut self, update: &MemoryUpdate) -> Result<(), MemoryError> {
        let cell = self
            .cells
            .get_mut(&update.address)
            .ok_or(MemoryError::UnknownAddress(update.address))?;
        cell.content.clone_from(&update.value);
        Ok(())
    }

    /// Cells in address order.
    pub fn cells(&self) -> impl Iterator<Item = &MemoryCell> {
        self.cells.values()
    }

    /// Owned copy of all cells in address order.
    pub fn snapshot(&self) -> Vec<MemoryCell> {
        self.cells.values().cloned().collect()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show occupied cells
        let occupied: Vec<_> = self
            .cells
            .values()
            .filter(|cell| !cell.content.is_empty())
            .map(|cell| (cell.address, cell.content.as_str()))
            .collect();

        f.debug_struct("Memory")
            .field("occupied", &occupied)
            .field("total_cells", &self.cells.len())
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("address {0} is not in the memory table")]
    UnknownAddress(Address),

    #[error("address {0} appears more than once in the memory table")]
    DuplicateAddress(Address),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Memory {
        Memory::from_cells([
            MemoryCell::instruction(0, "HALT", "Stop"),
            MemoryCell::data(1, "7", "Seven"),
            MemoryCell::empty(2),
        ])
        .unwrap()
    }

    #[test]
    fn test_apply_overwrites_content_only() {
        let mut mem = small();
        mem.apply(&MemoryUpdate::new(1, "9")).unwrap();

        let cell = mem.get(1).unwrap();
        assert_eq!(cell.content, "9");
        assert_eq!(cell.kind, CellKind::Data);
        assert_eq!(cell.description.as_deref(), Some("Seven"));
    }

    #[test]
    fn test_apply_unknown_address() {
        let mut mem = small();
        let before = mem.clone();

        assert_eq!(
            mem.apply(&MemoryUpdate::new(40, "1")),
            Err(MemoryError::UnknownAddress(40))
        );
        assert_eq!(mem, before);
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let result = Memory::from_cells([MemoryCell::empty(3), MemoryCell::empty(3)]);
        assert_eq!(result, Err(MemoryError::DuplicateAddress(3)));
    }

    #[test]
    fn test_snapshot_is_address_ordered() {
        let mem = Memory::from_cells([
            MemoryCell::empty(5),
            MemoryCell::empty(1),
            MemoryCell::empty(3),
        ])
        .unwrap();

        let addrs: Vec<_> = mem.snapshot().iter().map(|c| c.address).collect();
        assert_eq!(addrs, vec![1, 3, 5]);
    }
}
