//! The script store: validated, read-only catalog of steps.

use super::isa::{Instruction, InstructionParseError};
use super::memory::{Address, CellKind, Memory, MemoryCell, MemoryError};
use super::step::Step;
use thiserror::Error;
use tracing::{info, warn};

/// An immutable, validated walkthrough script.
///
/// Once constructed, every address a step refers to is known to exist in
/// the seed table, so playback never has to handle a missing cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStore {
    seed: Memory,
    steps: Vec<Step>,
}

impl ScriptStore {
    /// Validate and build a script from a seed table and its steps.
    pub fn new(seed: Vec<MemoryCell>, steps: Vec<Step>) -> Result<Self, ScriptError> {
        let result = Self::validate(seed, steps);
        match &result {
            Ok(store) => info!(
                steps = store.len(),
                cells = store.seed.len(),
                "script validated"
            ),
            Err(e) => warn!(error = %e, "script rejected"),
        }
        result
    }

    fn validate(seed: Vec<MemoryCell>, steps: Vec<Step>) -> Result<Self, ScriptError> {
        if steps.is_empty() {
            return Err(ScriptError::Empty);
        }

        let seed = Memory::from_cells(seed).map_err(|e| match e {
            MemoryError::DuplicateAddress(address) => ScriptError::DuplicateAddress(address),
            MemoryError::UnknownAddress(address) => ScriptError::InvariantViolation { step: 0, address },
        })?;

        for cell in seed.cells().filter(|c| c.kind == CellKind::Instruction) {
            cell.content
                .parse::<Instruction>()
                .map_err(|source| ScriptError::MalformedInstruction {
                    address: cell.address,
                    source,
                })?;
        }

        for (position, step) in steps.iter().enumerate() {
            if step.index != position {
                return Err(ScriptError::IndexMismatch {
                    position,
                    index: step.index,
                });
            }
            if let Some(address) = step.referenced_addresses().find(|a| !seed.contains(*a)) {
                return Err(ScriptError::InvariantViolation {
                    step: position,
                    address,
                });
            }
        }

        Ok(Self { seed, steps })
    }

    /// The step at a position.
    pub fn step_at(&self, index: usize) -> Result<&Step, ScriptError> {
        self.steps.get(index).ok_or(ScriptError::OutOfRange {
            index,
            len: self.steps.len(),
        })
    }

    /// Number of steps. Never zero.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a validated store.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The memory table playback starts from.
    pub fn seed(&self) -> &Memory {
        &self.seed
    }

    /// All steps in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Memory as it stands at `position`: the seed with the writes of
    /// steps `1..=position` applied in order.
    pub fn memory_at(&self, position: usize) -> Result<Memory, ScriptError> {
        if position >= self.steps.len() {
            return Err(ScriptError::OutOfRange {
                index: position,
                len: self.steps.len(),
            });
        }

        let mut memory = self.seed.clone();
        for step in &self.steps[1..=position] {
            for update in &step.memory_updates {
                memory
                    .apply(update)
                    .map_err(|_| ScriptError::InvariantViolation {
                        step: step.index,
                        address: update.address,
                    })?;
            }
        }
        Ok(memory)
    }
}

/// Errors raised while building or indexing a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("step index {index} out of range (script has {len} steps)")]
    OutOfRange { index: usize, len: usize },

    #[error("step {step} refers to address {address}, which is not in the seed table")]
    InvariantViolation { step: usize, address: Address },

    #[error("script has no steps")]
    Empty,

    #[error("seed table lists address {0} more than once")]
    DuplicateAddress(Address),

    #[error("step at position {position} declares index {index}")]
    IndexMismatch { position: usize, index: usize },

    #[error("instruction cell {address} does not hold a valid instruction: {source}")]
    MalformedInstruction {
        address: Address,
        #[source]
        source: InstructionParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::step::Phase;

    fn seed() -> Vec<MemoryCell> {
        vec![
            MemoryCell::instruction(0, "STORE 1", "Store"),
            MemoryCell::data(1, "0", "Target"),
        ]
    }

    fn steps() -> Vec<Step> {
        vec![
            Step::new(Phase::Idle, "start", "").at(0),
            Step::new(Phase::Execute, "store", "").at(1).write(1, "4"),
            Step::new(Phase::Idle, "done", "").at(2),
        ]
    }

    #[test]
    fn test_valid_store() {
        let store = ScriptStore::new(seed(), steps()).unwrap();
        assert_eq!(store.len(), 3);
        assert!(!store.is_empty());
        assert_eq!(store.step_at(1).unwrap().title, "store");
    }

    #[test]
    fn test_step_at_out_of_range() {
        let store = ScriptStore::new(seed(), steps()).unwrap();
        assert_eq!(
            store.step_at(3),
            Err(ScriptError::OutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_unknown_write_address_rejected_at_load() {
        let mut bad = steps();
        bad[2] = Step::new(Phase::Execute, "stray", "").at(2).write(99, "1");

        assert_eq!(
            ScriptStore::new(seed(), bad),
            Err(ScriptError::InvariantViolation { step: 2, address: 99 })
        );
    }

    #[test]
    fn test_unknown_bus_cell_rejected_at_load() {
        use crate::script::step::{BusTransfer, Component};

        let mut bad = steps();
        bad[1] = Step::new(Phase::Fetch, "fetch", "")
            .at(1)
            .bus(BusTransfer::address(Component::ProgramCounter, Component::Memory, 7));

        assert_eq!(
            ScriptStore::new(seed(), bad),
            Err(ScriptError::InvariantViolation { step: 1, address: 7 })
        );
    }

    #[test]
    fn test_empty_script_rejected() {
        assert_eq!(ScriptStore::new(seed(), Vec::new()), Err(ScriptError::Empty));
    }

    #[test]
    fn test_index_mismatch_rejected() {
        let mut bad = steps();
        bad[1].index = 5;
        assert_eq!(
            ScriptStore::new(seed(), bad),
            Err(ScriptError::IndexMismatch { position: 1, index: 5 })
        );
    }

    #[test]
    fn test_malformed_instruction_rejected() {
        let mut bad_seed = seed();
        bad_seed[0] = MemoryCell::instruction(0, "JUMP 1", "Nope");
        assert!(matches!(
            ScriptStore::new(bad_seed, steps()),
            Err(ScriptError::MalformedInstruction { address: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_seed_address_rejected() {
        let mut bad_seed = seed();
        bad_seed.push(MemoryCell::empty(1));
        assert_eq!(
            ScriptStore::new(bad_seed, steps()),
            Err(ScriptError::DuplicateAddress(1))
        );
    }

    #[test]
    fn test_memory_at_replays_writes() {
        let store = ScriptStore::new(seed(), steps()).unwrap();
        assert_eq!(store.memory_at(0).unwrap().get(1).unwrap().content, "0");
        assert_eq!(store.memory_at(1).unwrap().get(1).unwrap().content, "4");
        assert_eq!(store.memory_at(2).unwrap().get(1).unwrap().content, "4");
        assert!(store.memory_at(3).is_err());
    }
}
