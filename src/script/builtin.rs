//! The built-in walkthrough: `LOAD 10; ADD 11; STORE 12; HALT`.
//!
//! Memory holds the program at 0..=3 and the operands 3 and 5 at 10 and 11.
//! The trace walks every instruction through fetch, decode and execute and
//! ends with 8 stored at address 12.

use super::memory::MemoryCell;
use super::step::{BusTransfer, Component, Phase, Step};
use super::store::{ScriptError, ScriptStore};

use Component::{
    Accumulator as Acc, AddressBus, Alu, ControlUnit, DataBus, InstructionRegister as Ir,
    Memory as Mem, ProgramCounter as Pc,
};

/// Number of cells in the built-in memory table.
pub const MEMORY_SIZE: u32 = 16;

/// Seed memory table for the built-in program.
pub fn seed_table() -> Vec<MemoryCell> {
    (0..MEMORY_SIZE)
        .map(|address| match address {
            0 => MemoryCell::instruction(0, "LOAD 10", "Load the value at address 10 into ACC"),
            1 => MemoryCell::instruction(1, "ADD 11", "Add the value at address 11 to ACC"),
            2 => MemoryCell::instruction(2, "STORE 12", "Store ACC into address 12"),
            3 => MemoryCell::instruction(3, "HALT", "Stop execution"),
            10 => MemoryCell::data(10, "3", "First operand"),
            11 => MemoryCell::data(11, "5", "Second operand"),
            12 => MemoryCell::data(12, "0", "Result"),
            _ => MemoryCell::empty(address),
        })
        .collect()
}

/// The authored steps, indexed by position.
pub fn steps() -> Vec<Step> {
    let steps = vec![
        // ==================== Start ====================
        Step::new(
            Phase::Idle,
            "Ready",
            "The program LOAD 10, ADD 11, STORE 12, HALT sits in memory at addresses 0 to 3. \
             PC points at address 0 and the accumulator is empty.",
        )
        .active([Pc, Mem])
        .registers(0, "", 0),

        // ==================== LOAD 10 ====================
        Step::new(
            Phase::Fetch,
            "Fetch: send PC to memory",
            "The control unit places the PC value 0 on the address bus to select the next instruction.",
        )
        .active([Pc, AddressBus, Mem, ControlUnit])
        .bus(BusTransfer::address(Pc, Mem, 0))
        .registers(0, "", 0),
        Step::new(
            Phase::Fetch,
            "Fetch: read instruction",
            "Memory returns the contents of address 0, LOAD 10, over the data bus into the instruction register.",
        )
        .active([Mem, DataBus, Ir])
        .bus(BusTransfer::data_cell(Mem, Ir, "LOAD 10", 0))
        .registers(0, "LOAD 10", 0),
        Step::new(
            Phase::Fetch,
            "Fetch: increment PC",
            "PC advances to 1 so it points at the next instruction.",
        )
        .active([Pc])
        .registers(1, "LOAD 10", 0),
        Step::new(
            Phase::Decode,
            "Decode: LOAD 10",
            "The control unit decodes the instruction: LOAD copies the value at address 10 into the accumulator.",
        )
        .active([Ir, ControlUnit])
        .registers(1, "LOAD 10", 0),
        Step::new(
            Phase::Execute,
            "Execute: address operand",
            "The control unit puts address 10 on the address bus.",
        )
        .active([ControlUnit, AddressBus, Mem])
        .bus(BusTransfer::address(ControlUnit, Mem, 10))
        .registers(1, "LOAD 10", 0),
        Step::new(
            Phase::Execute,
            "Execute: load accumulator",
            "Memory sends the value 3 over the data bus and the accumulator now holds 3.",
        )
        .active([Mem, DataBus, Acc])
        .bus(BusTransfer::data_cell(Mem, Acc, "3", 10))
        .registers(1, "LOAD 10", 3),

        // ==================== ADD 11 ====================
        Step::new(
            Phase::Fetch,
            "Fetch: send PC to memory",
            "The next cycle begins. PC value 1 goes out on the address bus.",
        )
        .active([Pc, AddressBus, Mem, ControlUnit])
        .bus(BusTransfer::address(Pc, Mem, 1))
        .registers(1, "LOAD 10", 3),
        Step::new(
            Phase::Fetch,
            "Fetch: read instruction",
            "Memory returns ADD 11 into the instruction register.",
        )
        .active([Mem, DataBus, Ir])
        .bus(BusTransfer::data_cell(Mem, Ir, "ADD 11", 1))
        .registers(1, "ADD 11", 3),
        Step::new(
            Phase::Fetch,
            "Fetch: increment PC",
            "PC advances to 2.",
        )
        .active([Pc])
        .registers(2, "ADD 11", 3),
        Step::new(
            Phase::Decode,
            "Decode: ADD 11",
            "ADD adds the value at address 11 to the accumulator using the ALU.",
        )
        .active([Ir, ControlUnit])
        .registers(2, "ADD 11", 3),
        Step::new(
            Phase::Execute,
            "Execute: address operand",
            "The control unit puts address 11 on the address bus.",
        )
        .active([ControlUnit, AddressBus, Mem])
        .bus(BusTransfer::address(ControlUnit, Mem, 11))
        .registers(2, "ADD 11", 3),
        Step::new(
            Phase::Execute,
            "Execute: operand to ALU",
            "Memory sends the value 5 over the data bus to the ALU. The accumulator supplies the other input, 3.",
        )
        .active([Mem, DataBus, Alu, Acc])
        .bus(BusTransfer::data_cell(Mem, Alu, "5", 11))
        .registers(2, "ADD 11", 3),
        Step::new(
            Phase::Execute,
            "Execute: add",
            "The ALU adds 3 + 5 and writes the result 8 back into the accumulator.",
        )
        .active([Alu, Acc])
        .bus(BusTransfer::data(Alu, Acc, "8"))
        .alu("3 + 5 = 8")
        .registers(2, "ADD 11", 8),

        // ==================== STORE 12 ====================
        Step::new(
            Phase::Fetch,
            "Fetch: send PC to memory",
            "PC value 2 goes out on the address bus.",
        )
        .active([Pc, AddressBus, Mem, ControlUnit])
        .bus(BusTransfer::address(Pc, Mem, 2))
        .registers(2, "ADD 11", 8),
        Step::new(
            Phase::Fetch,
            "Fetch: read instruction",
            "Memory returns STORE 12 into the instruction register.",
        )
        .active([Mem, DataBus, Ir])
        .bus(BusTransfer::data_cell(Mem, Ir, "STORE 12", 2))
        .registers(2, "STORE 12", 8),
        Step::new(
            Phase::Fetch,
            "Fetch: increment PC",
            "PC advances to 3.",
        )
        .active([Pc])
        .registers(3, "STORE 12", 8),
        Step::new(
            Phase::Decode,
            "Decode: STORE 12",
            "STORE copies the accumulator into memory at address 12.",
        )
        .active([Ir, ControlUnit])
        .registers(3, "STORE 12", 8),
        Step::new(
            Phase::Execute,
            "Execute: write memory",
            "Address 12 is selected and the accumulator value 8 travels over the data bus into memory.",
        )
        .active([ControlUnit, Acc, AddressBus, DataBus, Mem])
        .bus(BusTransfer::data_cell(Acc, Mem, "8", 12))
        .write(12, "8")
        .registers(3, "STORE 12", 8),

        // ==================== HALT ====================
        Step::new(
            Phase::Fetch,
            "Fetch: send PC to memory",
            "PC value 3 goes out on the address bus.",
        )
        .active([Pc, AddressBus, Mem, ControlUnit])
        .bus(BusTransfer::address(Pc, Mem, 3))
        .registers(3, "STORE 12", 8),
        Step::new(
            Phase::Fetch,
            "Fetch: read instruction",
            "Memory returns HALT into the instruction register.",
        )
        .active([Mem, DataBus, Ir])
        .bus(BusTransfer::data_cell(Mem, Ir, "HALT", 3))
        .registers(3, "HALT", 8),
        Step::new(
            Phase::Fetch,
            "Fetch: increment PC",
            "PC advances to 4.",
        )
        .active([Pc])
        .registers(4, "HALT", 8),
        Step::new(
            Phase::Decode,
            "Decode: HALT",
            "HALT tells the control unit to stop fetching instructions.",
        )
        .active([Ir, ControlUnit])
        .registers(4, "HALT", 8),

        // ==================== Done ====================
        Step::new(
            Phase::Idle,
            "Halted",
            "The program has finished. Memory address 12 holds 3 + 5 = 8.",
        )
        .active([Acc, Mem])
        .registers(4, "HALT", 8),
    ];

    steps.into_iter().enumerate().map(|(i, s)| s.at(i)).collect()
}

impl ScriptStore {
    /// The built-in fetch-decode-execute walkthrough.
    pub fn builtin() -> Result<Self, ScriptError> {
        ScriptStore::new(seed_table(), steps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::step::BusSignal;
    use crate::script::Instruction;

    #[test]
    fn test_builtin_validates() {
        let store = ScriptStore::builtin().unwrap();
        assert_eq!(store.len(), 24);
        assert_eq!(store.seed().len(), MEMORY_SIZE as usize);
    }

    #[test]
    fn test_builtin_landmarks() {
        let store = ScriptStore::builtin().unwrap();

        let start = &store.step_at(0).unwrap().registers;
        assert_eq!((start.pc, start.ir.as_deref(), start.acc), (Some(0), Some(""), Some(0)));

        assert_eq!(store.step_at(6).unwrap().registers.acc, Some(3));
        assert_eq!(store.step_at(13).unwrap().registers.acc, Some(8));
        assert_eq!(store.step_at(18).unwrap().memory_updates.len(), 1);
        assert_eq!(store.step_at(23).unwrap().phase, Phase::Idle);
    }

    #[test]
    fn test_only_store_step_writes_memory() {
        let writers: Vec<_> = steps()
            .iter()
            .filter(|s| !s.memory_updates.is_empty())
            .map(|s| s.index)
            .collect();
        assert_eq!(writers, vec![18]);
    }

    #[test]
    fn test_fetched_instructions_match_memory() {
        let store = ScriptStore::builtin().unwrap();
        for step in store.steps() {
            let Some(transfer) = &step.bus_transfer else { continue };
            if let (Component::Memory, Component::InstructionRegister) = (transfer.from, transfer.to) {
                let BusSignal::Data { value, cell: Some(addr) } = &transfer.signal else {
                    panic!("instruction fetch without a source cell at step {}", step.index);
                };
                assert_eq!(&store.seed().get(*addr).unwrap().content, value);
                assert!(value.parse::<Instruction>().is_ok());
                assert_eq!(step.registers.ir.as_deref(), Some(value.as_str()));
            }
        }
    }

    #[test]
    fn test_pc_never_decreases() {
        let pcs: Vec<_> = steps().iter().map(|s| s.registers.pc.unwrap()).collect();
        assert!(pcs.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*pcs.last().unwrap(), 4);
    }
}
