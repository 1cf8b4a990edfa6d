//! Step records: one authored moment of the walkthrough.

use super::memory::{Address, MemoryUpdate};
use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stage of the instruction cycle a step belongs to.
///
/// Purely descriptive; it never decides which transitions are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Fetch,
    Decode,
    Execute,
    Idle,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Fetch => "FETCH",
            Phase::Decode => "DECODE",
            Phase::Execute => "EXECUTE",
            Phase::Idle => "IDLE",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A highlightable part of the CPU diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Component {
    #[serde(rename = "pc")]
    ProgramCounter,
    #[serde(rename = "ir")]
    InstructionRegister,
    #[serde(rename = "control-unit")]
    ControlUnit,
    #[serde(rename = "alu")]
    Alu,
    #[serde(rename = "acc")]
    Accumulator,
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "address-bus")]
    AddressBus,
    #[serde(rename = "data-bus")]
    DataBus,
}

impl Component {
    pub const ALL: [Component; 8] = [
        Component::ProgramCounter,
        Component::InstructionRegister,
        Component::ControlUnit,
        Component::Alu,
        Component::Accumulator,
        Component::Memory,
        Component::AddressBus,
        Component::DataBus,
    ];

    /// Stable id used by script files and the web front end.
    pub fn id(self) -> &'static str {
        match self {
            Component::ProgramCounter => "pc",
            Component::InstructionRegister => "ir",
            Component::ControlUnit => "control-unit",
            Component::Alu => "alu",
            Component::Accumulator => "acc",
            Component::Memory => "memory",
            Component::AddressBus => "address-bus",
            Component::DataBus => "data-bus",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Component::ProgramCounter => "Program Counter",
            Component::InstructionRegister => "Instruction Register",
            Component::ControlUnit => "Control Unit",
            Component::Alu => "ALU",
            Component::Accumulator => "Accumulator",
            Component::Memory => "Memory",
            Component::AddressBus => "Address Bus",
            Component::DataBus => "Data Bus",
        }
    }

    /// Look up a component by its id.
    pub fn from_id(id: &str) -> Option<Self> {
        Component::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a bus transfer carries.
///
/// Address and data transfers are separate variants so that a data value
/// which happens to look like an address never highlights the wrong cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "bus", rename_all = "lowercase")]
pub enum BusSignal {
    /// The address bus selects a memory cell.
    Address { address: Address },
    /// The data bus carries a value, optionally read from or written to a
    /// specific cell.
    Data {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cell: Option<Address>,
    },
}

impl BusSignal {
    /// The bus component this signal travels on.
    pub fn bus(&self) -> Component {
        match self {
            BusSignal::Address { .. } => Component::AddressBus,
            BusSignal::Data { .. } => Component::DataBus,
        }
    }

    /// The memory cell this signal refers to, if any.
    pub fn cell(&self) -> Option<Address> {
        match *self {
            BusSignal::Address { address } => Some(address),
            BusSignal::Data { cell, .. } => cell,
        }
    }

    /// Text shown on the bus in the diagram.
    pub fn display_value(&self) -> String {
        match self {
            BusSignal::Address { address } => address.to_string(),
            BusSignal::Data { value, .. } => value.clone(),
        }
    }
}

/// A single declared data movement between two components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusTransfer {
    pub from: Component,
    pub to: Component,
    pub signal: BusSignal,
}

impl BusTransfer {
    /// An address-bus transfer.
    pub fn address(from: Component, to: Component, address: Address) -> Self {
        Self {
            from,
            to,
            signal: BusSignal::Address { address },
        }
    }

    /// A data-bus transfer tied to a memory cell.
    pub fn data_cell(from: Component, to: Component, value: &str, cell: Address) -> Self {
        Self {
            from,
            to,
            signal: BusSignal::Data {
                value: value.to_string(),
                cell: Some(cell),
            },
        }
    }

    /// A data-bus transfer between CPU components.
    pub fn data(from: Component, to: Component, value: &str) -> Self {
        Self {
            from,
            to,
            signal: BusSignal::Data {
                value: value.to_string(),
                cell: None,
            },
        }
    }

    /// Whether memory is one end of the transfer.
    pub fn touches_memory(&self) -> bool {
        self.from == Component::Memory || self.to == Component::Memory
    }
}

impl fmt::Display for BusTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {} [{}: {}]",
            self.from.id(),
            self.to.id(),
            self.signal.bus().id(),
            self.signal.display_value()
        )
    }
}

/// Register values after a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    #[serde(default)]
    pub pc: Option<u32>,
    #[serde(default)]
    pub ir: Option<String>,
    #[serde(default)]
    pub acc: Option<i64>,
}

impl Registers {
    pub fn new(pc: u32, ir: &str, acc: i64) -> Self {
        Self {
            pc: Some(pc),
            ir: Some(ir.to_string()),
            acc: Some(acc),
        }
    }
}

/// One authored moment of the walkthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    pub phase: Phase,
    pub title: String,
    pub narration: String,
    #[serde(default)]
    pub active_components: BTreeSet<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_transfer: Option<BusTransfer>,
    #[serde(default)]
    pub registers: Registers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alu_operation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memory_updates: Vec<MemoryUpdate>,
}

impl Step {
    /// Start a step with no highlights. The index is assigned when the
    /// step is placed in a script.
    pub fn new(phase: Phase, title: &str, narration: &str) -> Self {
        Self {
            index: 0,
            phase,
            title: title.to_string(),
            narration: narration.to_string(),
            active_components: BTreeSet::new(),
            bus_transfer: None,
            registers: Registers::default(),
            alu_operation: None,
            memory_updates: Vec::new(),
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn active<I: IntoIterator<Item = Component>>(mut self, components: I) -> Self {
        self.active_components.extend(components);
        self
    }

    pub fn bus(mut self, transfer: BusTransfer) -> Self {
        self.bus_transfer = Some(transfer);
        self
    }

    pub fn registers(mut self, pc: u32, ir: &str, acc: i64) -> Self {
        self.registers = Registers::new(pc, ir, acc);
        self
    }

    pub fn alu(mut self, operation: &str) -> Self {
        self.alu_operation = Some(operation.to_string());
        self
    }

    pub fn write(mut self, address: Address, value: &str) -> Self {
        self.memory_updates.push(MemoryUpdate::new(address, value));
        self
    }

    /// Whether a component is highlighted in this step.
    pub fn is_active(&self, component: Component) -> bool {
        self.active_components.contains(&component)
    }

    /// Every memory address the step refers to.
    pub fn referenced_addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.memory_updates
            .iter()
            .map(|u| u.address)
            .chain(self.bus_transfer.as_ref().and_then(|t| t.signal.cell()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_ids_roundtrip() {
        for c in Component::ALL {
            assert_eq!(Component::from_id(c.id()), Some(c));
        }
        assert_eq!(Component::from_id("gpu"), None);
    }

    #[test]
    fn test_component_serializes_as_id() {
        let json = serde_json::to_string(&Component::ControlUnit).unwrap();
        assert_eq!(json, "\"control-unit\"");
    }

    #[test]
    fn test_phase_serializes_upper_case() {
        let json = serde_json::to_string(&Phase::Execute).unwrap();
        assert_eq!(json, "\"EXECUTE\"");
    }

    #[test]
    fn test_bus_signal_cells() {
        let addr = BusTransfer::address(Component::ProgramCounter, Component::Memory, 4);
        assert_eq!(addr.signal.cell(), Some(4));
        assert_eq!(addr.signal.bus(), Component::AddressBus);

        let data = BusTransfer::data(Component::Accumulator, Component::Alu, "4");
        assert_eq!(data.signal.cell(), None);
        assert!(!data.touches_memory());
    }

    #[test]
    fn test_referenced_addresses() {
        let step = Step::new(Phase::Execute, "t", "n")
            .bus(BusTransfer::data_cell(Component::Accumulator, Component::Memory, "8", 12))
            .write(12, "8")
            .write(13, "1");

        let addrs: Vec<_> = step.referenced_addresses().collect();
        assert_eq!(addrs, vec![12, 13, 12]);
    }

    #[test]
    fn test_bus_transfer_display() {
        let t = BusTransfer::data_cell(Component::Memory, Component::InstructionRegister, "ADD 11", 1);
        assert_eq!(t.to_string(), "memory → ir [data-bus: ADD 11]");
    }
}
