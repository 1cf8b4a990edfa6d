//! Instruction text for the walkthrough's accumulator machine.
//!
//! The machine knows four instructions, each written as a mnemonic with an
//! optional decimal address operand:
//! - `LOAD addr`  — ACC := [addr]
//! - `ADD addr`   — ACC := ACC + [addr]
//! - `STORE addr` — [addr] := ACC
//! - `HALT`       — stop
//!
//! Nothing here executes an instruction. The script already carries the
//! register values after each step; this type only parses and renders the
//! text stored in instruction cells and in the IR.

use super::memory::Address;
use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opcode of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Load,
    Add,
    Store,
    Halt,
}

impl Opcode {
    /// All opcodes, in encoding order.
    pub const ALL: [Opcode; 4] = [Opcode::Load, Opcode::Add, Opcode::Store, Opcode::Halt];

    /// Canonical upper-case mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Load => "LOAD",
            Opcode::Add => "ADD",
            Opcode::Store => "STORE",
            Opcode::Halt => "HALT",
        }
    }

    /// Whether the opcode takes an address operand.
    pub fn takes_operand(self) -> bool {
        !matches!(self, Opcode::Halt)
    }

    /// One-line register-transfer description, shown by the decode panel.
    pub fn effect(self) -> &'static str {
        match self {
            Opcode::Load => "ACC := [addr]",
            Opcode::Add => "ACC := ACC + [addr]",
            Opcode::Store => "[addr] := ACC",
            Opcode::Halt => "stop",
        }
    }
}

impl FromStr for Opcode {
    type Err = InstructionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .ok_or_else(|| InstructionParseError::UnknownMnemonic(s.to_string()))
    }
}

/// A parsed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    Load(Address),
    Add(Address),
    Store(Address),
    Halt,
}

impl Instruction {
    /// Opcode of this instruction.
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Load(_) => Opcode::Load,
            Instruction::Add(_) => Opcode::Add,
            Instruction::Store(_) => Opcode::Store,
            Instruction::Halt => Opcode::Halt,
        }
    }

    /// Address operand, if any.
    pub fn operand(&self) -> Option<Address> {
        match *self {
            Instruction::Load(addr) | Instruction::Add(addr) | Instruction::Store(addr) => Some(addr),
            Instruction::Halt => None,
        }
    }
}

impl FromStr for Instruction {
    type Err = InstructionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let mnemonic = parts.next().ok_or(InstructionParseError::Empty)?;
        let opcode: Opcode = mnemonic.parse()?;

        let operand = match (opcode.takes_operand(), parts.next()) {
            (true, Some(text)) => Some(
                text.parse::<Address>()
                    .map_err(|_| InstructionParseError::InvalidOperand(text.to_string()))?,
            ),
            (true, None) => return Err(InstructionParseError::MissingOperand(opcode)),
            (false, Some(text)) => {
                return Err(InstructionParseError::UnexpectedOperand(text.to_string()))
            }
            (false, None) => None,
        };

        if let Some(extra) = parts.next() {
            return Err(InstructionParseError::UnexpectedOperand(extra.to_string()));
        }

        Ok(match (opcode, operand) {
            (Opcode::Load, Some(addr)) => Instruction::Load(addr),
            (Opcode::Add, Some(addr)) => Instruction::Add(addr),
            (Opcode::Store, Some(addr)) => Instruction::Store(addr),
            _ => Instruction::Halt,
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(addr) => write!(f, "{} {}", self.opcode().mnemonic(), addr),
            None => f.write_str(self.opcode().mnemonic()),
        }
    }
}

/// Errors from parsing instruction text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionParseError {
    #[error("empty instruction")]
    Empty,

    #[error("unknown mnemonic: {0}")]
    UnknownMnemonic(String),

    #[error("{} requires an address operand", .0.mnemonic())]
    MissingOperand(Opcode),

    #[error("invalid address operand: {0}")]
    InvalidOperand(String),

    #[error("unexpected operand: {0}")]
    UnexpectedOperand(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_mnemonics() {
        assert_eq!("LOAD 10".parse::<Instruction>().unwrap(), Instruction::Load(10));
        assert_eq!("ADD 11".parse::<Instruction>().unwrap(), Instruction::Add(11));
        assert_eq!("STORE 12".parse::<Instruction>().unwrap(), Instruction::Store(12));
        assert_eq!("HALT".parse::<Instruction>().unwrap(), Instruction::Halt);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("load 3".parse::<Instruction>().unwrap(), Instruction::Load(3));
        assert_eq!("  halt ".parse::<Instruction>().unwrap(), Instruction::Halt);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Instruction>(), Err(InstructionParseError::Empty));
        assert!(matches!(
            "SUB 4".parse::<Instruction>(),
            Err(InstructionParseError::UnknownMnemonic(_))
        ));
        assert_eq!(
            "LOAD".parse::<Instruction>(),
            Err(InstructionParseError::MissingOperand(Opcode::Load))
        );
        assert!(matches!(
            "ADD x".parse::<Instruction>(),
            Err(InstructionParseError::InvalidOperand(_))
        ));
        assert!(matches!(
            "ADD -1".parse::<Instruction>(),
            Err(InstructionParseError::InvalidOperand(_))
        ));
        assert!(matches!(
            "HALT 1".parse::<Instruction>(),
            Err(InstructionParseError::UnexpectedOperand(_))
        ));
        assert!(matches!(
            "STORE 1 2".parse::<Instruction>(),
            Err(InstructionParseError::UnexpectedOperand(_))
        ));
    }

    #[test]
    fn test_display_is_canonical() {
        let instr: Instruction = "store   12".parse().unwrap();
        assert_eq!(instr.to_string(), "STORE 12");
        assert_eq!(Instruction::Halt.to_string(), "HALT");
    }
}
