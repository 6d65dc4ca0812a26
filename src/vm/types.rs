//! Type definitions for the machine
//!
//! This module holds the instruction model shared by the decoder and the
//! execution loop: opcodes, parameter modes, decoded instructions, the
//! instruction sets a machine can be restricted to, and the run status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vm::errors::VMError;
use crate::vm::memory::MemoryPolicy;

/// How an operand is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// The operand is an address
    Position,
    /// The operand is the value itself
    Immediate,
    /// The operand is an offset from the relative base
    Relative,
}

impl Mode {
    fn from_digit(digit: i64, pc: usize) -> Result<Self, VMError> {
        match digit {
            0 => Ok(Mode::Position),
            1 => Ok(Mode::Immediate),
            2 => Ok(Mode::Relative),
            mode => Err(VMError::InvalidMode { mode, pc }),
        }
    }
}

/// The closed set of operations a machine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// `c = a + b`
    Add,
    /// `c = a * b`
    Multiply,
    /// Pop a value from the input channel into `a`
    Input,
    /// Push `a` onto the output channel
    Output,
    /// `pc = b` if `a != 0`
    JumpIfTrue,
    /// `pc = b` if `a == 0`
    JumpIfFalse,
    /// `c = (a < b) as i64`
    LessThan,
    /// `c = (a == b) as i64`
    Equals,
    /// `relative_base += a`
    AdjustRelativeBase,
    /// Stop the machine
    Halt,
}

impl Opcode {
    /// Numeric code as it appears in the low two digits of a word
    pub fn code(self) -> i64 {
        match self {
            Opcode::Add => 1,
            Opcode::Multiply => 2,
            Opcode::Input => 3,
            Opcode::Output => 4,
            Opcode::JumpIfTrue => 5,
            Opcode::JumpIfFalse => 6,
            Opcode::LessThan => 7,
            Opcode::Equals => 8,
            Opcode::AdjustRelativeBase => 9,
            Opcode::Halt => 99,
        }
    }

    fn from_code(code: i64, pc: usize) -> Result<Self, VMError> {
        match code {
            1 => Ok(Opcode::Add),
            2 => Ok(Opcode::Multiply),
            3 => Ok(Opcode::Input),
            4 => Ok(Opcode::Output),
            5 => Ok(Opcode::JumpIfTrue),
            6 => Ok(Opcode::JumpIfFalse),
            7 => Ok(Opcode::LessThan),
            8 => Ok(Opcode::Equals),
            9 => Ok(Opcode::AdjustRelativeBase),
            99 => Ok(Opcode::Halt),
            opcode => Err(VMError::UnknownOpcode { opcode, pc }),
        }
    }

    /// Number of words the instruction occupies, opcode word included
    pub fn width(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 4,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 3,
            Opcode::Input | Opcode::Output | Opcode::AdjustRelativeBase => 2,
            Opcode::Halt => 1,
        }
    }
}

/// A decoded instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub modes: [Mode; 3],
}

impl Instruction {
    /// Split a word into its opcode and the three parameter modes.
    ///
    /// `pc` is only used to annotate errors.
    pub fn decode(word: i64, pc: usize) -> Result<Self, VMError> {
        if word < 0 {
            return Err(VMError::UnknownOpcode { opcode: word, pc });
        }
        // Only three mode digits exist
        if word >= 100_000 {
            return Err(VMError::InvalidMode {
                mode: word / 10_000,
                pc,
            });
        }

        let opcode = Opcode::from_code(word % 100, pc)?;
        let modes = [
            Mode::from_digit(word / 100 % 10, pc)?,
            Mode::from_digit(word / 1_000 % 10, pc)?,
            Mode::from_digit(word / 10_000 % 10, pc)?,
        ];

        Ok(Self { opcode, modes })
    }
}

/// The subset of opcodes a machine accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionSet {
    /// Add, multiply and halt only, on fixed memory
    Basic,
    /// Everything except relative base adjustment, on fixed memory
    Diagnostic,
    /// All opcodes, on growable memory
    Full,
}

impl InstructionSet {
    pub fn supports(self, opcode: Opcode) -> bool {
        match self {
            InstructionSet::Basic => matches!(
                opcode,
                Opcode::Add | Opcode::Multiply | Opcode::Halt
            ),
            InstructionSet::Diagnostic => opcode != Opcode::AdjustRelativeBase,
            InstructionSet::Full => true,
        }
    }

    pub fn memory_policy(self) -> MemoryPolicy {
        match self {
            InstructionSet::Basic | InstructionSet::Diagnostic => MemoryPolicy::Fixed,
            InstructionSet::Full => MemoryPolicy::Growable,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InstructionSet::Basic => "basic",
            InstructionSet::Diagnostic => "diagnostic",
            InstructionSet::Full => "full",
        }
    }
}

impl std::str::FromStr for InstructionSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(InstructionSet::Basic),
            "diagnostic" => Ok(InstructionSet::Diagnostic),
            "full" => Ok(InstructionSet::Full),
            other => Err(format!("unknown instruction set '{}'", other)),
        }
    }
}

/// Lifecycle of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Halted,
    Faulted,
}

impl RunStatus {
    pub fn is_stopped(self) -> bool {
        self != RunStatus::Running
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Halted => write!(f, "halted"),
            RunStatus::Faulted => write!(f, "faulted"),
        }
    }
}

/// Externally observable machine state, published on every change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineState {
    pub status: RunStatus,
    pub last_output: Option<i64>,
}
