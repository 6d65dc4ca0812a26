//! Error types for machine execution
//!
//! Every variant here is fatal: a machine that produces one of these moves to
//! `RunStatus::Faulted` and never resumes.

use thiserror::Error;

/// Error variants that can occur while a machine executes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VMError {
    /// The opcode is not part of any known instruction table
    #[error("Unknown opcode {opcode} at pc {pc}")]
    UnknownOpcode { opcode: i64, pc: usize },

    /// The opcode exists but the machine's instruction set excludes it
    #[error("Opcode {opcode} is not supported by the {set} instruction set (pc {pc})")]
    UnsupportedOpcode {
        opcode: i64,
        set: &'static str,
        pc: usize,
    },

    /// A parameter mode digit outside of {0, 1, 2}
    #[error("Invalid parameter mode {mode} at pc {pc}")]
    InvalidMode { mode: i64, pc: usize },

    /// Immediate mode used as the target of a store
    #[error("Immediate mode used as store target at pc {pc}")]
    ImmediateStore { pc: usize },

    /// Load, store or jump with a negative address
    #[error("Negative address {address} at pc {pc}")]
    NegativeAddress { address: i64, pc: usize },

    /// Access past the end of a fixed-size memory
    #[error("Address {address} out of range for fixed memory of length {len}")]
    AddressOutOfRange { address: usize, len: usize },

    /// Growable memory cannot be extended to cover the address
    #[error("Memory exhausted growing to address {address}")]
    MemoryExhausted { address: usize },

    /// Result does not fit in the host's signed integer range
    #[error("Arithmetic overflow at pc {pc}")]
    ArithmeticOverflow { pc: usize },

    /// Input was read from a sealed channel with nothing left in it
    #[error("Channel closed: no input left")]
    ChannelClosed,

    /// The task running a machine panicked or was cancelled
    #[error("Machine task failed: {0}")]
    TaskFailed(String),
}
