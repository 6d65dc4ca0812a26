//! Integer-instruction virtual machine
//!
//! This module contains the machine itself: its memory, the instruction
//! decoder, the channels it reads from and writes to, and the task glue that
//! runs several machines side by side.

mod channel;
mod errors;
mod execution;
mod memory;
mod types;

pub use channel::Channel;
pub use errors::VMError;
pub use execution::{spawn, spawn_machine, wait_all, MachineHandle};
pub use memory::{MemoryPolicy, VMMemory};
pub use types::{Instruction, InstructionSet, MachineState, Mode, Opcode, RunStatus};

// Main machine struct that coordinates components
mod vm;
pub use vm::{HaltSwitch, Machine};
