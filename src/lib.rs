pub mod compose;
pub mod config;
pub mod program;
pub mod vm;

// Use specific imports rather than assuming re-exports for clarity
pub use crate::compose::ComposeError;
pub use crate::config::{Config, CONFIG};
pub use crate::program::{load_program, parse_program, ProgramError};
pub use crate::vm::{spawn, wait_all, Channel, InstructionSet, Machine, MachineHandle, RunStatus, VMError};
