//! Main machine implementation
//!
//! The `Machine` struct brings together memory, the decoder and the two I/O
//! channels, and runs the fetch-decode-execute loop:
//! - fetch the word at `pc` and decode it into an opcode and modes
//! - resolve operands through Position, Immediate or Relative addressing
//! - execute, then advance `pc` by the instruction width unless a jump was taken
//!
//! The only suspension point is the input opcode. A force-halt request is
//! checked between instructions and also raced against a pending input, so a
//! machine parked on an empty channel can still be stopped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, trace, warn};
use tokio::sync::watch;

use crate::config::CONFIG;
use crate::vm::channel::Channel;
use crate::vm::errors::VMError;
use crate::vm::memory::VMMemory;
use crate::vm::types::{Instruction, InstructionSet, MachineState, Mode, Opcode, RunStatus};

static NEXT_MACHINE_ID: AtomicUsize = AtomicUsize::new(0);

/// Requests that a machine stop at its next opportunity
#[derive(Debug, Clone)]
pub struct HaltSwitch(Arc<watch::Sender<bool>>);

impl HaltSwitch {
    pub fn trigger(&self) {
        self.0.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }
}

/// A single fetch-decode-execute engine
#[derive(Debug)]
pub struct Machine {
    id: usize,
    memory: VMMemory,
    pc: usize,
    relative_base: i64,
    status: RunStatus,
    last_output: Option<i64>,
    input: Channel,
    output: Channel,
    instruction_set: InstructionSet,
    yield_interval: u32,
    halt_tx: Arc<watch::Sender<bool>>,
    halt_rx: watch::Receiver<bool>,
    state_tx: watch::Sender<MachineState>,
}

impl Machine {
    /// Create a machine with the full instruction set and growable memory
    pub fn new(image: Vec<i64>, input: Channel, output: Channel) -> Self {
        Self::with_instruction_set(image, InstructionSet::Full, input, output)
    }

    /// Create a machine restricted to `instruction_set`
    pub fn with_instruction_set(
        image: Vec<i64>,
        instruction_set: InstructionSet,
        input: Channel,
        output: Channel,
    ) -> Self {
        let (halt_tx, halt_rx) = watch::channel(false);
        let (state_tx, _) = watch::channel(MachineState {
            status: RunStatus::Running,
            last_output: None,
        });

        Self {
            id: NEXT_MACHINE_ID.fetch_add(1, Ordering::Relaxed),
            memory: VMMemory::with_policy(image, instruction_set.memory_policy())
                .with_limit(CONFIG.max_memory_cells),
            pc: 0,
            relative_base: 0,
            status: RunStatus::Running,
            last_output: None,
            input,
            output,
            instruction_set,
            yield_interval: CONFIG.yield_interval,
            halt_tx: Arc::new(halt_tx),
            halt_rx,
            state_tx,
        }
    }

    /// Yield to the scheduler every `interval` instructions (0 disables)
    pub fn with_yield_interval(mut self, interval: u32) -> Self {
        self.yield_interval = interval;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn memory(&self) -> &VMMemory {
        &self.memory
    }

    pub fn into_memory(self) -> VMMemory {
        self.memory
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn last_output(&self) -> Option<i64> {
        self.last_output
    }

    pub fn instruction_set(&self) -> InstructionSet {
        self.instruction_set
    }

    pub fn input(&self) -> &Channel {
        &self.input
    }

    pub fn output(&self) -> &Channel {
        &self.output
    }

    /// A switch that force-halts this machine from another task
    pub fn halt_switch(&self) -> HaltSwitch {
        HaltSwitch(Arc::clone(&self.halt_tx))
    }

    /// Watch status and last output changes
    pub fn subscribe(&self) -> watch::Receiver<MachineState> {
        self.state_tx.subscribe()
    }

    /// Run until the machine halts or faults
    pub async fn run(&mut self) -> Result<RunStatus, VMError> {
        let mut executed: u32 = 0;

        while self.status == RunStatus::Running {
            if *self.halt_rx.borrow() {
                debug!("machine {} force-halted at pc {}", self.id, self.pc);
                self.set_status(RunStatus::Halted);
                break;
            }

            self.step().await?;

            executed = executed.wrapping_add(1);
            if self.yield_interval > 0 && executed % self.yield_interval == 0 {
                tokio::task::yield_now().await;
            }
        }

        Ok(self.status)
    }

    /// Execute a single instruction and report the resulting status
    pub async fn step(&mut self) -> Result<RunStatus, VMError> {
        if self.status.is_stopped() {
            return Ok(self.status);
        }

        match self.execute_next().await {
            Ok(()) => Ok(self.status),
            Err(err) => {
                warn!("machine {} faulted: {}", self.id, err);
                self.set_status(RunStatus::Faulted);
                Err(err)
            }
        }
    }

    async fn execute_next(&mut self) -> Result<(), VMError> {
        let pc = self.pc;
        let word = self.memory.read(pc)?;
        let instruction = Instruction::decode(word, pc)?;

        if !self.instruction_set.supports(instruction.opcode) {
            return Err(VMError::UnsupportedOpcode {
                opcode: instruction.opcode.code(),
                set: self.instruction_set.name(),
                pc,
            });
        }

        trace!(
            "machine {} pc={} rb={} {:?} {:?}",
            self.id,
            pc,
            self.relative_base,
            instruction.opcode,
            instruction.modes
        );

        match instruction.opcode {
            Opcode::Add => {
                let a = self.load(&instruction, 0)?;
                let b = self.load(&instruction, 1)?;
                let sum = a
                    .checked_add(b)
                    .ok_or(VMError::ArithmeticOverflow { pc })?;
                self.store(&instruction, 2, sum)?;
            }

            Opcode::Multiply => {
                let a = self.load(&instruction, 0)?;
                let b = self.load(&instruction, 1)?;
                let product = a
                    .checked_mul(b)
                    .ok_or(VMError::ArithmeticOverflow { pc })?;
                self.store(&instruction, 2, product)?;
            }

            Opcode::Input => match self.receive().await? {
                Some(value) => self.store(&instruction, 0, value)?,
                None => {
                    debug!("machine {} force-halted while waiting for input", self.id);
                    self.set_status(RunStatus::Halted);
                    return Ok(());
                }
            },

            Opcode::Output => {
                let value = self.load(&instruction, 0)?;
                self.output.push(value);
                self.last_output = Some(value);
                self.publish();
            }

            Opcode::JumpIfTrue => {
                if self.load(&instruction, 0)? != 0 {
                    let target = self.load(&instruction, 1)?;
                    self.pc = self.address(target)?;
                    return Ok(());
                }
            }

            Opcode::JumpIfFalse => {
                if self.load(&instruction, 0)? == 0 {
                    let target = self.load(&instruction, 1)?;
                    self.pc = self.address(target)?;
                    return Ok(());
                }
            }

            Opcode::LessThan => {
                let a = self.load(&instruction, 0)?;
                let b = self.load(&instruction, 1)?;
                self.store(&instruction, 2, i64::from(a < b))?;
            }

            Opcode::Equals => {
                let a = self.load(&instruction, 0)?;
                let b = self.load(&instruction, 1)?;
                self.store(&instruction, 2, i64::from(a == b))?;
            }

            Opcode::AdjustRelativeBase => {
                let offset = self.load(&instruction, 0)?;
                self.relative_base = self
                    .relative_base
                    .checked_add(offset)
                    .ok_or(VMError::ArithmeticOverflow { pc })?;
            }

            Opcode::Halt => {
                debug!("machine {} halted at pc {}", self.id, pc);
                self.set_status(RunStatus::Halted);
                return Ok(());
            }
        }

        self.pc += instruction.opcode.width();
        Ok(())
    }

    /// Wait for input, or for a force-halt request
    async fn receive(&mut self) -> Result<Option<i64>, VMError> {
        let input = &self.input;
        let halt = &mut self.halt_rx;

        tokio::select! {
            value = input.pop() => value.map(Some),
            _ = halt.wait_for(|halted| *halted) => Ok(None),
        }
    }

    /// Literal value of the operand in slot `index`
    fn operand(&mut self, index: usize) -> Result<i64, VMError> {
        self.memory.read(self.pc + index + 1)
    }

    fn address(&self, raw: i64) -> Result<usize, VMError> {
        usize::try_from(raw).map_err(|_| VMError::NegativeAddress {
            address: raw,
            pc: self.pc,
        })
    }

    fn relative_address(&self, raw: i64) -> Result<usize, VMError> {
        let target = self
            .relative_base
            .checked_add(raw)
            .ok_or(VMError::ArithmeticOverflow { pc: self.pc })?;
        self.address(target)
    }

    fn load(&mut self, instruction: &Instruction, index: usize) -> Result<i64, VMError> {
        let raw = self.operand(index)?;
        match instruction.modes[index] {
            Mode::Position => {
                let address = self.address(raw)?;
                self.memory.read(address)
            }
            Mode::Immediate => Ok(raw),
            Mode::Relative => {
                let address = self.relative_address(raw)?;
                self.memory.read(address)
            }
        }
    }

    fn store(&mut self, instruction: &Instruction, index: usize, value: i64) -> Result<(), VMError> {
        let raw = self.operand(index)?;
        let address = match instruction.modes[index] {
            Mode::Position => self.address(raw)?,
            Mode::Relative => self.relative_address(raw)?,
            Mode::Immediate => return Err(VMError::ImmediateStore { pc: self.pc }),
        };
        self.memory.write(address, value)
    }

    fn set_status(&mut self, status: RunStatus) {
        self.status = status;
        self.publish();
    }

    fn publish(&self) {
        self.state_tx.send_replace(MachineState {
            status: self.status,
            last_output: self.last_output,
        });
    }
}
