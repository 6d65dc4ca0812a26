//! Running machines as concurrent tasks
//!
//! `spawn` moves a machine onto its own tokio task and returns a
//! `MachineHandle`. The handle can observe the machine's status and last
//! output while it runs, request a forced halt, and finally `wait` for the
//! machine to come back.

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::vm::channel::Channel;
use crate::vm::errors::VMError;
use crate::vm::types::{MachineState, RunStatus};
use crate::vm::vm::{HaltSwitch, Machine};

/// Spawn a full-instruction-set machine over `image`
pub fn spawn(image: Vec<i64>, input: Channel, output: Channel) -> MachineHandle {
    spawn_machine(Machine::new(image, input, output))
}

/// Spawn an already configured machine
pub fn spawn_machine(mut machine: Machine) -> MachineHandle {
    let id = machine.id();
    let halt = machine.halt_switch();
    let state = machine.subscribe();

    debug!("spawning machine {}", id);
    let join = tokio::spawn(async move {
        match machine.run().await {
            Ok(_) => Ok(machine),
            Err(err) => Err(err),
        }
    });

    MachineHandle {
        id,
        halt,
        state,
        join,
    }
}

/// Wait for every handle; fails with the first fault encountered, after
/// force-halting the machines still running
pub async fn wait_all(handles: Vec<MachineHandle>) -> Result<Vec<Machine>, VMError> {
    let switches: Vec<HaltSwitch> = handles.iter().map(|h| h.halt.clone()).collect();
    let result = futures::future::try_join_all(handles.into_iter().map(MachineHandle::wait)).await;

    if result.is_err() {
        for switch in &switches {
            switch.trigger();
        }
    }
    result
}

/// Control side of a spawned machine
#[derive(Debug)]
pub struct MachineHandle {
    id: usize,
    halt: HaltSwitch,
    state: watch::Receiver<MachineState>,
    join: JoinHandle<Result<Machine, VMError>>,
}

impl MachineHandle {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Ask the machine to stop; it will end up `Halted`, even if it is
    /// currently blocked on input
    pub fn force_halt(&self) {
        debug!("force halt requested for machine {}", self.id);
        self.halt.trigger();
    }

    /// Most recent value the machine pushed to its output
    pub fn last_output(&self) -> Option<i64> {
        self.state.borrow().last_output
    }

    pub fn status(&self) -> RunStatus {
        self.state.borrow().status
    }

    /// Resolve once the machine has halted or faulted
    pub async fn stopped(&self) -> RunStatus {
        let mut state = self.state.clone();
        let result = state.wait_for(|s| s.status.is_stopped()).await.map(|s| s.status);
        // The machine was dropped without publishing a final status
        result.unwrap_or(RunStatus::Faulted)
    }

    /// Block until the machine stops, returning it on halt or its fault
    pub async fn wait(self) -> Result<Machine, VMError> {
        match self.join.await {
            Ok(result) => result,
            Err(err) => Err(VMError::TaskFailed(err.to_string())),
        }
    }
}
