//! Composition of machines
//!
//! Everything in this module drives machines purely through their public
//! contract: channels in, channels out, and a `MachineHandle` to wait on or
//! force-halt. Scenarios are async functions from an initial memory image and
//! a few parameters to a small result.
//!
//! - `diagnostic`: single machines with pre-seeded input
//! - `amplifier`: pipelines and feedback rings
//! - `painter`: the hull-painting turtle robot
//! - `arcade`: the block-breaking game and its paddle controller
//! - `droid`: maze exploration behind the `Droid` trait

pub mod amplifier;
pub mod arcade;
pub mod diagnostic;
pub mod droid;
pub mod grid;
pub mod painter;

use std::time::Duration;

use thiserror::Error;

use crate::vm::{Channel, MachineHandle, VMError};

/// Errors raised while wiring or driving machines
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("VM error: {0}")]
    VM(#[from] VMError),

    #[error("Machine produced no output")]
    NoOutput,

    #[error("No noun/verb pair produces {0}")]
    NoSolution(i64),

    #[error("Machine stopped responding: {0}")]
    Stalled(String),

    #[error("Unexpected {what} value {value}")]
    UnexpectedOutput { what: &'static str, value: i64 },

    #[error("Invalid setup: {0}")]
    InvalidSetup(String),
}

/// Next value from `output`, or `None` once the machine has stopped with
/// nothing left queued or has been silent for `quiet`.
pub(crate) async fn next_output(
    output: &Channel,
    handle: &MachineHandle,
    quiet: Duration,
) -> Option<i64> {
    if let Some(value) = output.try_pop_now() {
        return Some(value);
    }

    tokio::select! {
        value = output.try_pop(quiet) => value,
        // Values pushed before the machine stopped are already queued
        _ = handle.stopped() => output.try_pop_now(),
    }
}
