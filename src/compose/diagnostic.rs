//! Single-machine runs with pre-seeded input
//!
//! Covers the early programs: the gravity-assist calculator, which runs on the
//! basic instruction set with two patched positions, and the diagnostic and
//! BOOST programs, which take a fixed list of inputs and report every output.

use log::{debug, info};

use crate::compose::ComposeError;
use crate::vm::{Channel, InstructionSet, Machine};

/// Run `image` to completion with `inputs` queued, returning every output.
///
/// The input is sealed, so a program that asks for more input than supplied
/// faults with `ChannelClosed`.
pub async fn run_with_inputs(
    image: Vec<i64>,
    inputs: &[i64],
    instruction_set: InstructionSet,
) -> Result<Vec<i64>, ComposeError> {
    let input = Channel::sealed(inputs.iter().copied());
    let output = Channel::new();
    let mut machine = Machine::with_instruction_set(image, instruction_set, input, output.clone());

    machine.run().await?;
    Ok(output.drain())
}

/// Last output of a diagnostic run, the "diagnostic code"
pub async fn diagnostic_code(
    image: Vec<i64>,
    system_id: i64,
    instruction_set: InstructionSet,
) -> Result<i64, ComposeError> {
    let outputs = run_with_inputs(image, &[system_id], instruction_set).await?;
    outputs.last().copied().ok_or(ComposeError::NoOutput)
}

/// Patch positions 1 and 2 with `noun` and `verb`, run on the basic
/// instruction set, and return position 0.
pub async fn run_patched(image: &[i64], noun: i64, verb: i64) -> Result<i64, ComposeError> {
    if image.len() < 3 {
        return Err(ComposeError::InvalidSetup(format!(
            "program of length {} has no noun/verb slots",
            image.len()
        )));
    }

    let mut patched = image.to_vec();
    patched[1] = noun;
    patched[2] = verb;

    let mut machine = Machine::with_instruction_set(
        patched,
        InstructionSet::Basic,
        Channel::new(),
        Channel::new(),
    );
    machine.run().await?;

    let mut memory = machine.into_memory();
    Ok(memory.read(0)?)
}

/// Search nouns and verbs in `0..100` for a run producing `target`; returns
/// `100 * noun + verb`.
pub async fn find_noun_verb(image: &[i64], target: i64) -> Result<i64, ComposeError> {
    for noun in 0..100 {
        for verb in 0..100 {
            match run_patched(image, noun, verb).await {
                Ok(value) if value == target => {
                    info!("noun {} and verb {} produce {}", noun, verb, target);
                    return Ok(100 * noun + verb);
                }
                Ok(_) => {}
                Err(ComposeError::VM(err)) => {
                    debug!("noun {} verb {} faulted: {}", noun, verb, err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    Err(ComposeError::NoSolution(target))
}
