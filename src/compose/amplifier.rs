//! Amplifier chains
//!
//! A pipeline wires machine *i*'s output into machine *i+1*'s input; a ring
//! additionally feeds the last machine's output back into the first. Each
//! machine first reads its phase setting, then the signal flowing through the
//! chain, which starts at 0.

use log::{debug, info};
use serde::Serialize;

use crate::compose::ComposeError;
use crate::config::CONFIG;
use crate::vm::{spawn, wait_all, Channel};

/// Best signal found over every ordering of a phase set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestPhases {
    pub signal: i64,
    pub phases: Vec<i64>,
}

fn check_phases(phases: &[i64]) -> Result<(), ComposeError> {
    if phases.is_empty() {
        return Err(ComposeError::InvalidSetup("no phase settings given".to_string()));
    }
    if phases.len() > CONFIG.max_machines {
        return Err(ComposeError::InvalidSetup(format!(
            "{} machines requested, limit is {}",
            phases.len(),
            CONFIG.max_machines
        )));
    }
    Ok(())
}

/// Run one machine per phase in a serial chain and return the final signal
pub async fn run_pipeline(image: &[i64], phases: &[i64]) -> Result<i64, ComposeError> {
    check_phases(phases)?;

    let channels: Vec<Channel> = (0..=phases.len()).map(|_| Channel::new()).collect();
    for (channel, &phase) in channels.iter().zip(phases) {
        channel.push(phase);
    }
    channels[0].push(0);

    let handles = channels
        .windows(2)
        .map(|pair| spawn(image.to_vec(), pair[0].clone(), pair[1].clone()))
        .collect();

    let machines = wait_all(handles).await?;
    let signal = machines
        .last()
        .and_then(|machine| machine.last_output())
        .ok_or(ComposeError::NoOutput)?;

    debug!("pipeline {:?} -> {}", phases, signal);
    Ok(signal)
}

/// Run one machine per phase in a feedback ring and return the last signal
/// emitted by the final machine
pub async fn run_ring(image: &[i64], phases: &[i64]) -> Result<i64, ComposeError> {
    check_phases(phases)?;

    let channels: Vec<Channel> = phases.iter().map(|&phase| Channel::with_values([phase])).collect();
    channels[0].push(0);

    let handles = (0..channels.len())
        .map(|i| {
            let next = (i + 1) % channels.len();
            spawn(image.to_vec(), channels[i].clone(), channels[next].clone())
        })
        .collect();

    let machines = wait_all(handles).await?;
    let signal = machines
        .last()
        .and_then(|machine| machine.last_output())
        .ok_or(ComposeError::NoOutput)?;

    debug!("ring {:?} -> {}", phases, signal);
    Ok(signal)
}

/// Highest pipeline signal over every ordering of `phase_set`
pub async fn best_pipeline(image: &[i64], phase_set: &[i64]) -> Result<BestPhases, ComposeError> {
    let mut best: Option<BestPhases> = None;
    for phases in permutations(phase_set) {
        let signal = run_pipeline(image, &phases).await?;
        if best.as_ref().map_or(true, |b| signal > b.signal) {
            best = Some(BestPhases { signal, phases });
        }
    }

    let best = best.ok_or_else(|| ComposeError::InvalidSetup("empty phase set".to_string()))?;
    info!("best pipeline phases {:?} -> {}", best.phases, best.signal);
    Ok(best)
}

/// Highest ring signal over every ordering of `phase_set`
pub async fn best_ring(image: &[i64], phase_set: &[i64]) -> Result<BestPhases, ComposeError> {
    let mut best: Option<BestPhases> = None;
    for phases in permutations(phase_set) {
        let signal = run_ring(image, &phases).await?;
        if best.as_ref().map_or(true, |b| signal > b.signal) {
            best = Some(BestPhases { signal, phases });
        }
    }

    let best = best.ok_or_else(|| ComposeError::InvalidSetup("empty phase set".to_string()))?;
    info!("best ring phases {:?} -> {}", best.phases, best.signal);
    Ok(best)
}

/// Every ordering of `items`, in lexicographic order of positions
pub fn permutations(items: &[i64]) -> Vec<Vec<i64>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }

    let mut result = Vec::new();
    for (i, &first) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for tail in permutations(&rest) {
            let mut ordering = Vec::with_capacity(items.len());
            ordering.push(first);
            ordering.extend(tail);
            result.push(ordering);
        }
    }
    result
}
