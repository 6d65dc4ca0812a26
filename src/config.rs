use log::warn;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_QUIET_MS: u64 = 1000;
const DEFAULT_YIELD_INTERVAL: u32 = 512;
const DEFAULT_MAX_MACHINES: usize = 16;
const DEFAULT_MAX_MEMORY_CELLS: usize = 1 << 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// How long an interactive controller waits for output before deciding
    /// the machine has gone quiet
    pub quiet_period: Duration,
    /// Instructions a machine executes between cooperative yields
    pub yield_interval: u32,
    /// Upper bound on machines wired into one pipeline or ring
    pub max_machines: usize,
    /// Largest number of cells a growable memory may reach
    pub max_memory_cells: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(DEFAULT_QUIET_MS),
            yield_interval: DEFAULT_YIELD_INTERVAL,
            max_machines: DEFAULT_MAX_MACHINES,
            max_memory_cells: DEFAULT_MAX_MEMORY_CELLS,
        }
    }
}

impl Config {
    /// Read the configuration from `INTCODE_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let quiet_ms = parse_var(&lookup, "INTCODE_QUIET_MS", DEFAULT_QUIET_MS)?;
        let yield_interval = parse_var(&lookup, "INTCODE_YIELD_INTERVAL", defaults.yield_interval)?;
        let max_machines = parse_var(&lookup, "INTCODE_MAX_MACHINES", defaults.max_machines)?;
        let max_memory_cells =
            parse_var(&lookup, "INTCODE_MAX_MEMORY", defaults.max_memory_cells)?;

        Ok(Self {
            quiet_period: Duration::from_millis(quiet_ms),
            yield_interval,
            max_machines,
            max_memory_cells,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::from_env().unwrap_or_else(|err| {
        warn!("{}, falling back to defaults", err);
        Config::default()
    })
});

pub fn init() {
    Lazy::force(&CONFIG);
}
