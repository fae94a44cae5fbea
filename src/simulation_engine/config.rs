// simulation_engine/config.rs
use crate::global_variables::{
    DEFAULT_INITIAL_FUEL, DEFAULT_REFUEL_AMOUNT, DEFAULT_TICK_MS, DEFAULT_UNSAFE_GAP_MS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a simulation run. Every field falls back to its default when
/// missing from the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wait between ticks. Each tick advances a vehicle by one distance unit.
    pub tick_ms: u64,
    /// Delay between the read and the write of a counter update.
    pub unsafe_gap_ms: u64,
    /// Start with the mutually exclusive counter strategy.
    pub safe_mode: bool,
    /// Fuel granted to every fuel-consuming vehicle when a run is built. 0 disables it.
    pub initial_fuel: f64,
    /// Amount added by the per-vehicle refuel control.
    pub refuel_amount: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            unsafe_gap_ms: DEFAULT_UNSAFE_GAP_MS,
            safe_mode: false,
            initial_fuel: DEFAULT_INITIAL_FUEL,
            refuel_amount: DEFAULT_REFUEL_AMOUNT,
        }
    }
}

impl SimulationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be at least 1".into()));
        }
        if self.initial_fuel < 0.0 || !self.initial_fuel.is_finite() {
            return Err(ConfigError::Invalid("initial_fuel must be >= 0".into()));
        }
        if !(self.refuel_amount > 0.0) {
            return Err(ConfigError::Invalid("refuel_amount must be > 0".into()));
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn unsafe_gap(&self) -> Duration {
        Duration::from_millis(self.unsafe_gap_ms)
    }
}
