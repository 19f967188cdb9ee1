//! Configuration types for the simulator.

use thiserror::Error;

/// Default upper bound on cycles the driver will run.
pub const DEFAULT_MAX_CYCLES: u64 = 10_000;

/// Default number of consecutive High executions before the starvation guard fires.
pub const DEFAULT_STARVATION_THRESHOLD: u32 = 5;

/// Errors raised when validating a configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_cycles must be positive")]
    ZeroMaxCycles,
    #[error("starvation_threshold must be positive")]
    ZeroStarvationThreshold,
}

/// Configuration for a full simulation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Upper bound on cycles run by the driver
    pub max_cycles: u64,
    /// Consecutive High executions that trigger the starvation guard
    pub starvation_threshold: u32,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    pub verbosity: u8,
    /// Whether the presenter prints the queue state before each cycle
    pub show_state: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            starvation_threshold: DEFAULT_STARVATION_THRESHOLD,
            verbosity: 0,
            show_state: true,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cycles == 0 {
            return Err(ConfigError::ZeroMaxCycles);
        }
        if self.starvation_threshold == 0 {
            return Err(ConfigError::ZeroStarvationThreshold);
        }
        Ok(())
    }

    /// Extract the engine configuration as a separate struct.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            starvation_threshold: self.starvation_threshold,
            verbosity: self.verbosity,
        }
    }
}

/// Configuration consumed by the scheduling engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub starvation_threshold: u32,
    pub verbosity: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        SimulationConfig::default().engine_config()
    }
}
