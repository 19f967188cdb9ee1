//! Discrete-time simulator of a multilevel priority CPU scheduler.
//!
//! Processes live in High/Medium/Low ready queues. Each cycle the engine runs one
//! process under strict priority, forces a non-High pick after a run of High
//! executions, and diverts a process to the Blocked queue the first time it asks
//! for its resource. The engine emits structured events; `presenter` turns them
//! into text.

pub mod config;
pub mod loader;
pub mod logging;
pub mod models;
pub mod presenter;
pub mod queue;
pub mod scheduler;
pub mod simulation;

#[cfg(feature = "python")]
mod python;

pub use config::{ConfigError, EngineConfig, SimulationConfig};
pub use loader::{load_from_path, parse_records, LoadError};
pub use models::{PriorityBand, ProcessRecord, QueueKind, ResourceKind};
pub use queue::ProcessQueue;
pub use scheduler::{
    CycleOutcome, CycleReport, EventKind, ProcessRef, QueueEntry, QueueSnapshot, SchedulerEngine,
    SchedulerEvent, Selection,
};
pub use simulation::{RunSummary, Simulation, SimulationError};
