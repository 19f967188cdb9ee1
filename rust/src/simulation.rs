//! Simulation driver.
//!
//! Loads records into the engine and runs cycles while the cycle budget allows
//! and any queue still holds a record.

use std::path::Path;

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::config::{ConfigError, SimulationConfig};
use crate::loader::{load_from_path, LoadError};
use crate::models::ProcessRecord;
use crate::scheduler::{CycleOutcome, CycleReport, QueueSnapshot, SchedulerEngine};
use crate::{log_changes, log_debug};

/// Errors that stop a simulation before it starts.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("process id {0} is already in the system")]
    DuplicateId(u32),
}

impl SimulationError {
    /// True when the process file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SimulationError::Load(LoadError::NotFound(_)))
    }
}

/// Totals for a finished (or cut short) run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles_run: u64,
    pub executed_cycles: u64,
    pub blocked_cycles: u64,
    pub idle_cycles: u64,
    /// Ids of terminated processes in termination order
    pub terminated: Vec<u32>,
    /// True when the run stopped at `max_cycles` with work left
    pub hit_cycle_limit: bool,
}

/// Owns an engine and enforces the driver loop contract.
pub struct Simulation {
    engine: SchedulerEngine,
    config: SimulationConfig,
    summary: RunSummary,
}

impl Simulation {
    /// Create an empty simulation.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            engine: SchedulerEngine::new(config.engine_config()),
            config,
            summary: RunSummary::default(),
        })
    }

    /// Create a simulation loaded from a process file.
    pub fn from_path(
        path: impl AsRef<Path>,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let mut sim = Self::new(config)?;
        let records = load_from_path(path.as_ref(), sim.config.verbosity)?;
        log_changes!(
            sim.config.verbosity,
            "Loaded {} processes from {}",
            records.len(),
            path.as_ref().display()
        );
        sim.admit_all(records)?;
        Ok(sim)
    }

    /// Admit records into their priority queues.
    ///
    /// Either all records are admitted or none is.
    pub fn admit_all(
        &mut self,
        records: impl IntoIterator<Item = ProcessRecord>,
    ) -> Result<(), SimulationError> {
        let records: Vec<ProcessRecord> = records.into_iter().collect();
        let mut incoming: FxHashSet<u32> = FxHashSet::default();
        for record in &records {
            if self.engine.is_live(record.id()) || !incoming.insert(record.id()) {
                return Err(SimulationError::DuplicateId(record.id()));
            }
        }
        for record in records {
            self.engine.admit(record);
        }
        Ok(())
    }

    /// True once every queue is empty or the cycle budget is spent.
    pub fn is_finished(&self) -> bool {
        self.summary.cycles_run >= self.config.max_cycles || self.engine.all_queues_empty()
    }

    /// Run one cycle if the loop contract still allows it.
    pub fn step(&mut self) -> Option<CycleReport> {
        if self.is_finished() {
            return None;
        }
        let report = self.engine.run_cycle();
        self.record(&report);
        if self.summary.cycles_run >= self.config.max_cycles && !self.engine.all_queues_empty() {
            self.summary.hit_cycle_limit = true;
            log_changes!(
                self.config.verbosity,
                "Cycle limit {} reached with {} processes left",
                self.config.max_cycles,
                self.engine.live_count()
            );
        }
        Some(report)
    }

    /// Run to completion, handing each cycle's report to `on_cycle`.
    ///
    /// The pre-cycle queue snapshot is only taken when `show_state` is set;
    /// otherwise `on_cycle` receives `None`.
    pub fn run<F>(&mut self, mut on_cycle: F) -> RunSummary
    where
        F: FnMut(Option<&QueueSnapshot>, &CycleReport),
    {
        while !self.is_finished() {
            let snapshot = self.config.show_state.then(|| self.engine.snapshot());
            if let Some(report) = self.step() {
                on_cycle(snapshot.as_ref(), &report);
            }
        }
        log_changes!(
            self.config.verbosity,
            "Simulation stopped after {} cycles",
            self.summary.cycles_run
        );
        self.summary.clone()
    }

    pub fn cycles_run(&self) -> u64 {
        self.summary.cycles_run
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn engine(&self) -> &SchedulerEngine {
        &self.engine
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn record(&mut self, report: &CycleReport) {
        self.summary.cycles_run += 1;
        match report.outcome {
            CycleOutcome::Executed => self.summary.executed_cycles += 1,
            CycleOutcome::Blocked => self.summary.blocked_cycles += 1,
            CycleOutcome::Idle => self.summary.idle_cycles += 1,
        }
        if let Some(sel) = report.selection.as_ref().filter(|s| s.terminated) {
            self.summary.terminated.push(sel.id);
        }
        log_debug!(
            self.config.verbosity,
            "Cycle {} -> {:?}",
            report.cycle,
            report.outcome
        );
    }
}
