//! Python bindings for the simulator.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

use crate::config::SimulationConfig;
use crate::presenter::{render_cycle, render_summary};
use crate::simulation::Simulation;

/// Simulation configuration (PyO3 wrapper).
#[pyclass(name = "SimulationConfig")]
#[derive(Clone, Debug)]
pub struct PySimulationConfig {
    #[pyo3(get, set)]
    pub max_cycles: u64,
    #[pyo3(get, set)]
    pub starvation_threshold: u32,
    #[pyo3(get, set)]
    pub verbosity: u8,
    #[pyo3(get, set)]
    pub show_state: bool,
}

#[pymethods]
impl PySimulationConfig {
    #[new]
    #[pyo3(signature = (max_cycles=10000, starvation_threshold=5, verbosity=0, show_state=true))]
    fn new(max_cycles: u64, starvation_threshold: u32, verbosity: u8, show_state: bool) -> Self {
        Self {
            max_cycles,
            starvation_threshold,
            verbosity,
            show_state,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationConfig(max_cycles={}, starvation_threshold={}, verbosity={})",
            self.max_cycles, self.starvation_threshold, self.verbosity
        )
    }
}

impl From<&PySimulationConfig> for SimulationConfig {
    fn from(config: &PySimulationConfig) -> Self {
        SimulationConfig {
            max_cycles: config.max_cycles,
            starvation_threshold: config.starvation_threshold,
            verbosity: config.verbosity,
            show_state: config.show_state,
        }
    }
}

/// A loaded simulation driven from Python.
#[pyclass(name = "Simulation", unsendable)]
pub struct PySimulation {
    inner: Simulation,
}

#[pymethods]
impl PySimulation {
    /// Load a process file and build a simulation.
    ///
    /// Raises FileNotFoundError for a missing file and ValueError for other load or
    /// configuration errors.
    #[staticmethod]
    #[pyo3(signature = (path, config=None))]
    fn from_csv(path: String, config: Option<PySimulationConfig>) -> PyResult<Self> {
        let config = config
            .as_ref()
            .map(SimulationConfig::from)
            .unwrap_or_default();
        match Simulation::from_path(&path, config) {
            Ok(inner) => Ok(Self { inner }),
            Err(e) if e.is_not_found() => Err(pyo3::exceptions::PyFileNotFoundError::new_err(
                e.to_string(),
            )),
            Err(e) => Err(pyo3::exceptions::PyValueError::new_err(e.to_string())),
        }
    }

    /// Run one cycle and return its rendered lines, or None when finished.
    fn step(&mut self) -> Option<Vec<String>> {
        let snapshot = self
            .inner
            .config()
            .show_state
            .then(|| self.inner.engine().snapshot());
        let report = self.inner.step()?;
        Some(render_cycle(snapshot.as_ref(), &report))
    }

    /// Run to completion and return every rendered line, summary last.
    fn run(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        let summary = self
            .inner
            .run(|snapshot, report| lines.extend(render_cycle(snapshot, report)));
        lines.push(render_summary(&summary));
        lines
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    #[getter]
    fn cycles_run(&self) -> u64 {
        self.inner.cycles_run()
    }

    fn __repr__(&self) -> String {
        format!(
            "Simulation(cycles_run={}, live={})",
            self.inner.cycles_run(),
            self.inner.engine().live_count()
        )
    }
}

/// The cpusched Python module.
#[pymodule]
fn cpusched(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySimulationConfig>()?;
    m.add_class::<PySimulation>()?;
    Ok(())
}
