//! Command-line driver for the scheduler simulation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cpusched::config::{DEFAULT_MAX_CYCLES, DEFAULT_STARVATION_THRESHOLD};
use cpusched::presenter::{render_cycle, render_summary, START_BANNER};
use cpusched::{Simulation, SimulationConfig};

/// Multilevel priority CPU scheduler simulation.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Process file: one `id,name,priority,cycles[,resource]` record per line
    input: PathBuf,

    /// Maximum number of cycles to simulate
    #[arg(default_value_t = DEFAULT_MAX_CYCLES)]
    max_cycles: u64,

    /// Consecutive High executions before Medium/Low is forced
    #[arg(long, default_value_t = DEFAULT_STARVATION_THRESHOLD)]
    starvation_threshold: u32,

    /// Diagnostic verbosity on stderr (0-3)
    #[arg(short, long, default_value_t = 0)]
    verbosity: u8,

    /// Do not print queue state before each cycle
    #[arg(long)]
    no_state: bool,
}

impl Args {
    fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            max_cycles: self.max_cycles,
            starvation_threshold: self.starvation_threshold,
            verbosity: self.verbosity,
            show_state: !self.no_state,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut sim = match Simulation::from_path(&args.input, args.simulation_config()) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("{}", START_BANNER);
    let summary = sim.run(|snapshot, report| {
        for line in render_cycle(snapshot, report) {
            println!("{}", line);
        }
    });
    println!("{}", render_summary(&summary));

    ExitCode::SUCCESS
}
