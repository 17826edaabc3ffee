//! `cordon` — run a pandemic scenario and write the output JSON.
//!
//! ```text
//! cordon --scenario city.json --out result.json --padding 10
//! cordon --scenario city.json --out result.json --engine sequential
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use cordon_core::{output, scenario};
use cordon_engine::{sequential, CollectorMode, NoopValidator, Simulation};

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum Engine {
    /// One worker thread per patch, per-worker output queues.
    Parallel,
    /// One worker thread per patch, a single shared output queue.
    SharedQueue,
    /// The single-threaded reference engine.
    Sequential,
}

#[derive(Debug, Parser)]
#[command(name = "cordon", about = "Patch-parallel pandemic simulation over a 2D grid")]
struct Args {
    /// Path of the scenario JSON to simulate.
    #[arg(long)]
    scenario: PathBuf,

    /// Path the output JSON is written to.
    #[arg(long)]
    out: PathBuf,

    /// Padding width in cells around each patch.
    #[arg(long, default_value_t = 10)]
    padding: usize,

    #[arg(long, value_enum, default_value_t = Engine::Parallel)]
    engine: Engine,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let scenario = scenario::load(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario.display()))?;
    println!("Scenario: {}", scenario.name);
    println!("Ticks: {}", scenario.ticks);
    info!(patches = scenario.patch_count(), "scenario loaded");

    let start = Instant::now();
    let result = match args.engine {
        Engine::Sequential => sequential::simulate(scenario),
        Engine::Parallel | Engine::SharedQueue => {
            let mode = match args.engine {
                Engine::SharedQueue => CollectorMode::SharedQueue,
                _ => CollectorMode::Lockstep,
            };
            Simulation::new(scenario, args.padding, Arc::new(NoopValidator))?
                .collector_mode(mode)
                .run()?
        }
    };
    println!("Time: {}ms", start.elapsed().as_millis());

    output::save(&result, &args.out)
        .with_context(|| format!("writing output {}", args.out.display()))?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
