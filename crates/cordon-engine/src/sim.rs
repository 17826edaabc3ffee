//! The orchestrator: cycle derivation, patch construction, channel wiring,
//! thread lifecycle.

use std::sync::Arc;
use std::thread;

use cordon_agent::Person;
use cordon_core::{Output, Parameters, PatchId, PersonId, Scenario};
use cordon_grid::ReachabilityMap;
use crossbeam_channel::{bounded, unbounded};
use tracing::{debug, info};

use crate::channel::padding_channel;
use crate::collector::{self, Collected, CollectorMode, OUTPUT_QUEUE_DEPTH};
use crate::patch::PatchWorker;
use crate::{EngineError, EngineResult, Validator};

// ── Cycle duration ────────────────────────────────────────────────────────────

/// The largest number of ticks a patch may simulate between padding
/// exchanges, or 0 if the padding admits none.
///
/// The padding must absorb two kinds of drift for a whole cycle:
/// *movement uncertainty* — a person's influence envelope grows by one cell
/// per tick in each of ±x and ±y, i.e. 2 cells of Manhattan diameter per
/// tick — and *infection uncertainty* — each started incubation period lets
/// the infection jump another `infection_radius` cells.
pub fn cycle_length(padding: usize, parameters: &Parameters) -> usize {
    let movement = |ticks: usize| 2 * ticks;
    let infection =
        |ticks: usize| ticks.div_ceil(parameters.incubation_time) * parameters.infection_radius;

    let mut ticks = 1;
    while padding >= movement(ticks) + infection(ticks) {
        ticks += 1;
    }
    ticks - 1
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// A fully wired concurrent simulation, ready to run.
///
/// Construction partitions the population, derives the cycle duration, and
/// wires one padding channel per causally relevant border pair; [`run`]
/// spawns one thread per patch, collects their output, and joins them.
/// Everything built here is immutable for the lifetime of the run.
///
/// [`run`]: Simulation::run
pub struct Simulation {
    scenario: Arc<Scenario>,
    cycle: usize,
    mode: CollectorMode,
    workers: Vec<PatchWorker>,
}

impl Simulation {
    /// Build a simulation over `scenario` with the given padding width.
    ///
    /// Fails with [`EngineError::InsufficientPadding`] iff the padding
    /// cannot cover even a single-tick cycle.
    pub fn new(
        scenario: Scenario,
        padding: usize,
        validator: Arc<dyn Validator>,
    ) -> EngineResult<Self> {
        let cycle = cycle_length(padding, &scenario.parameters);
        if cycle == 0 {
            return Err(EngineError::InsufficientPadding(padding));
        }

        let scenario = Arc::new(scenario);
        let grid = scenario.grid();

        let population: Vec<Person> = scenario
            .population
            .iter()
            .enumerate()
            .map(|(id, info)| Person::new(PersonId::from(id), info, scenario.parameters.clone()))
            .collect();

        // ── Patches: slice the population by patch area ───────────────────
        let mut workers = Vec::new();
        let mut assigned = 0;
        for (index, area) in scenario
            .partition
            .patch_areas(scenario.grid_size)
            .into_iter()
            .enumerate()
        {
            let residents: Vec<Person> = population
                .iter()
                .filter(|person| area.contains(person.position))
                .cloned()
                .collect();
            assigned += residents.len();
            workers.push(PatchWorker::new(
                PatchId::from(index),
                Arc::clone(&scenario),
                area,
                area.padded(padding, &grid),
                cycle,
                residents,
                Arc::clone(&validator),
            ));
        }
        assert_eq!(
            assigned,
            population.len(),
            "every person must be resident in exactly one patch"
        );

        // ── Channels: one per causally relevant ordered border pair ───────
        //
        // The pair (outer, inner) gets a channel when inner's patch area
        // reaches into outer's padding geometrically and, with obstacles,
        // when that region can actually influence outer's patch.  Without
        // obstacles the whole grid is one inhabited component and the
        // geometric test is already exact.
        let reachability =
            (!scenario.obstacles.is_empty()).then(|| ReachabilityMap::new(&scenario));
        let mut links = 0;
        for outer in 0..workers.len() {
            for inner in 0..workers.len() {
                if inner == outer {
                    continue;
                }
                let Some(border) = workers[inner]
                    .patch_area()
                    .intersect(&workers[outer].padded_area())
                else {
                    continue;
                };
                if let Some(map) = &reachability {
                    if !map.may_propagate_from(&border, &workers[outer].patch_area()) {
                        debug!(
                            outer = %workers[outer].id(),
                            inner = %workers[inner].id(),
                            "border pruned: no causal path"
                        );
                        continue;
                    }
                }
                let (writer, reader) = padding_channel(border);
                workers[inner].add_inner(writer);
                workers[outer].add_outer(reader);
                links += 1;
            }
        }

        info!(
            patches = workers.len(),
            links, cycle, padding, "simulation wired"
        );
        Ok(Self {
            scenario,
            cycle,
            mode: CollectorMode::default(),
            workers,
        })
    }

    /// Select how worker output is drained.  Both modes produce identical
    /// output; lockstep (the default) bounds collector memory.
    pub fn collector_mode(mut self, mode: CollectorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Ticks between padding exchanges for this run.
    pub fn cycle_ticks(&self) -> usize {
        self.cycle
    }

    /// Number of padding channels after reachability pruning.
    pub fn channel_count(&self) -> usize {
        self.workers.iter().map(PatchWorker::channel_count).sum()
    }

    /// Run the simulation to completion and return the merged output.
    ///
    /// Spawns one thread per patch and drains their entries on the calling
    /// thread.  On a worker failure every thread is still joined and the
    /// first worker error (a panic winning over a secondary disconnect) is
    /// returned.
    pub fn run(self) -> EngineResult<Output> {
        let Self {
            scenario,
            cycle: _,
            mode,
            workers,
        } = self;

        let mut handles: Vec<(PatchId, thread::JoinHandle<EngineResult<()>>)> = Vec::new();
        let mut spawn = |worker: PatchWorker, sink| -> EngineResult<()> {
            let id = worker.id();
            let handle = thread::Builder::new()
                .name(format!("patch-{}", id.index()))
                .spawn(move || worker.run(sink))?;
            handles.push((id, handle));
            Ok(())
        };

        let collected: EngineResult<Collected> = match mode {
            CollectorMode::Lockstep => {
                let mut receivers = Vec::with_capacity(workers.len());
                let mut spawn_failure = None;
                for worker in workers {
                    let (sink, receiver) = bounded(OUTPUT_QUEUE_DEPTH);
                    receivers.push(receiver);
                    if let Err(error) = spawn(worker, sink) {
                        spawn_failure = Some(error);
                        break;
                    }
                }
                match spawn_failure {
                    Some(error) => Err(error),
                    None => collector::drain_lockstep(&receivers, &scenario),
                }
            }
            CollectorMode::SharedQueue => {
                let (sink, receiver) = unbounded();
                let patch_count = workers.len();
                let mut spawn_failure = None;
                for worker in workers {
                    if let Err(error) = spawn(worker, sink.clone()) {
                        spawn_failure = Some(error);
                        break;
                    }
                }
                drop(sink);
                match spawn_failure {
                    Some(error) => Err(error),
                    None => collector::drain_shared(&receiver, patch_count, &scenario),
                }
            }
        };

        // Join everything before looking at the collector's verdict; a
        // worker error is the root cause, a collector disconnect merely its
        // echo.
        let mut failure: Option<EngineError> = None;
        for (id, handle) in handles {
            let result = match handle.join() {
                Ok(result) => result,
                Err(_) => Err(EngineError::Panicked(id)),
            };
            if let Err(error) = result {
                debug!(patch = %id, %error, "worker failed");
                if failure.is_none() || matches!(error, EngineError::Panicked(_)) {
                    failure = Some(error);
                }
            }
        }
        if let Some(error) = failure {
            return Err(error);
        }

        let Collected { trace, statistics } = collected?;
        let scenario = Arc::try_unwrap(scenario).unwrap_or_else(|shared| (*shared).clone());
        Ok(Output::new(scenario, trace, statistics))
    }
}
