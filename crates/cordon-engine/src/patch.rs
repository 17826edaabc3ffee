//! The patch worker: one thread's share of the simulation.
//!
//! # Populations
//!
//! A worker owns two populations.  The *resident* population holds exactly
//! the persons whose position lies inside `patch_area`; patch areas are
//! disjoint, so every person is resident in exactly one patch.  The
//! *combined* population additionally holds clones of neighbors' residents
//! currently inside the padded ring; local ticks run over it so that
//! border-crossing movement and infection see the same neighbors the
//! sequential engine would.  Both lists are kept in strictly ascending
//! person-id order.
//!
//! # Cycle protocol
//!
//! Every `cycle` ticks the worker re-exchanges border state: it *writes*
//! its resident subset for every inner channel, then *reads* one snapshot
//! from every outer channel and rebuilds the combined population by
//! id-ordered merge.  Writes strictly precede reads, and by the time a
//! worker starts cycle `c` every peer has consumed its cycle `c − 1`
//! snapshot (it must have, to have finished its own previous exchange), so
//! the capacity-1 slots are free and no cycle of blocked writers can form
//! even though the channel graph itself is cyclic.
//!
//! The padded copies drift from their home patch's truth as a cycle
//! progresses; the padding width is sized (see
//! [`cycle_length`][crate::sim::cycle_length]) so the drift cannot reach
//! `patch_area` before the next exchange discards them.

use std::collections::BTreeMap;
use std::sync::Arc;

use cordon_agent::Person;
use cordon_core::{PatchId, PersonId, PersonInfo, Rectangle, Scenario, Statistics, Xy};
use crossbeam_channel::Sender;
use tracing::trace;

use crate::channel::{PaddingReader, PaddingWriter, Snapshot};
use crate::{EngineError, EngineResult, Validator};

// ── Output entry ──────────────────────────────────────────────────────────────

/// One patch's contribution to one tick of the final output.
pub(crate) struct OutputEntry {
    pub patch: PatchId,
    pub tick: usize,
    /// Counts for every query overlapping this patch's padded area.
    pub statistics: BTreeMap<String, Statistics>,
    /// Resident persons with their ids, ascending; `None` when tracing is
    /// disabled.
    pub trace: Option<Vec<(PersonId, PersonInfo)>>,
}

// ── PatchWorker ───────────────────────────────────────────────────────────────

/// The per-patch simulation state, run to completion on its own thread.
pub(crate) struct PatchWorker {
    id: PatchId,
    scenario: Arc<Scenario>,
    patch_area: Rectangle,
    padded_area: Rectangle,
    /// Ticks between padding exchanges.
    cycle: usize,
    /// Queries whose area overlaps `padded_area`, with their areas.
    queries: Vec<(String, Rectangle)>,
    /// Residents of `patch_area`, ascending by id.
    population: Vec<Person>,
    /// Residents plus padded-ring clones, ascending by id.
    combined: Vec<Person>,
    /// Current position of `combined[i]`, maintained across ticks.
    positions: Vec<Xy>,
    /// Pre-move positions of persons already advanced this tick.
    ghosts: Vec<Xy>,
    inner: Vec<PaddingWriter>,
    outer: Vec<PaddingReader>,
    validator: Arc<dyn Validator>,
}

impl PatchWorker {
    pub fn new(
        id: PatchId,
        scenario: Arc<Scenario>,
        patch_area: Rectangle,
        padded_area: Rectangle,
        cycle: usize,
        population: Vec<Person>,
        validator: Arc<dyn Validator>,
    ) -> Self {
        let queries = scenario
            .queries
            .iter()
            .filter(|(_, query)| query.area.overlaps(&padded_area))
            .map(|(key, query)| (key.clone(), query.area))
            .collect();
        Self {
            id,
            scenario,
            patch_area,
            padded_area,
            cycle,
            queries,
            population,
            combined: Vec::new(),
            positions: Vec::new(),
            ghosts: Vec::new(),
            inner: Vec::new(),
            outer: Vec::new(),
            validator,
        }
    }

    // ── Wiring accessors (used by the orchestrator) ───────────────────────

    pub fn id(&self) -> PatchId {
        self.id
    }

    pub fn patch_area(&self) -> Rectangle {
        self.patch_area
    }

    pub fn padded_area(&self) -> Rectangle {
        self.padded_area
    }

    pub fn add_inner(&mut self, writer: PaddingWriter) {
        self.inner.push(writer);
    }

    pub fn add_outer(&mut self, reader: PaddingReader) {
        self.outer.push(reader);
    }

    pub fn channel_count(&self) -> usize {
        self.outer.len()
    }

    // ── Main loop ─────────────────────────────────────────────────────────

    /// Simulate all ticks, emitting `ticks + 1` output entries into `sink`
    /// in ascending tick order (tick 0 reflects the initial population).
    pub fn run(mut self, sink: Sender<OutputEntry>) -> EngineResult<()> {
        self.emit(0, &sink)?;
        for tick in 0..self.scenario.ticks {
            if tick % self.cycle == 0 {
                self.exchange()?;
            }
            self.validator.on_patch_tick(tick, self.id);
            self.local_tick(tick);
            self.emit(tick + 1, &sink)?;
        }
        Ok(())
    }

    /// Exchange border snapshots with every neighbor and rebuild the
    /// combined population.  All writes happen before any read.
    fn exchange(&mut self) -> EngineResult<()> {
        trace!(patch = %self.id, "exchanging padding snapshots");
        for writer in &self.inner {
            let snapshot: Snapshot = self
                .population
                .iter()
                .filter(|person| writer.area.contains(person.position))
                .cloned()
                .collect();
            writer
                .write(snapshot)
                .map_err(|_| EngineError::Interrupted(self.id))?;
        }

        self.combined.clear();
        let mut incoming: Vec<Person> = Vec::new();
        for reader in &self.outer {
            let snapshot = reader
                .read()
                .map_err(|_| EngineError::Interrupted(self.id))?;
            incoming = merge_by_id(incoming, snapshot);
        }
        let residents = std::mem::take(&mut self.population);
        self.combined = merge_by_id(incoming, residents);
        self.positions = self.combined.iter().map(|p| p.position).collect();
        Ok(())
    }

    /// Advance every person in the combined population by one tick, spread
    /// the infection, and re-derive the resident population.
    fn local_tick(&mut self, tick: usize) {
        // Movement.  Persons advance in id order; `positions` holds the
        // already-moved position for earlier persons and the pre-move one
        // for later persons, while `ghosts` pins the pre-move cells of the
        // already-moved so nobody steps into a cell just vacated this tick.
        for index in 0..self.combined.len() {
            self.validator
                .on_person_tick(tick, self.id, self.combined[index].id);
            self.ghosts.push(self.combined[index].position);
            self.combined[index].tick(
                &self.padded_area,
                &self.scenario.obstacles,
                &self.positions,
                &self.ghosts,
            );
            self.positions[index] = self.combined[index].position;
        }
        self.ghosts.clear();

        // Infection spreading over unordered pairs.
        let radius = self.scenario.parameters.infection_radius;
        for i in 0..self.combined.len() {
            for j in i + 1..self.combined.len() {
                if self.combined[i].position.manhattan(self.combined[j].position) > radius {
                    continue;
                }
                if self.combined[i].is_infectious()
                    && self.combined[i].is_coughing()
                    && self.combined[j].is_breathing()
                {
                    self.combined[j].infect();
                }
                if self.combined[j].is_infectious()
                    && self.combined[j].is_coughing()
                    && self.combined[i].is_breathing()
                {
                    self.combined[i].infect();
                }
            }
        }

        self.population = self
            .combined
            .iter()
            .filter(|person| self.patch_area.contains(person.position))
            .cloned()
            .collect();
    }

    /// Send this tick's statistics (and trace, when enabled) downstream.
    fn emit(&self, tick: usize, sink: &Sender<OutputEntry>) -> EngineResult<()> {
        let mut statistics = BTreeMap::new();
        for (key, area) in &self.queries {
            let mut counts = Statistics::default();
            for person in &self.population {
                if !area.contains(person.position) {
                    continue;
                }
                if person.is_susceptible() {
                    counts.susceptible += 1;
                } else if person.is_infected() {
                    counts.infected += 1;
                } else if person.is_infectious() {
                    counts.infectious += 1;
                } else {
                    counts.recovered += 1;
                }
            }
            statistics.insert(key.clone(), counts);
        }

        let trace = self
            .scenario
            .trace
            .then(|| self.population.iter().map(|p| (p.id, p.info())).collect());

        sink.send(OutputEntry {
            patch: self.id,
            tick,
            statistics,
            trace,
        })
        .map_err(|_| EngineError::Interrupted(self.id))
    }
}

// ── Sort-merge ────────────────────────────────────────────────────────────────

/// Merge two id-ascending person lists into one.
///
/// # Panics
///
/// Panics if the same id appears in both lists: patch areas are disjoint,
/// so one person arriving from two sources means the protocol broke.
pub(crate) fn merge_by_id(a: Vec<Person>, b: Vec<Person>) -> Vec<Person> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut left = a.into_iter();
    let mut right = b.into_iter();
    let mut next_left = left.next();
    let mut next_right = right.next();

    loop {
        match (next_left.take(), next_right.take()) {
            (Some(x), Some(y)) => {
                assert!(x.id != y.id, "person {} arrived from two patches", x.id);
                if x.id < y.id {
                    merged.push(x);
                    next_left = left.next();
                    next_right = Some(y);
                } else {
                    merged.push(y);
                    next_left = Some(x);
                    next_right = right.next();
                }
            }
            (Some(x), None) => {
                merged.push(x);
                merged.extend(left);
                break;
            }
            (None, Some(y)) => {
                merged.push(y);
                merged.extend(right);
                break;
            }
            (None, None) => break,
        }
    }
    merged
}
