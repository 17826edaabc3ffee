//! The single-threaded reference engine.
//!
//! Simulates the whole grid as one population with no padding, no channels,
//! and no cycle bookkeeping.  The per-tick body is the same sequence a
//! patch runs locally (advance, bust ghosts, spread, record), which is what
//! makes this engine the oracle for the concurrent one: for any sufficient
//! padding the two must produce identical output.

use std::collections::BTreeMap;

use cordon_agent::Person;
use cordon_core::{Output, PersonId, Scenario, Statistics, TraceEntry, Xy};

/// Run `scenario` to completion on the calling thread.
pub fn simulate(scenario: Scenario) -> Output {
    let mut sim = Sequential::new(scenario);
    for _ in 0..sim.scenario.ticks {
        sim.tick();
    }
    sim.into_output()
}

struct Sequential {
    scenario: Scenario,
    population: Vec<Person>,
    /// Current position of `population[i]`.
    positions: Vec<Xy>,
    /// Pre-move positions of persons already advanced this tick.
    ghosts: Vec<Xy>,
    trace: Vec<TraceEntry>,
    statistics: BTreeMap<String, Vec<Statistics>>,
}

impl Sequential {
    fn new(scenario: Scenario) -> Self {
        let population: Vec<Person> = scenario
            .population
            .iter()
            .enumerate()
            .map(|(id, info)| Person::new(PersonId::from(id), info, scenario.parameters.clone()))
            .collect();
        let positions = population.iter().map(|p| p.position).collect();
        let statistics = scenario
            .queries
            .keys()
            .map(|key| (key.clone(), Vec::with_capacity(scenario.ticks + 1)))
            .collect();
        let mut sim = Self {
            scenario,
            ghosts: Vec::with_capacity(population.len()),
            population,
            positions,
            trace: Vec::new(),
            statistics,
        };
        sim.record_tick();
        sim
    }

    fn tick(&mut self) {
        let grid = self.scenario.grid();
        for index in 0..self.population.len() {
            self.ghosts.push(self.population[index].position);
            self.population[index].tick(
                &grid,
                &self.scenario.obstacles,
                &self.positions,
                &self.ghosts,
            );
            self.positions[index] = self.population[index].position;
        }
        self.ghosts.clear();

        let radius = self.scenario.parameters.infection_radius;
        for i in 0..self.population.len() {
            for j in i + 1..self.population.len() {
                if self.population[i].position.manhattan(self.population[j].position) > radius {
                    continue;
                }
                if self.population[i].is_infectious()
                    && self.population[i].is_coughing()
                    && self.population[j].is_breathing()
                {
                    self.population[j].infect();
                }
                if self.population[j].is_infectious()
                    && self.population[j].is_coughing()
                    && self.population[i].is_breathing()
                {
                    self.population[i].infect();
                }
            }
        }

        self.record_tick();
    }

    /// Append the current state to the trace and every query's counts.
    fn record_tick(&mut self) {
        if self.scenario.trace {
            self.trace
                .push(TraceEntry::new(self.population.iter().map(Person::info).collect()));
        }
        for (key, query) in &self.scenario.queries {
            let mut counts = Statistics::default();
            for person in &self.population {
                if !query.area.contains(person.position) {
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
            // The key was seeded from the same query map at construction.
            self.statistics
                .get_mut(key)
                .expect("seeded query key")
                .push(counts);
        }
    }

    fn into_output(self) -> Output {
        Output::new(self.scenario, self.trace, self.statistics)
    }
}
