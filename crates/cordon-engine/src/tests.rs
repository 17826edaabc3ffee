//! Integration tests for the concurrent engine.
//!
//! The sequential engine is the oracle: every concurrent configuration must
//! reproduce its output exactly.  Determinism is exact because persons draw
//! randomness from seed-keyed hash chains, so all equality assertions are
//! full structural equality.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cordon_core::{
    Direction, Health, InfectionState, Parameters, Partition, PatchId, PersonId, PersonInfo,
    Query, Rectangle, Scenario, Statistics, Xy,
};

use crate::channel::padding_channel;
use crate::patch::merge_by_id;
use crate::{
    cycle_length, sequential, CollectorMode, EngineError, NoopValidator, Simulation, Validator,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn rect(x: isize, y: isize, w: isize, h: isize) -> Rectangle {
    Rectangle::new(Xy::new(x, y), Xy::new(w, h))
}

fn parameters(
    cough: usize,
    breath: usize,
    divisor: usize,
    recovery: usize,
    radius: usize,
    incubation: usize,
) -> Arc<Parameters> {
    Arc::new(Parameters {
        cough_threshold: cough,
        breath_threshold: breath,
        acceleration_divisor: divisor,
        recovery_time: recovery,
        infection_radius: radius,
        incubation_time: incubation,
    })
}

/// Thresholds of 256 make every byte draw hit; a divisor of 256 pins the
/// acceleration to north, so persons on a one-row grid never move.
fn pinned_parameters(radius: usize, incubation: usize) -> Arc<Parameters> {
    parameters(256, 256, 256, 120, radius, incubation)
}

fn person(index: usize, position: Xy, health: Health) -> PersonInfo {
    PersonInfo::new(
        format!("person-{index}"),
        position,
        (0..32).map(|b| (index * 31 + b * 7 + 5) as u8).collect(),
        InfectionState::new(health, 0),
        Direction::None,
    )
}

fn whole_grid_query(grid_size: Xy) -> BTreeMap<String, Query> {
    BTreeMap::from([(
        "everyone".to_string(),
        Query {
            area: Rectangle::new(Xy::ZERO, grid_size),
        },
    )])
}

#[allow(clippy::too_many_arguments)]
fn scenario(
    grid_size: Xy,
    partition: Partition,
    obstacles: Vec<Rectangle>,
    population: Vec<PersonInfo>,
    parameters: Arc<Parameters>,
    ticks: usize,
    trace: bool,
) -> Scenario {
    let scenario = Scenario {
        name: "engine-test".into(),
        parameters,
        ticks,
        grid_size,
        trace,
        partition,
        obstacles,
        queries: whole_grid_query(grid_size),
        population,
    };
    scenario.validate().expect("test scenario must be valid");
    scenario
}

/// A mixed population on a 12×12 grid: scattered walkers, one infectious.
fn walkers_scenario(partition: Partition, ticks: usize, trace: bool) -> Scenario {
    let positions = [
        (1, 1),
        (4, 2),
        (5, 5),
        (6, 6),
        (7, 5),
        (10, 3),
        (2, 9),
        (9, 10),
    ];
    let population = positions
        .iter()
        .enumerate()
        .map(|(index, &(x, y))| {
            let health = if index == 3 {
                Health::Infectious
            } else {
                Health::Susceptible
            };
            person(index, Xy::new(x, y), health)
        })
        .collect();
    // Permissive thresholds and a divisor of 32 so all eight headings occur.
    scenario(
        Xy::new(12, 12),
        partition,
        vec![],
        population,
        parameters(128, 128, 32, 5, 1, 2),
        ticks,
        trace,
    )
}

fn run_parallel(scenario: Scenario, padding: usize) -> cordon_core::Output {
    Simulation::new(scenario, padding, Arc::new(NoopValidator))
        .unwrap()
        .run()
        .unwrap()
}

// ── Cycle duration ────────────────────────────────────────────────────────────

mod cycle {
    use super::*;

    #[test]
    fn largest_cycle_fitting_the_padding() {
        // movement 2K, infection ceil(K / incubation) * radius
        let params = pinned_parameters(1, 2);
        assert_eq!(cycle_length(4, &params), 1);
        assert_eq!(cycle_length(5, &params), 2);
        assert_eq!(cycle_length(8, &params), 3);

        let fast_incubation = pinned_parameters(2, 1);
        assert_eq!(cycle_length(10, &fast_incubation), 2);
    }

    #[test]
    fn minimum_padding_boundary() {
        // One tick needs 2 + ceil(1/1) * 1 = 3 cells of padding.
        let params = pinned_parameters(1, 1);
        assert_eq!(cycle_length(3, &params), 1);
        assert_eq!(cycle_length(2, &params), 0);
    }

    #[test]
    fn insufficient_padding_refused_at_construction() {
        let scenario = scenario(
            Xy::new(8, 1),
            Partition::new(vec![4], vec![]),
            vec![],
            vec![],
            pinned_parameters(1, 1),
            5,
            false,
        );
        let result = Simulation::new(scenario.clone(), 2, Arc::new(NoopValidator));
        assert!(matches!(
            result.map(|_| ()),
            Err(EngineError::InsufficientPadding(2))
        ));
        assert!(Simulation::new(scenario, 3, Arc::new(NoopValidator)).is_ok());
    }
}

// ── Padding channel ───────────────────────────────────────────────────────────

mod channel {
    use super::*;

    fn snapshot(index: usize, position: Xy) -> Vec<cordon_agent::Person> {
        vec![cordon_agent::Person::new(
            PersonId::from(index),
            &person(index, position, Health::Susceptible),
            pinned_parameters(1, 1),
        )]
    }

    #[test]
    fn snapshots_arrive_in_write_order() {
        let (writer, reader) = padding_channel(rect(0, 0, 2, 2));
        assert_eq!(writer.area, rect(0, 0, 2, 2));
        assert_eq!(reader.area, rect(0, 0, 2, 2));

        let sender = std::thread::spawn(move || {
            // The second write blocks until the first snapshot is consumed.
            assert!(writer.write(snapshot(0, Xy::new(0, 0))).is_ok());
            assert!(writer.write(snapshot(1, Xy::new(1, 1))).is_ok());
        });

        let first = reader.read().ok().unwrap();
        assert_eq!(first[0].id, PersonId(0));
        let second = reader.read().ok().unwrap();
        assert_eq!(second[0].id, PersonId(1));
        sender.join().unwrap();
    }

    #[test]
    fn disconnection_unblocks_with_an_error() {
        let (writer, reader) = padding_channel(rect(0, 0, 1, 1));
        drop(reader);
        assert!(writer.write(Vec::new()).is_err());

        let (writer, reader) = padding_channel(rect(0, 0, 1, 1));
        drop(writer);
        assert!(reader.read().is_err());
    }
}

// ── Sort-merge ────────────────────────────────────────────────────────────────

mod merge {
    use super::*;

    fn persons(ids: &[usize]) -> Vec<cordon_agent::Person> {
        ids.iter()
            .map(|&id| {
                cordon_agent::Person::new(
                    PersonId::from(id),
                    &person(id, Xy::new(0, 0), Health::Susceptible),
                    pinned_parameters(1, 1),
                )
            })
            .collect()
    }

    #[test]
    fn interleaves_by_id() {
        let merged = merge_by_id(persons(&[0, 2, 4]), persons(&[1, 3]));
        let ids: Vec<usize> = merged.iter().map(|p| p.id.index()).collect();
        assert_eq!(ids, [0, 1, 2, 3, 4]);

        assert!(merge_by_id(persons(&[]), persons(&[])).is_empty());
        let ids: Vec<usize> = merge_by_id(persons(&[5]), persons(&[]))
            .iter()
            .map(|p| p.id.index())
            .collect();
        assert_eq!(ids, [5]);
    }

    #[test]
    #[should_panic(expected = "two patches")]
    fn duplicate_ids_are_a_protocol_violation() {
        merge_by_id(persons(&[1]), persons(&[1]));
    }
}

// ── End-to-end scenarios ──────────────────────────────────────────────────────

mod end_to_end {
    use super::*;

    #[test]
    fn empty_population_produces_zero_statistics() {
        let scenario = scenario(
            Xy::new(10, 5),
            Partition::default(),
            vec![],
            vec![],
            pinned_parameters(1, 2),
            10,
            true,
        );
        let output = run_parallel(scenario, 4);

        assert_eq!(output.trace.len(), 11);
        assert!(output.trace.iter().all(|entry| entry.population.is_empty()));
        let counts = &output.statistics["everyone"];
        assert_eq!(counts.len(), 11);
        assert!(counts.iter().all(|c| c.total() == 0));
    }

    #[test]
    fn infection_crosses_a_patch_border_within_radius() {
        // Two stationary persons facing each other across the cut at x = 4,
        // one cell apart: the infection jumps on the very first tick.
        let scenario = scenario(
            Xy::new(8, 1),
            Partition::new(vec![4], vec![]),
            vec![],
            vec![
                person(0, Xy::new(3, 0), Health::Infectious),
                person(1, Xy::new(4, 0), Health::Susceptible),
            ],
            pinned_parameters(1, 2),
            4,
            false,
        );
        let output = run_parallel(scenario, 4);
        let counts = &output.statistics["everyone"];

        assert_eq!(counts[0], Statistics::new(1, 0, 1, 0));
        assert_eq!(counts[1], Statistics::new(0, 1, 1, 0));
        assert_eq!(counts[2], Statistics::new(0, 1, 1, 0));
        // Incubation of 2 elapses: the neighbor turns infectious.
        assert_eq!(counts[3], Statistics::new(0, 0, 2, 0));
    }

    #[test]
    fn infection_out_of_radius_does_not_cross() {
        let scenario = scenario(
            Xy::new(8, 1),
            Partition::new(vec![4], vec![]),
            vec![],
            vec![
                person(0, Xy::new(2, 0), Health::Infectious),
                person(1, Xy::new(4, 0), Health::Susceptible),
            ],
            pinned_parameters(1, 2),
            4,
            false,
        );
        let output = run_parallel(scenario, 4);
        let last = output.statistics["everyone"].last().unwrap();
        assert_eq!(last.susceptible, 1, "two cells apart is out of radius 1");
    }

    #[test]
    fn conservation_of_population() {
        let scenario = walkers_scenario(Partition::new(vec![6], vec![6]), 15, false);
        let output = run_parallel(scenario, 4);
        for counts in &output.statistics["everyone"] {
            assert_eq!(counts.total(), 8, "persons must never appear or vanish");
        }
    }
}

// ── Reference equivalence ─────────────────────────────────────────────────────

mod equivalence {
    use super::*;

    #[test]
    fn single_patch_matches_the_reference() {
        let scenario = walkers_scenario(Partition::default(), 15, true);
        let simulation = Simulation::new(scenario.clone(), 4, Arc::new(NoopValidator)).unwrap();
        assert_eq!(simulation.channel_count(), 0, "one patch needs no channels");
        assert_eq!(simulation.run().unwrap(), sequential::simulate(scenario));
    }

    #[test]
    fn four_patches_match_the_reference() {
        let scenario = walkers_scenario(Partition::new(vec![6], vec![6]), 15, true);
        assert_eq!(
            run_parallel(scenario.clone(), 4),
            sequential::simulate(scenario)
        );
    }

    #[test]
    fn longer_cycles_match_the_reference() {
        // Padding 6 gives a two-tick cycle; exchanges happen every other tick.
        let scenario = walkers_scenario(Partition::new(vec![6], vec![6]), 15, true);
        let simulation = Simulation::new(scenario.clone(), 6, Arc::new(NoopValidator)).unwrap();
        assert_eq!(simulation.cycle_ticks(), 2);
        assert_eq!(simulation.run().unwrap(), sequential::simulate(scenario));
    }

    #[test]
    fn trace_disabled_still_matches_statistics() {
        let scenario = walkers_scenario(Partition::new(vec![6], vec![]), 12, false);
        let output = run_parallel(scenario.clone(), 4);
        assert!(output.trace.is_empty());
        assert_eq!(output, sequential::simulate(scenario));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let scenario = walkers_scenario(Partition::new(vec![6], vec![6]), 10, true);
        assert_eq!(
            run_parallel(scenario.clone(), 4),
            run_parallel(scenario, 4)
        );
    }

    #[test]
    fn both_collector_modes_agree() {
        let scenario = walkers_scenario(Partition::new(vec![6], vec![6]), 12, true);
        let lockstep = Simulation::new(scenario.clone(), 4, Arc::new(NoopValidator))
            .unwrap()
            .collector_mode(CollectorMode::Lockstep)
            .run()
            .unwrap();
        let shared = Simulation::new(scenario, 4, Arc::new(NoopValidator))
            .unwrap()
            .collector_mode(CollectorMode::SharedQueue)
            .run()
            .unwrap();
        assert_eq!(lockstep, shared);
    }
}

// ── Reachability pruning ──────────────────────────────────────────────────────

mod pruning {
    use super::*;

    /// Persons on both sides of a wall at x = 5; the partition cuts at the
    /// wall, so all border traffic would have to cross it.
    fn walled_scenario(radius: usize, ticks: usize) -> Scenario {
        scenario(
            Xy::new(11, 4),
            Partition::new(vec![5], vec![]),
            vec![rect(5, 0, 1, 4)],
            vec![
                person(0, Xy::new(4, 1), Health::Infectious),
                person(1, Xy::new(6, 1), Health::Susceptible),
                person(2, Xy::new(9, 2), Health::Susceptible),
            ],
            parameters(256, 256, 256, 120, radius, 2),
            ticks,
            true,
        )
    }

    #[test]
    fn wall_wider_than_the_radius_prunes_all_channels() {
        let simulation =
            Simulation::new(walled_scenario(1, 6), 4, Arc::new(NoopValidator)).unwrap();
        assert_eq!(simulation.channel_count(), 0);

        let output = simulation.run().unwrap();
        assert_eq!(output, sequential::simulate(walled_scenario(1, 6)));
        let last = output.statistics["everyone"].last().unwrap();
        assert_eq!(last.susceptible, 2, "nothing crosses the wall");
    }

    #[test]
    fn radius_spanning_the_wall_keeps_the_channels() {
        // With radius 2 the infection jumps the one-cell wall, so pruning
        // must keep the border channels and the infection must cross.
        let simulation =
            Simulation::new(walled_scenario(2, 6), 6, Arc::new(NoopValidator)).unwrap();
        assert!(simulation.channel_count() > 0);

        let output = simulation.run().unwrap();
        assert_eq!(output, sequential::simulate(walled_scenario(2, 6)));
        let last = output.statistics["everyone"].last().unwrap();
        assert_eq!(last.susceptible, 1, "the near neighbor caught it");
    }
}

// ── Validator callbacks ───────────────────────────────────────────────────────

mod validation {
    use super::*;

    #[derive(Default)]
    struct CountingValidator {
        patch_ticks: AtomicUsize,
        person_ticks: AtomicUsize,
        max_tick: AtomicUsize,
    }

    impl Validator for CountingValidator {
        fn on_patch_tick(&self, tick: usize, _patch: PatchId) {
            self.patch_ticks.fetch_add(1, Ordering::Relaxed);
            self.max_tick.fetch_max(tick, Ordering::Relaxed);
        }

        fn on_person_tick(&self, _tick: usize, _patch: PatchId, _person: PersonId) {
            self.person_ticks.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn callbacks_fire_for_every_tick_and_person() {
        let ticks = 6;
        let scenario = scenario(
            Xy::new(8, 1),
            Partition::default(),
            vec![],
            vec![person(0, Xy::new(1, 0), Health::Susceptible)],
            pinned_parameters(1, 2),
            ticks,
            false,
        );
        let validator = Arc::new(CountingValidator::default());
        Simulation::new(scenario, 4, validator.clone())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(validator.patch_ticks.load(Ordering::Relaxed), ticks);
        assert_eq!(validator.max_tick.load(Ordering::Relaxed), ticks - 1);
        // One patch, one resident, no padding copies.
        assert_eq!(validator.person_ticks.load(Ordering::Relaxed), ticks);
    }

    #[test]
    fn every_patch_reports_every_tick() {
        let ticks = 8;
        let validator = Arc::new(CountingValidator::default());
        let scenario = walkers_scenario(Partition::new(vec![6], vec![6]), ticks, false);
        Simulation::new(scenario, 4, validator.clone())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(validator.patch_ticks.load(Ordering::Relaxed), 4 * ticks);
    }
}
