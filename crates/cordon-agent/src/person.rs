//! The `Person`: movement, infection-state transitions, spreading predicates.

use std::sync::Arc;

use cordon_core::{
    Direction, Health, InfectionState, Parameters, PersonId, PersonInfo, Rectangle, Xy,
};

use crate::HashChain;

/// One simulated person.
///
/// The person holds no reference to any patch or grid; everything the tick
/// needs is passed in, so clones of the same person can live in several
/// patches' padded regions at once and are re-owned on every handoff.
#[derive(Clone, Debug)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub position: Xy,
    pub direction: Direction,
    parameters: Arc<Parameters>,
    infection: InfectionState,
    rng: HashChain,
}

impl Person {
    pub fn new(id: PersonId, info: &PersonInfo, parameters: Arc<Parameters>) -> Self {
        Self {
            id,
            name: info.name.clone(),
            position: info.position,
            direction: info.direction,
            parameters,
            infection: info.infection,
            rng: HashChain::new(&info.seed),
        }
    }

    /// Project the current state back into the serialized form, including
    /// the live RNG state.
    pub fn info(&self) -> PersonInfo {
        PersonInfo::new(
            self.name.clone(),
            self.position,
            self.rng.state().to_vec(),
            self.infection,
            self.direction,
        )
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub fn health(&self) -> Health {
        self.infection.health
    }

    fn set_health(&mut self, health: Health) {
        self.infection = InfectionState::new(health, 0);
    }

    pub fn is_susceptible(&self) -> bool {
        self.health() == Health::Susceptible
    }

    pub fn is_infected(&self) -> bool {
        self.health() == Health::Infected
    }

    pub fn is_infectious(&self) -> bool {
        self.health() == Health::Infectious
    }

    pub fn is_recovered(&self) -> bool {
        self.health() == Health::Recovered
    }

    pub fn is_coughing(&self) -> bool {
        self.rng.is_coughing(&self.parameters)
    }

    pub fn is_breathing(&self) -> bool {
        self.rng.is_breathing(&self.parameters)
    }

    /// Expose the person to the infection.  Only susceptible persons catch it.
    pub fn infect(&mut self) {
        if self.is_susceptible() {
            self.set_health(Health::Infected);
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance the person by one tick.
    ///
    /// `positions` are the current positions of every person in the caller's
    /// world (already-moved for persons processed earlier this tick);
    /// `ghosts` are the pre-move positions of those already-moved persons.
    /// A step is abandoned — the person stops, heading `None` — if the
    /// target cell leaves `grid`, lands on an obstacle, or collides with a
    /// position or ghost.
    pub fn tick(
        &mut self,
        grid: &Rectangle,
        obstacles: &[Rectangle],
        positions: &[Xy],
        ghosts: &[Xy],
    ) {
        self.rng.tick();

        self.infection.since += 1;
        if self.is_infected() && self.infection.since >= self.parameters.incubation_time {
            self.set_health(Health::Infectious);
        } else if self.is_infectious() && self.infection.since >= self.parameters.recovery_time {
            self.set_health(Health::Recovered);
        }

        let acceleration = self.rng.acceleration(&self.parameters).vector();
        let velocity = (self.direction.vector() + acceleration).clamp(-1, 1);
        let target = self.position + velocity;

        if !grid.contains(target)
            || obstacles.iter().any(|o| o.contains(target))
            || positions.iter().chain(ghosts).any(|&p| p == target)
        {
            self.direction = Direction::None;
            return;
        }

        self.direction = Direction::from_vector(velocity);
        self.position = target;
    }
}
