//! Connected components and the causal-propagation test.
//!
//! # Why components
//!
//! Infection spreads two ways: carriers walk (one cell per tick, diagonals
//! allowed) and the infection itself jumps up to `infection_radius` cells of
//! Manhattan distance between persons — straight over walls, since the
//! pairwise check is distance-only.  A jump over a wall still needs a person
//! on the far side to land on, so a walled-off region that starts with no
//! inhabitants can never relay anything: nobody can walk in, and there is
//! nobody inside to infect.
//!
//! Components are flood-filled over the *8-neighborhood*.  Movement steps
//! are diagonal-capable, so 4-connected components would not be closed under
//! movement and marking one of them empty could prune a channel a wandering
//! carrier can still service.

use std::collections::VecDeque;

use cordon_core::{Rectangle, Scenario, Xy};

/// Sentinel component id for obstacle cells.
const OBSTACLE: u32 = u32::MAX;

/// The eight one-cell steps a person can take.
const STEPS: [(isize, isize); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (-1, -1),
    (1, 1),
    (-1, 1),
];

/// Obstacle-aware connectivity of a scenario's grid, built once at setup.
pub struct ReachabilityMap {
    grid: Rectangle,
    width: usize,
    /// Component id per cell, row-major; `OBSTACLE` for obstacle cells.
    component: Vec<u32>,
    /// Per component: does any initial person start inside it?
    inhabited: Vec<bool>,
    infection_radius: isize,
}

impl ReachabilityMap {
    /// Label the free cells of the scenario's grid with component ids and
    /// mark the components the initial population inhabits.
    pub fn new(scenario: &Scenario) -> Self {
        let grid = scenario.grid();
        let width = scenario.grid_size.x as usize;
        let height = scenario.grid_size.y as usize;

        let component = vec![u32::MAX; width * height];
        let mut free = vec![true; width * height];
        for obstacle in &scenario.obstacles {
            if let Some(clipped) = obstacle.intersect(&grid) {
                for cell in &clipped {
                    free[cell_index(cell, width)] = false;
                }
            }
        }

        let mut map = Self {
            grid,
            width,
            component,
            inhabited: Vec::new(),
            infection_radius: scenario.parameters.infection_radius as isize,
        };

        let mut next_id = 0;
        for cell in &grid {
            let index = cell_index(cell, width);
            if free[index] && map.component[index] == OBSTACLE {
                map.flood_fill(cell, &free, next_id);
                next_id += 1;
            }
        }

        map.inhabited = vec![false; next_id as usize];
        for person in &scenario.population {
            if let Some(id) = map.component_id(person.position) {
                map.inhabited[id as usize] = true;
            }
        }

        map
    }

    /// BFS over the 8-neighborhood from `start`, labelling every reachable
    /// free cell with `id`.
    fn flood_fill(&mut self, start: Xy, free: &[bool], id: u32) {
        let mut queue = VecDeque::new();
        self.component[cell_index(start, self.width)] = id;
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            for (dx, dy) in STEPS {
                let neighbor = cell + Xy::new(dx, dy);
                if !self.grid.contains(neighbor) {
                    continue;
                }
                let index = cell_index(neighbor, self.width);
                if free[index] && self.component[index] == OBSTACLE {
                    self.component[index] = id;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    /// The component id of a free cell; `None` for obstacle or off-grid cells.
    pub fn component_id(&self, cell: Xy) -> Option<u32> {
        if !self.grid.contains(cell) {
            return None;
        }
        match self.component[cell_index(cell, self.width)] {
            OBSTACLE => None,
            id => Some(id),
        }
    }

    /// Can state in `source` ever causally influence `target`?
    ///
    /// Grows a frontier from every free cell of `target` using the per-tick
    /// influence set: all cells within Manhattan distance `infection_radius`
    /// (an infection jump) or Chebyshev distance 1 (a movement step).
    /// Obstacle cells and cells of uninhabited components never relay and
    /// are skipped.  Returns `true` as soon as the frontier touches
    /// `source`; the test is conservative — it over-approximates what any
    /// number of ticks could propagate.
    pub fn may_propagate_from(&self, source: &Rectangle, target: &Rectangle) -> bool {
        let mut seen = vec![false; self.component.len()];
        let mut frontier: Vec<Xy> = Vec::new();
        for cell in target {
            if self.component_id(cell).is_some() {
                seen[cell_index(cell, self.width)] = true;
                frontier.push(cell);
            }
        }

        let radius = self.infection_radius;
        while let Some(cell) = frontier.pop() {
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    let reachable = dx.abs() + dy.abs() <= radius || (dx.abs() <= 1 && dy.abs() <= 1);
                    if !reachable {
                        continue;
                    }
                    let neighbor = cell + Xy::new(dx, dy);
                    let Some(id) = self.component_id(neighbor) else {
                        continue;
                    };
                    let index = cell_index(neighbor, self.width);
                    if seen[index] || !self.inhabited[id as usize] {
                        continue;
                    }
                    if source.contains(neighbor) {
                        return true;
                    }
                    seen[index] = true;
                    frontier.push(neighbor);
                }
            }
        }

        false
    }
}

#[inline]
fn cell_index(cell: Xy, width: usize) -> usize {
    cell.y as usize * width + cell.x as usize
}
