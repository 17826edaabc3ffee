//! The simulation scenario: grid, partition, parameters, queries, population.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ModelError, ModelResult, PersonInfo, Rectangle, Xy};

// ── Parameters ────────────────────────────────────────────────────────────────

/// The epidemic and movement parameters of a scenario.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    /// RNG byte 0 below this value means the person coughs this tick.
    pub cough_threshold: usize,
    /// RNG byte 1 below this value means the person breathes this tick.
    pub breath_threshold: usize,
    /// RNG byte 2 divided by this value picks the acceleration heading.
    pub acceleration_divisor: usize,
    /// Ticks spent infectious before recovering.
    pub recovery_time: usize,
    /// Maximum Manhattan distance the infection jumps directly.
    pub infection_radius: usize,
    /// Ticks spent infected before becoming infectious.
    pub incubation_time: usize,
}

// ── Partition ─────────────────────────────────────────────────────────────────

/// Interior cut lines slicing the grid into patches, one list per axis.
///
/// Cut lines are strictly ascending coordinates strictly inside the grid.
/// Empty lists mean a single patch spanning the whole axis.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct Partition {
    pub x: Vec<isize>,
    pub y: Vec<isize>,
}

impl Partition {
    pub fn new(x: Vec<isize>, y: Vec<isize>) -> Self {
        Self { x, y }
    }

    /// The patch rectangles of this partition, row-major (row index slowest).
    ///
    /// The patch at grid position `(i, j)` spans from cut line `i` to cut
    /// line `i + 1` on the x-axis (grid edges counting as outermost cut
    /// lines), and likewise on the y-axis.
    pub fn patch_areas(&self, grid_size: Xy) -> Vec<Rectangle> {
        let xs = Self::boundaries(&self.x, grid_size.x);
        let ys = Self::boundaries(&self.y, grid_size.y);
        let mut areas = Vec::with_capacity((xs.len() - 1) * (ys.len() - 1));
        for y in ys.windows(2) {
            for x in xs.windows(2) {
                areas.push(Rectangle::new(
                    Xy::new(x[0], y[0]),
                    Xy::new(x[1] - x[0], y[1] - y[0]),
                ));
            }
        }
        areas
    }

    /// Interior cut lines extended with both grid edges.
    fn boundaries(cuts: &[isize], extent: isize) -> Vec<isize> {
        let mut all = Vec::with_capacity(cuts.len() + 2);
        all.push(0);
        all.extend_from_slice(cuts);
        all.push(extent);
        all
    }
}

// ── Query ─────────────────────────────────────────────────────────────────────

/// A named request for per-tick SI²R counts over a rectangular area.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Query {
    pub area: Rectangle,
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// A complete simulation scenario.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Scenario {
    pub name: String,
    pub parameters: Arc<Parameters>,
    /// Number of ticks to simulate; output covers ticks `0..=ticks`.
    pub ticks: usize,
    #[serde(rename = "gridSize")]
    pub grid_size: Xy,
    /// Capture a full per-tick population trace?
    pub trace: bool,
    pub partition: Partition,
    pub obstacles: Vec<Rectangle>,
    #[serde(rename = "statQueries")]
    pub queries: BTreeMap<String, Query>,
    /// Initial population; list order assigns person ids.
    pub population: Vec<PersonInfo>,
}

impl Scenario {
    /// The grid as a rectangle anchored at the origin.
    pub fn grid(&self) -> Rectangle {
        Rectangle::new(Xy::ZERO, self.grid_size)
    }

    /// How many patches the partition produces.
    pub fn patch_count(&self) -> usize {
        (self.partition.x.len() + 1) * (self.partition.y.len() + 1)
    }

    /// Is the cell covered by an obstacle?
    pub fn on_obstacle(&self, cell: Xy) -> bool {
        self.obstacles.iter().any(|o| o.contains(cell))
    }

    /// Check the structural invariants the engines rely on.
    pub fn validate(&self) -> ModelResult<()> {
        let invalid = |msg: String| Err(ModelError::InvalidScenario(msg));
        if self.grid_size.x <= 0 || self.grid_size.y <= 0 {
            return invalid(format!("grid size {} is not positive", self.grid_size));
        }
        for (cuts, extent, axis) in [
            (&self.partition.x, self.grid_size.x, 'x'),
            (&self.partition.y, self.grid_size.y, 'y'),
        ] {
            let mut last = 0;
            for &cut in cuts {
                if cut <= last || cut >= extent {
                    return invalid(format!("{axis}-axis cut line {cut} is not an interior line"));
                }
                last = cut;
            }
        }
        if self.parameters.incubation_time == 0 {
            return invalid("incubationTime must be at least 1".into());
        }
        if self.parameters.acceleration_divisor == 0 {
            return invalid("accelerationDivisor must be at least 1".into());
        }
        Ok(())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parse and validate a scenario from a JSON string.
pub fn from_str(src: &str) -> ModelResult<Scenario> {
    let scenario: Scenario = serde_json::from_str(src)?;
    scenario.validate()?;
    Ok(scenario)
}

/// Load and validate a scenario from a JSON file.
pub fn load(path: impl AsRef<Path>) -> ModelResult<Scenario> {
    from_str(&std::fs::read_to_string(path)?)
}
