//! Simulation output: per-tick statistics and the optional population trace.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ModelResult, PersonInfo, Scenario};

// ── Statistics ────────────────────────────────────────────────────────────────

/// SI²R counts for one query area at one tick.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Statistics {
    pub susceptible: u64,
    pub infected: u64,
    pub infectious: u64,
    pub recovered: u64,
}

impl Statistics {
    pub fn new(susceptible: u64, infected: u64, infectious: u64, recovered: u64) -> Self {
        Self {
            susceptible,
            infected,
            infectious,
            recovered,
        }
    }

    /// Pointwise addition of all four counts.
    pub fn add(&mut self, other: &Statistics) {
        self.susceptible += other.susceptible;
        self.infected += other.infected;
        self.infectious += other.infectious;
        self.recovered += other.recovered;
    }

    /// Sum over all four buckets: the number of persons counted.
    pub fn total(&self) -> u64 {
        self.susceptible + self.infected + self.infectious + self.recovered
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Statistics({}, {}, {}, {})",
            self.susceptible, self.infected, self.infectious, self.recovered
        )
    }
}

// ── Trace ─────────────────────────────────────────────────────────────────────

/// The whole population at one tick, ordered by person id.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct TraceEntry {
    pub population: Vec<PersonInfo>,
}

impl TraceEntry {
    pub fn new(population: Vec<PersonInfo>) -> Self {
        Self { population }
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

/// The finished product of a simulation run.
///
/// `trace` has `ticks + 1` entries when the scenario traces, else none;
/// `statistics` maps each query key to `ticks + 1` per-tick counts.  Both
/// maps are ordered so that serializing the same run twice yields identical
/// bytes.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Output {
    pub scenario: Scenario,
    pub trace: Vec<TraceEntry>,
    #[serde(rename = "stats")]
    pub statistics: BTreeMap<String, Vec<Statistics>>,
}

impl Output {
    pub fn new(
        scenario: Scenario,
        trace: Vec<TraceEntry>,
        statistics: BTreeMap<String, Vec<Statistics>>,
    ) -> Self {
        Self {
            scenario,
            trace,
            statistics,
        }
    }
}

// ── Persistence ───────────────────────────────────────────────────────────────

/// Serialize an output to a JSON file.
pub fn save(output: &Output, path: impl AsRef<Path>) -> ModelResult<()> {
    let src = serde_json::to_string(output)?;
    std::fs::write(path, src)?;
    Ok(())
}

/// Parse an output from a JSON string.
pub fn from_str(src: &str) -> ModelResult<Output> {
    Ok(serde_json::from_str(src)?)
}

/// Load an output from a JSON file.
pub fn load(path: impl AsRef<Path>) -> ModelResult<Output> {
    from_str(&std::fs::read_to_string(path)?)
}
