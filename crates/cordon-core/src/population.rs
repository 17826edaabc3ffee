//! Serialized person state: health, and the on-disk person record.

use serde::{Deserialize, Serialize};

use crate::{Direction, Xy};

// ── Health ────────────────────────────────────────────────────────────────────

/// The SI²R health states.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
pub enum Health {
    /// Never infected.  Serialized as `"healthy"` by the wire format.
    #[serde(rename = "healthy")]
    Susceptible,
    /// Incubating; not yet spreading.
    #[serde(rename = "infected")]
    Infected,
    /// Spreading.
    #[serde(rename = "infectious")]
    Infectious,
    /// Immune.
    #[serde(rename = "recovered")]
    Recovered,
}

/// A health state together with the number of ticks spent in it.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
pub struct InfectionState {
    #[serde(rename = "type")]
    pub health: Health,
    #[serde(rename = "since", default)]
    pub since: usize,
}

impl InfectionState {
    pub fn new(health: Health, since: usize) -> Self {
        Self { health, since }
    }
}

// ── PersonInfo ────────────────────────────────────────────────────────────────

/// The serialized state of one person.
///
/// This is both the scenario's initial-population record and the per-tick
/// trace record; the RNG seed field carries the full hash-chain state so a
/// trace entry could seed an identical continuation run.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct PersonInfo {
    pub name: String,
    #[serde(rename = "pos")]
    pub position: Xy,
    #[serde(rename = "rngState", with = "seed_base64")]
    pub seed: Vec<u8>,
    #[serde(rename = "infectionState")]
    pub infection: InfectionState,
    pub direction: Direction,
}

impl PersonInfo {
    pub fn new(
        name: String,
        position: Xy,
        seed: Vec<u8>,
        infection: InfectionState,
        direction: Direction,
    ) -> Self {
        Self {
            name,
            position,
            seed,
            infection,
            direction,
        }
    }
}

/// Standard-alphabet base64 (de)serialization for the RNG seed bytes.
mod seed_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(&encoded).map_err(serde::de::Error::custom)
    }
}
