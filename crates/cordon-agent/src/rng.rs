//! The per-person deterministic random source.
//!
//! # Determinism strategy
//!
//! Each person carries an independent byte-vector state seeded from the
//! scenario file; every tick replaces the state with its SHA-256 digest.
//! Draws read fixed bytes of the current state.  This makes every run a
//! pure function of the scenario — identical across engines, thread
//! schedules, and machines — and lets a trace entry (which carries the
//! state) seed a bit-identical continuation run.

use sha2::{Digest, Sha256};

use cordon_core::{Direction, Parameters};

/// A SHA-256 hash chain with threshold-based draws.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HashChain {
    state: Vec<u8>,
}

impl HashChain {
    pub fn new(seed: &[u8]) -> Self {
        Self {
            state: seed.to_vec(),
        }
    }

    /// Advance the chain: `state = SHA-256(state)`.
    pub fn tick(&mut self) {
        self.state = Sha256::digest(&self.state).to_vec();
    }

    /// The current chain state, for projection back into a `PersonInfo`.
    pub fn state(&self) -> &[u8] {
        &self.state
    }

    fn byte(&self, position: usize) -> usize {
        self.state[position] as usize
    }

    /// Is the person coughing this tick?  (byte 0 under the cough threshold)
    pub fn is_coughing(&self, parameters: &Parameters) -> bool {
        self.byte(0) < parameters.cough_threshold
    }

    /// Is the person breathing in this tick?  (byte 1 under the breath threshold)
    pub fn is_breathing(&self, parameters: &Parameters) -> bool {
        self.byte(1) < parameters.breath_threshold
    }

    /// The acceleration drawn for this tick (byte 2 scaled down; indices
    /// past the eight headings mean no acceleration).
    pub fn acceleration(&self, parameters: &Parameters) -> Direction {
        Direction::from_index(self.byte(2) / parameters.acceleration_divisor)
    }
}
