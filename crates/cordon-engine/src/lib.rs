//! `cordon-engine` — the concurrent patch-based simulation engine.
//!
//! # How a run works
//!
//! ```text
//! Simulation::new          Simulation::run
//!   derive cycle K           spawn one thread per patch
//!   build patches            ┌────────────┐  border     ┌────────────┐
//!   wire padding channels    │ PatchWorker│ ⇄ channels ⇄ │ PatchWorker│ …
//!   (reachability-pruned)    └─────┬──────┘  (cap 1)    └─────┬──────┘
//!                                  │ OutputEntry per tick     │
//!                                  └───────────┬──────────────┘
//!                                          collector
//!                                  (lockstep or shared queue)
//! ```
//!
//! Each worker alternates `K` purely local ticks with a synchronized border
//! exchange: it writes its border residents into every *inner* channel,
//! then reads every *outer* channel to rebuild the combined population its
//! next cycle simulates.  Workers emit per-tick statistics and trace
//! entries; the collector folds them into the global [`Output`] in
//! deterministic person-id order.
//!
//! The single-threaded [`sequential`] engine simulates the same scenarios
//! without any of this machinery and serves as the correctness oracle.
//!
//! | Module         | Contents                                            |
//! |----------------|-----------------------------------------------------|
//! | [`sim`]        | `Simulation`, `cycle_length`                        |
//! | [`sequential`] | The reference engine                                |
//! | [`validator`]  | `Validator` callbacks, `NoopValidator`              |
//! | [`collector`]  | `CollectorMode` and the two drain strategies        |
//! | [`error`]      | `EngineError`, `EngineResult`                       |
//!
//! [`Output`]: cordon_core::Output

mod channel;
pub mod collector;
pub mod error;
mod patch;
pub mod sequential;
pub mod sim;
pub mod validator;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use collector::CollectorMode;
pub use error::{EngineError, EngineResult};
pub use sim::{cycle_length, Simulation};
pub use validator::{NoopValidator, Validator};
