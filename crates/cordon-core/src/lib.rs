//! `cordon-core` — foundational types for the `cordon` pandemic simulator.
//!
//! This crate is a dependency of every other `cordon-*` crate.  It
//! intentionally has no `cordon-*` dependencies and minimal external ones
//! (`serde`/`serde_json` for the wire format, `base64` for RNG seeds,
//! `thiserror`).
//!
//! # What lives here
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`xy`]         | `Xy` integer cell/displacement vector                  |
//! | [`rect`]       | `Rectangle` algebra (half-open, cell iteration)        |
//! | [`ids`]        | `PersonId`, `PatchId`                                  |
//! | [`direction`]  | `Direction` — the eight headings plus `None`           |
//! | [`population`] | `PersonInfo`, `InfectionState`, `Health`               |
//! | [`scenario`]   | `Scenario`, `Parameters`, `Partition`, `Query` + JSON  |
//! | [`output`]     | `Statistics`, `TraceEntry`, `Output` + JSON            |
//! | [`error`]      | `ModelError`, `ModelResult`                            |
//!
//! # Wire format
//!
//! Scenario and output files are JSON with camelCase keys (`gridSize`,
//! `statQueries`, `rngState`, …).  The field renames in this crate are part
//! of that format and must not be changed independently of it.

pub mod direction;
pub mod error;
pub mod ids;
pub mod output;
pub mod population;
pub mod rect;
pub mod scenario;
pub mod xy;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use direction::Direction;
pub use error::{ModelError, ModelResult};
pub use ids::{PatchId, PersonId};
pub use output::{Output, Statistics, TraceEntry};
pub use population::{Health, InfectionState, PersonInfo};
pub use rect::Rectangle;
pub use scenario::{Parameters, Partition, Query, Scenario};
pub use xy::Xy;
