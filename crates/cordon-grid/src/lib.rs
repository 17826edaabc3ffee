//! `cordon-grid` — obstacle-aware connectivity analysis.
//!
//! Answers one setup-time question for the engine: can infection carried by
//! moving persons ever propagate from one rectangle of the grid to another?
//! Two patches separated by a solid wall need no padding exchange at all,
//! and regions that start with no inhabitants can never produce a carrier.
//!
//! | Module    | Contents                                             |
//! |-----------|------------------------------------------------------|
//! | [`reach`] | `ReachabilityMap` — components + propagation test    |

pub mod reach;


pub use reach::ReachabilityMap;
