//! Observation hooks called from worker threads.

use cordon_core::{PatchId, PersonId};

/// Callbacks invoked by every patch worker at fixed points of its loop.
///
/// Both methods have default no-op implementations.  They are called
/// concurrently from all worker threads, so implementations must be
/// thread-safe; this is a capability the worker holds (behind an `Arc`),
/// not part of the simulation state.
pub trait Validator: Send + Sync + 'static {
    /// Called before a patch processes a tick.
    ///
    /// Patches are numbered row-major: the top-left patch is 0, its right
    /// neighbor 1, and so on.
    fn on_patch_tick(&self, tick: usize, patch: PatchId) {
        let _ = (tick, patch);
    }

    /// Called before a person is advanced, for every person in the patch's
    /// combined population (padding copies included).
    fn on_person_tick(&self, tick: usize, patch: PatchId, person: PersonId) {
        let _ = (tick, patch, person);
    }
}

/// A [`Validator`] that observes nothing.
pub struct NoopValidator;

impl Validator for NoopValidator {}
