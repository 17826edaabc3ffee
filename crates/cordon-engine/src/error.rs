//! Engine error type.
//!
//! There are deliberately no recoverable errors here: a padding exchange
//! that fails mid-run means a peer worker died, and continuing would
//! silently produce wrong populations.  Broken protocol invariants
//! (duplicate ids in a merge, an out-of-order output entry) are programmer
//! errors and panic instead.

use cordon_core::PatchId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested padding admits no cycle of even a single tick.
    #[error("padding of {0} is insufficient for the scenario parameters")]
    InsufficientPadding(usize),

    /// A worker found a padding or output channel closed mid-run because a
    /// peer died.
    #[error("worker for patch {0} was cut off mid-exchange")]
    Interrupted(PatchId),

    /// A worker thread panicked; the panic payload went to stderr.
    #[error("worker for patch {0} panicked")]
    Panicked(PatchId),

    /// The collector's input closed before every entry arrived.
    #[error("output stream closed before the run completed")]
    OutputClosed,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Shorthand result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
