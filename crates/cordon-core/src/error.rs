//! Model error type.

use thiserror::Error;

/// Errors loading, saving, or validating model data.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}

/// Shorthand result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
