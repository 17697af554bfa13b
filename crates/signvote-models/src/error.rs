//! Error types for model construction and label parsing.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building model values from untrusted input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Expected {expected} landmarks, found {found}")]
    InvalidLandmarkCount { expected: usize, found: usize },

    #[error("Unknown gesture label: {0}")]
    UnknownLabel(String),

    #[error("Unknown handedness: {0}")]
    UnknownHandedness(String),
}
