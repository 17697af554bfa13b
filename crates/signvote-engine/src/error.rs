//! Error types for the gesture engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur outside the per-frame math.
///
/// Degenerate geometry, a missing model and frames without a hand are
/// handled in-band and never surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Dataset error in {path}: {message}")]
    Dataset { path: PathBuf, message: String },

    #[error("Cannot fit a model without samples")]
    EmptyDataset,

    #[error("Feature vector has {found} values, expected {expected}")]
    FeatureDimension { expected: usize, found: usize },

    #[error("Landmark source failed at line {line}: {message}")]
    Source { line: usize, message: String },

    #[error("Feedback program not found: {0}")]
    FeedbackProgramNotFound(String),

    #[error("Feedback delivery failed: {0}")]
    FeedbackFailed(String),

    #[error("Feedback channel closed")]
    FeedbackClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Create a dataset error.
    pub fn dataset(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Dataset {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a landmark source error.
    pub fn source(line: usize, message: impl Into<String>) -> Self {
        Self::Source {
            line,
            message: message.into(),
        }
    }

    /// Create a feedback delivery error.
    pub fn feedback_failed(message: impl Into<String>) -> Self {
        Self::FeedbackFailed(message.into())
    }
}
