//! Per-frame classifier, fusion and smoothing results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::gesture::Gesture;

/// Which classifier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierSource {
    /// Rule-based finger-curl classifier.
    Geometric,
    /// Nearest-neighbor model over collected exemplars.
    Learned,
}

/// Output of a single classifier for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassificationResult {
    pub label: Gesture,
    /// Always within [0, 1].
    pub confidence: f64,
    pub source: ClassifierSource,
}

impl ClassificationResult {
    pub fn new(label: Gesture, confidence: f64, source: ClassifierSource) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
            source,
        }
    }

    pub fn geometric(label: Gesture, confidence: f64) -> Self {
        Self::new(label, confidence, ClassifierSource::Geometric)
    }

    pub fn learned(label: Gesture, confidence: f64) -> Self {
        Self::new(label, confidence, ClassifierSource::Learned)
    }
}

/// The arbiter's single decision for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FusedResult {
    pub label: Gesture,
    pub confidence: f64,
}

impl FusedResult {
    pub fn new(label: Gesture, confidence: f64) -> Self {
        Self { label, confidence }
    }
}

impl From<ClassificationResult> for FusedResult {
    fn from(result: ClassificationResult) -> Self {
        Self::new(result.label, result.confidence)
    }
}

/// Dominant label over the smoothing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SmoothedState {
    pub label: Gesture,
    /// Mean confidence of the window entries carrying `label`.
    pub confidence: f64,
}
