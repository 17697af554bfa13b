//! Shared data models for the SignVote gesture pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Hand landmark frames as produced by an upstream detector
//! - Gesture labels and their canonical forms
//! - Per-frame classification, fusion and smoothing results
//! - Discrete vote events and the downstream JSON payloads

pub mod classification;
pub mod error;
pub mod event;
pub mod gesture;
pub mod landmarks;
pub mod payload;

// Re-export common types
pub use classification::{ClassificationResult, ClassifierSource, FusedResult, SmoothedState};
pub use error::{ModelError, ModelResult};
pub use event::{EmittedEvent, VoteKind};
pub use gesture::{CanonicalLabel, Gesture, PayloadLabel};
pub use landmarks::{Handedness, LandmarkFrame, Observation, Point3, LANDMARK_COUNT};
pub use payload::{round_confidence, GesturePayload, GestureRecord};
