#![deny(unreachable_patterns)]
//! Hand gesture classification engine.
//!
//! This crate provides:
//! - Landmark normalization into a scale- and chirality-invariant frame
//! - A rule-based geometric classifier and a k-NN learned classifier
//! - Confidence-priority fusion, temporal smoothing and edge/cooldown emission
//! - A change-driven NDJSON record stream
//! - An asynchronous feedback worker and NDJSON landmark sources

pub mod config;
pub mod dataset;
pub mod emitter;
pub mod error;
pub mod feedback;
pub mod fusion;
pub mod geometric;
pub mod learned;
pub mod normalize;
pub mod pipeline;
pub mod smoother;
pub mod source;
pub mod stream;

pub use config::EngineConfig;
pub use dataset::{load_classifier, load_model, load_samples, DEFAULT_MODEL_PATH};
pub use emitter::EdgeEmitter;
pub use error::{EngineError, EngineResult};
pub use feedback::{
    AnnounceOutcome, CommandSink, FeedbackHandle, FeedbackSink, FeedbackWorker, LogSink,
};
pub use fusion::FusionArbiter;
pub use geometric::{GeometricAnalysis, GeometricClassifier};
pub use learned::{KnnClassifier, LearnedClassifier, NullClassifier, Sample};
pub use normalize::{normalize, FeatureVector, NormalizedLandmarks, FEATURE_DIM};
pub use pipeline::{FrameOutcome, GesturePipeline};
pub use smoother::TemporalSmoother;
pub use source::{LandmarkSource, MemorySource, NdjsonSource, ThreadedNdjsonSource};
pub use stream::RecordStream;
