//! Per-frame driver wiring normalizer, classifiers, arbiter, smoother and
//! emitter together.
//!
//! Processing is synchronous and never blocks: one observation goes all the
//! way through before the next is accepted.

use std::sync::Arc;
use std::time::Instant;

use signvote_models::{
    ClassificationResult, EmittedEvent, FusedResult, GesturePayload, LandmarkFrame, Observation,
    SmoothedState,
};
use tracing::trace;

use crate::config::EngineConfig;
use crate::emitter::EdgeEmitter;
use crate::fusion::FusionArbiter;
use crate::geometric::GeometricClassifier;
use crate::learned::LearnedClassifier;
use crate::normalize::NormalizedLandmarks;
use crate::smoother::TemporalSmoother;

/// Display text while no hand is in view.
pub const NO_HAND_DISPLAY: &str = "...";

/// Everything one frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    /// Arbiter decision, absent when no hand was observed.
    pub fused: Option<FusedResult>,
    pub smoothed: Option<SmoothedState>,
    /// What downstream consumers should see for this frame.
    pub payload: GesturePayload,
    /// Short label for overlays, e.g. `"YES (0.91)"`.
    pub display: String,
    pub event: Option<EmittedEvent>,
}

/// Stateful pipeline for a single gesture stream.
pub struct GesturePipeline {
    geometric: GeometricClassifier,
    learned: Arc<dyn LearnedClassifier>,
    arbiter: FusionArbiter,
    smoother: TemporalSmoother,
    emitter: EdgeEmitter,
}

impl GesturePipeline {
    pub fn new(config: &EngineConfig, learned: Arc<dyn LearnedClassifier>) -> Self {
        Self {
            geometric: GeometricClassifier::new(config.unknown_floor),
            learned,
            arbiter: FusionArbiter::new(config.ml_takeover),
            smoother: TemporalSmoother::new(config.smooth_window),
            emitter: EdgeEmitter::new(config.yes_cooldown, config.no_cooldown),
        }
    }

    /// Name of the learned classifier in use.
    pub fn learned_name(&self) -> &'static str {
        self.learned.name()
    }

    pub fn process(&mut self, observation: &Observation, now: Instant) -> FrameOutcome {
        match observation {
            Observation::Hand(frame) => self.process_hand(frame, now),
            Observation::NoHand => self.process_no_hand(now),
        }
    }

    /// Run both classifiers and the arbiter over one frame, without touching
    /// any stream state.
    pub fn classify(&self, frame: &LandmarkFrame) -> FusedResult {
        let (geometric, learned) = self.classify_both(frame);
        self.arbiter.fuse(&geometric, learned.as_ref())
    }

    fn classify_both(
        &self,
        frame: &LandmarkFrame,
    ) -> (ClassificationResult, Option<ClassificationResult>) {
        let normalized = NormalizedLandmarks::from_frame(frame);
        let geometric = self.geometric.classify(&normalized);
        let learned = self.learned.predict(&normalized.feature_vector());
        (geometric, learned)
    }

    fn process_hand(&mut self, frame: &LandmarkFrame, now: Instant) -> FrameOutcome {
        let (geometric, learned) = self.classify_both(frame);
        let fused = self.arbiter.fuse(&geometric, learned.as_ref());
        let smoothed = self.smoother.push(fused);

        trace!(
            geometric = %geometric.label,
            learned = ?learned.map(|r| r.label),
            fused = %fused.label,
            window = self.smoother.len(),
            "frame classified"
        );

        // Raw fused result stands in for display when the window is empty.
        let (label, confidence) = match smoothed {
            Some(state) => (state.label, state.confidence),
            None => (fused.label, fused.confidence),
        };
        let payload = GesturePayload::new(label.into(), confidence);
        let event = self.emitter.observe(payload.gesture.canonical(), now);

        FrameOutcome {
            fused: Some(fused),
            smoothed,
            payload,
            display: format!("{} ({:.2})", label, confidence),
            event,
        }
    }

    fn process_no_hand(&mut self, now: Instant) -> FrameOutcome {
        self.smoother.clear();
        let payload = GesturePayload::none();
        let event = self.emitter.observe(payload.gesture.canonical(), now);

        FrameOutcome {
            fused: None,
            smoothed: None,
            payload,
            display: NO_HAND_DISPLAY.to_string(),
            event,
        }
    }
}
