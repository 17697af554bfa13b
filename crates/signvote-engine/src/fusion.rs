//! Confidence-priority fusion of the geometric and learned classifiers.

use signvote_models::{ClassificationResult, FusedResult, Gesture};

use crate::config::ML_TAKEOVER;

/// Merges both classifier outputs into one per-frame decision.
///
/// Priority:
/// 1. A learned result at or above the takeover threshold wins outright.
/// 2. A decisive geometric result (YES/NO) is used next.
/// 3. Otherwise the learned label is used even below threshold, and with no
///    learned label at all the frame is UNKNOWN at the geometric confidence.
#[derive(Debug, Clone, Copy)]
pub struct FusionArbiter {
    ml_takeover: f64,
}

impl Default for FusionArbiter {
    fn default() -> Self {
        Self::new(ML_TAKEOVER)
    }
}

impl FusionArbiter {
    pub fn new(ml_takeover: f64) -> Self {
        Self { ml_takeover }
    }

    pub fn fuse(
        &self,
        geometric: &ClassificationResult,
        learned: Option<&ClassificationResult>,
    ) -> FusedResult {
        match learned {
            Some(ml) if ml.confidence >= self.ml_takeover => FusedResult::from(*ml),
            _ if geometric.label.is_decisive() => FusedResult::from(*geometric),
            Some(ml) => FusedResult::from(*ml),
            None => FusedResult::new(Gesture::Unknown, geometric.confidence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(label: Gesture, confidence: f64) -> ClassificationResult {
        ClassificationResult::geometric(label, confidence)
    }

    fn ml(label: Gesture, confidence: f64) -> ClassificationResult {
        ClassificationResult::learned(label, confidence)
    }

    #[test]
    fn test_confident_model_overrides_geometry() {
        let arbiter = FusionArbiter::default();
        let fused = arbiter.fuse(&geo(Gesture::No, 0.9), Some(&ml(Gesture::Yes, 0.7)));
        assert_eq!(fused, FusedResult::new(Gesture::Yes, 0.7));
    }

    #[test]
    fn test_takeover_threshold_is_inclusive() {
        let arbiter = FusionArbiter::default();
        let fused = arbiter.fuse(&geo(Gesture::No, 0.9), Some(&ml(Gesture::Yes, 0.6)));
        assert_eq!(fused.label, Gesture::Yes);
    }

    #[test]
    fn test_decisive_geometry_beats_weak_model() {
        let arbiter = FusionArbiter::default();
        let fused = arbiter.fuse(&geo(Gesture::No, 0.8), Some(&ml(Gesture::Yes, 0.4)));
        assert_eq!(fused, FusedResult::new(Gesture::No, 0.8));
    }

    #[test]
    fn test_weak_model_used_when_geometry_unknown() {
        let fused =
            FusionArbiter::default().fuse(&geo(Gesture::Unknown, 0.5), Some(&ml(Gesture::No, 0.4)));
        assert_eq!(fused, FusedResult::new(Gesture::No, 0.4));
    }

    #[test]
    fn test_geometry_only_when_model_absent() {
        let arbiter = FusionArbiter::default();
        assert_eq!(
            arbiter.fuse(&geo(Gesture::Yes, 0.9), None),
            FusedResult::new(Gesture::Yes, 0.9)
        );
        assert_eq!(
            arbiter.fuse(&geo(Gesture::Unknown, 0.52), None),
            FusedResult::new(Gesture::Unknown, 0.52)
        );
    }
}
