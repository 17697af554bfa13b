//! Landmark normalization into a canonical hand frame.
//!
//! The wrist is moved to the origin, the hand is scaled so the
//! wrist-to-middle-MCP distance is one, and left hands are mirrored on x so
//! both hands share one chirality. The result depends only on relative hand
//! geometry.

use signvote_models::landmarks::{MIDDLE_MCP, WRIST};
use signvote_models::{Handedness, LandmarkFrame, Point3, LANDMARK_COUNT};

/// Scales below this are treated as degenerate.
const MIN_SCALE: f32 = 1e-6;

/// Dimension of the learned feature vector (x, y per landmark).
pub const FEATURE_DIM: usize = LANDMARK_COUNT * 2;

/// Flattened (x, y) projection of normalized landmarks.
pub type FeatureVector = [f32; FEATURE_DIM];

/// Landmarks in the canonical hand frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedLandmarks {
    points: [Point3; LANDMARK_COUNT],
}

impl NormalizedLandmarks {
    /// Canonicalize one frame's raw landmarks.
    pub fn from_frame(frame: &LandmarkFrame) -> Self {
        normalize(&frame.points, frame.handedness)
    }

    pub fn point(&self, index: usize) -> Point3 {
        self.points[index]
    }

    pub fn points(&self) -> &[Point3; LANDMARK_COUNT] {
        &self.points
    }

    /// Flatten the x/y projection for the learned classifier.
    ///
    /// Depth is dropped on purpose; exemplars in the archive were collected
    /// with the same 2D projection.
    pub fn feature_vector(&self) -> FeatureVector {
        let mut features = [0.0; FEATURE_DIM];
        for (i, p) in self.points.iter().enumerate() {
            features[2 * i] = p.x;
            features[2 * i + 1] = p.y;
        }
        features
    }
}

/// Normalize raw landmarks. Pure function of its inputs.
pub fn normalize(
    points: &[Point3; LANDMARK_COUNT],
    handedness: Option<Handedness>,
) -> NormalizedLandmarks {
    let wrist = points[WRIST];

    // Scale is measured before mirroring; a reflection does not change it.
    let scale = match (points[MIDDLE_MCP] - wrist).norm() {
        s if s < MIN_SCALE || !s.is_finite() => 1.0,
        s => s,
    };
    let mirror = matches!(handedness, Some(Handedness::Left));

    let normalized = points.map(|p| {
        let mut translated = p - wrist;
        if mirror {
            translated.x = -translated.x;
        }
        translated / scale
    });

    NormalizedLandmarks { points: normalized }
}
