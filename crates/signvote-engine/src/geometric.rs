//! Rule-based YES/NO classifier over finger curl and fingertip spread.
//!
//! - YES family: all four long fingers curled (fist, thumb postures)
//! - NO family: fingers extended with the thumb away from the fingertips
//!   (open palm)
//!
//! Stateless and deterministic: identical landmarks always produce the same
//! result, and degenerate geometry falls back to safe defaults instead of
//! failing.

use std::f32::consts::PI;

use signvote_models::landmarks::{
    INDEX_MCP, INDEX_TIP, LONG_FINGERS, MIDDLE_TIP, PINKY_MCP, THUMB_IP, THUMB_MCP, THUMB_TIP,
    WRIST,
};
use signvote_models::{ClassificationResult, Gesture, Point3};
use tracing::trace;

use crate::config::UNKNOWN_FLOOR;
use crate::normalize::NormalizedLandmarks;

/// Vectors shorter than this have no meaningful direction.
const MIN_NORM: f32 = 1e-6;

/// Per-finger curl scores in [0, 1] (0 = straight, 1 = fully bent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandCurls {
    pub thumb: f64,
    pub index: f64,
    pub middle: f64,
    pub ring: f64,
    pub pinky: f64,
}

impl HandCurls {
    pub fn long_fingers(&self) -> [f64; 4] {
        [self.index, self.middle, self.ring, self.pinky]
    }
}

/// Intermediate scores, exposed for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricAnalysis {
    pub curls: HandCurls,
    pub palm_span: f64,
    pub yes_score: f64,
    pub no_score: f64,
}

/// Deterministic finger-geometry classifier.
#[derive(Debug, Clone, Copy)]
pub struct GeometricClassifier {
    unknown_floor: f64,
}

impl Default for GeometricClassifier {
    fn default() -> Self {
        Self::new(UNKNOWN_FLOOR)
    }
}

impl GeometricClassifier {
    pub fn new(unknown_floor: f64) -> Self {
        Self { unknown_floor }
    }

    /// Compute curls, palm span and both family scores.
    pub fn analyze(&self, landmarks: &NormalizedLandmarks) -> GeometricAnalysis {
        let [index, middle, ring, pinky] = LONG_FINGERS.map(|f| finger_curl(landmarks, f));
        let curls = HandCurls {
            thumb: thumb_curl(landmarks),
            index,
            middle,
            ring,
            pinky,
        };

        let palm_span = match landmarks.point(INDEX_MCP).distance(&landmarks.point(PINKY_MCP)) {
            s if s < MIN_NORM || !s.is_finite() => 1.0,
            s => s as f64,
        };

        let thumb_tip = landmarks.point(THUMB_TIP);
        let spread = |tip: usize| -> f64 {
            unit_clamp(thumb_tip.distance(&landmarks.point(tip)) as f64 / palm_span)
        };

        let long = curls.long_fingers();
        let yes_score = unit_clamp(mean(&long));
        let no_score = unit_clamp(mean(&[
            1.0 - long[0],
            1.0 - long[1],
            1.0 - long[2],
            1.0 - long[3],
            spread(INDEX_TIP),
            spread(MIDDLE_TIP),
        ]));

        GeometricAnalysis {
            curls,
            palm_span,
            yes_score,
            no_score,
        }
    }

    /// Classify one frame as YES, NO or UNKNOWN.
    pub fn classify(&self, landmarks: &NormalizedLandmarks) -> ClassificationResult {
        let analysis = self.analyze(landmarks);

        // Ties resolve to YES.
        let (gesture, confidence) = if analysis.yes_score >= analysis.no_score {
            (Gesture::Yes, analysis.yes_score)
        } else {
            (Gesture::No, analysis.no_score)
        };

        trace!(
            yes = analysis.yes_score,
            no = analysis.no_score,
            thumb_curl = analysis.curls.thumb,
            "geometric scores"
        );

        if confidence < self.unknown_floor {
            return ClassificationResult::geometric(Gesture::Unknown, confidence);
        }
        ClassificationResult::geometric(gesture, confidence)
    }
}

/// Angle between two vectors in radians; 0 when either is degenerate.
pub fn vector_angle(a: Point3, b: Point3) -> f32 {
    let (na, nb) = (a.norm(), b.norm());
    if na < MIN_NORM || nb < MIN_NORM {
        return 0.0;
    }
    let cosine = a.dot(&b) / (na * nb);
    if !cosine.is_finite() {
        return 0.0;
    }
    cosine.clamp(-1.0, 1.0).acos()
}

fn finger_curl(landmarks: &NormalizedLandmarks, [mcp, pip, dip, tip]: [usize; 4]) -> f64 {
    let (mcp, pip, dip, tip) = (
        landmarks.point(mcp),
        landmarks.point(pip),
        landmarks.point(dip),
        landmarks.point(tip),
    );
    curl_from_angles(
        vector_angle(pip - mcp, dip - pip),
        vector_angle(dip - pip, tip - dip),
    )
}

fn thumb_curl(landmarks: &NormalizedLandmarks) -> f64 {
    let wrist = landmarks.point(WRIST);
    let mcp = landmarks.point(THUMB_MCP);
    let ip = landmarks.point(THUMB_IP);
    let tip = landmarks.point(THUMB_TIP);
    curl_from_angles(
        vector_angle(ip - mcp, tip - ip),
        vector_angle(mcp - wrist, tip - mcp),
    )
}

fn curl_from_angles(first: f32, second: f32) -> f64 {
    unit_clamp(((first + second) / PI) as f64)
}

fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
