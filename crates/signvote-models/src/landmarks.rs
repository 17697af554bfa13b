//! Hand landmark types.
//!
//! # Landmarks Layout (21-point hand model)
//!
//! - 0: Wrist
//! - 1-4: Thumb (CMC, MCP, IP, TIP)
//! - 5-8: Index finger (MCP, PIP, DIP, TIP)
//! - 9-12: Middle finger
//! - 13-16: Ring finger
//! - 17-20: Pinky

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Sub};
use std::str::FromStr;

use crate::error::{ModelError, ModelResult};

/// Number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// MCP, PIP, DIP, TIP indices of the four long fingers.
pub const LONG_FINGERS: [[usize; 4]; 4] = [
    [INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP],
    [MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP],
    [RING_MCP, RING_PIP, RING_DIP, RING_TIP],
    [PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP],
];

/// A point in normalized image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Point3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length when treated as a vector.
    pub fn norm(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(&self, other: &Point3) -> f32 {
        (*self - *other).norm()
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Div<f32> for Point3 {
    type Output = Point3;

    fn div(self, rhs: f32) -> Point3 {
        Point3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl From<[f32; 3]> for Point3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Point3::new(x, y, z)
    }
}

/// Which physical hand produced an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Handedness {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Handedness::Left),
            "right" => Ok(Handedness::Right),
            _ => Err(ModelError::UnknownHandedness(s.to_string())),
        }
    }
}

/// One detector invocation's worth of hand landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub points: [Point3; LANDMARK_COUNT],
    /// `None` when the detector did not report a handedness.
    pub handedness: Option<Handedness>,
}

impl LandmarkFrame {
    pub fn new(points: [Point3; LANDMARK_COUNT], handedness: Option<Handedness>) -> Self {
        Self { points, handedness }
    }

    /// Build a frame from an untrusted point list, enforcing the 21-point layout.
    pub fn from_points(points: &[Point3], handedness: Option<Handedness>) -> ModelResult<Self> {
        let points: [Point3; LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| ModelError::InvalidLandmarkCount {
                    expected: LANDMARK_COUNT,
                    found: points.len(),
                })?;
        Ok(Self::new(points, handedness))
    }

    pub fn point(&self, index: usize) -> Point3 {
        self.points[index]
    }
}

/// Result of running the landmark detector on one camera frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Hand(LandmarkFrame),
    NoHand,
}

impl Observation {
    pub fn kind(&self) -> &'static str {
        match self {
            Observation::Hand(_) => "hand",
            Observation::NoHand => "no_hand",
        }
    }
}
