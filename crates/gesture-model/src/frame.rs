//! Hand frames as delivered by the camera / landmark-detection collaborator.
//!
//! Frames are recorded in JSONL format, one frame per line. A frame carries
//! either 21 landmarks in the fixed anatomical order below, or `null` when
//! no hand was detected.

use serde::{Deserialize, Serialize};

/// Monotonic timestamp in nanoseconds since session start.
pub type TimestampNs = u64;

/// Number of landmarks in a tracked hand.
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

/// A single tracked point on the hand.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized X coordinate [0.0, 1.0], increasing rightward.
    pub x: f64,
    /// Normalized Y coordinate [0.0, 1.0], increasing downward.
    pub y: f64,
    /// Relative depth as reported by the detector. Not used for classification.
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Planar Euclidean distance, ignoring depth.
    pub fn planar_distance(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Reasons a detected hand cannot be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("expected 21 landmarks, got {0}")]
    WrongLandmarkCount(usize),

    #[error("landmark {0} has a non-finite coordinate")]
    NonFinite(usize),
}

/// A validated set of exactly 21 finite landmarks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLandmarks([Landmark; LANDMARK_COUNT]);

impl HandLandmarks {
    /// Landmark at one of the anatomical indices (`WRIST`, `INDEX_TIP`, ...).
    pub fn get(&self, index: usize) -> &Landmark {
        &self.0[index]
    }

    pub fn wrist(&self) -> &Landmark {
        &self.0[WRIST]
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.0
    }
}

impl TryFrom<&[Landmark]> for HandLandmarks {
    type Error = FrameError;

    fn try_from(points: &[Landmark]) -> Result<Self, Self::Error> {
        let array: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| FrameError::WrongLandmarkCount(points.len()))?;
        if let Some(bad) = array.iter().position(|p| !p.is_finite()) {
            return Err(FrameError::NonFinite(bad));
        }
        Ok(Self(array))
    }
}

/// One camera frame: at most one detected hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// Monotonic nanoseconds since session start.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Landmarks of the detected hand, or `None` when no hand was found.
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl HandFrame {
    /// A frame in which no hand was detected.
    pub fn empty(timestamp_ns: TimestampNs) -> Self {
        Self {
            timestamp_ns,
            landmarks: None,
        }
    }

    /// A frame carrying the given landmark set.
    pub fn with_landmarks(timestamp_ns: TimestampNs, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp_ns,
            landmarks: Some(landmarks),
        }
    }

    /// Timestamp as fractional seconds since session start.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }

    /// The validated hand, if one was detected.
    ///
    /// `Ok(None)` means no hand; `Err` means a hand was reported but its
    /// landmark set is unusable.
    pub fn hand(&self) -> Result<Option<HandLandmarks>, FrameError> {
        self.landmarks
            .as_deref()
            .map(HandLandmarks::try_from)
            .transpose()
    }
}

/// Parse frames from JSONL content (one JSON object per line).
///
/// Blank lines and `#` header lines are skipped.
pub fn parse_frames(jsonl: &str) -> Result<Vec<HandFrame>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
