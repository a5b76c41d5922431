//! Synthetic hand poses.
//!
//! Builds upright 21-point hands (fingers pointing toward the top of the
//! frame) for a handful of canonical poses. Used to script recordings and
//! to exercise the classifier without a camera.

use serde::{Deserialize, Serialize};

use crate::frame::{HandFrame, Landmark, TimestampNs, LANDMARK_COUNT};

/// Horizontal offset of each non-thumb finger column from the wrist.
const FINGER_COLUMNS: [f64; 4] = [-0.03, 0.0, 0.025, 0.05];

/// Canonical hand shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPose {
    /// All four fingers curled.
    Fist,
    /// Index extended, the rest curled.
    Pointing,
    /// All fingers extended.
    OpenPalm,
    /// Thumb and index tips touching, the other fingers extended.
    Ok,
    /// Index curled, the rest extended. Raises no gesture flag.
    Relaxed,
}

#[derive(Clone, Copy)]
enum Finger {
    Extended,
    Folded,
    Pinching,
}

impl HandPose {
    pub const ALL: [HandPose; 5] = [
        HandPose::Fist,
        HandPose::Pointing,
        HandPose::OpenPalm,
        HandPose::Ok,
        HandPose::Relaxed,
    ];

    fn fingers(self) -> [Finger; 4] {
        use Finger::*;
        match self {
            HandPose::Fist => [Folded, Folded, Folded, Folded],
            HandPose::Pointing => [Extended, Folded, Folded, Folded],
            HandPose::OpenPalm => [Extended, Extended, Extended, Extended],
            HandPose::Ok => [Pinching, Extended, Extended, Extended],
            HandPose::Relaxed => [Folded, Extended, Extended, Extended],
        }
    }

    /// Landmarks in anatomical order for a hand whose wrist sits at
    /// `(wrist_x, wrist_y)`. Keep `wrist_y >= 0.25` for the fingertips to stay in frame.
    pub fn landmarks(self, wrist_x: f64, wrist_y: f64) -> Vec<Landmark> {
        let at = |dx: f64, dy: f64| Landmark::new(wrist_x + dx, wrist_y + dy);

        let mut points = Vec::with_capacity(LANDMARK_COUNT);
        points.push(at(0.0, 0.0));

        // Thumb: CMC, MCP, IP, tip.
        points.push(at(-0.03, -0.03));
        points.push(at(-0.055, -0.06));
        points.push(at(-0.075, -0.085));
        points.push(at(-0.09, -0.105));

        for (column, finger) in FINGER_COLUMNS.iter().zip(self.fingers()) {
            let dx = *column;
            points.push(at(dx, -0.10));
            match finger {
                Finger::Extended => {
                    points.push(at(dx, -0.15));
                    points.push(at(dx, -0.185));
                    points.push(at(dx, -0.22));
                }
                Finger::Folded => {
                    points.push(at(dx, -0.14));
                    points.push(at(dx + 0.005, -0.12));
                    points.push(at(dx + 0.005, -0.10));
                }
                Finger::Pinching => {
                    // Curls over to meet the thumb tip.
                    points.push(at(dx - 0.015, -0.14));
                    points.push(at(dx - 0.04, -0.13));
                    points.push(at(dx - 0.055, -0.11));
                }
            }
        }

        points
    }

    /// A frame carrying this pose.
    pub fn frame(self, timestamp_ns: TimestampNs, wrist_x: f64, wrist_y: f64) -> HandFrame {
        HandFrame::with_landmarks(timestamp_ns, self.landmarks(wrist_x, wrist_y))
    }
}

/// Frame interval of a 60 fps camera.
pub const FRAME_INTERVAL_NS: TimestampNs = 16_666_667;

/// Builds a timed sequence of synthetic frames, one camera frame apart.
#[derive(Debug, Clone)]
pub struct PoseScript {
    frames: Vec<HandFrame>,
    t: TimestampNs,
    wrist_y: f64,
}

impl PoseScript {
    pub fn new(wrist_y: f64) -> Self {
        Self {
            frames: Vec::new(),
            t: 0,
            wrist_y,
        }
    }

    fn push(&mut self, frame: HandFrame) {
        self.frames.push(frame);
        self.t += FRAME_INTERVAL_NS;
    }

    /// Hold a pose still for `count` frames.
    pub fn hold(mut self, pose: HandPose, wrist_x: f64, count: usize) -> Self {
        for _ in 0..count {
            let frame = pose.frame(self.t, wrist_x, self.wrist_y);
            self.push(frame);
        }
        self
    }

    /// Move an open palm linearly from `from_x` to `to_x` over `count` frames.
    pub fn sweep(mut self, from_x: f64, to_x: f64, count: usize) -> Self {
        let steps = count.saturating_sub(1).max(1) as f64;
        for i in 0..count {
            let x = from_x + (to_x - from_x) * i as f64 / steps;
            let frame = HandPose::OpenPalm.frame(self.t, x, self.wrist_y);
            self.push(frame);
        }
        self
    }

    /// `count` frames without a hand.
    pub fn lost(mut self, count: usize) -> Self {
        for _ in 0..count {
            let frame = HandFrame::empty(self.t);
            self.push(frame);
        }
        self
    }

    /// Skip ahead without emitting frames.
    pub fn wait_ms(mut self, ms: u64) -> Self {
        self.t = self.t.saturating_add(ms.saturating_mul(1_000_000));
        self
    }

    pub fn frames(&self) -> &[HandFrame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<HandFrame> {
        self.frames
    }
}

impl Default for PoseScript {
    fn default() -> Self {
        Self::new(0.7)
    }
}
