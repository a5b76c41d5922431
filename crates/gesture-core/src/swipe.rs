//! Swipe detection over a short wrist-position history.
//!
//! While the palm is open, every tick appends the wrist X to a bounded
//! history. Once the history holds more than `min_samples` entries, the
//! oldest and newest samples are compared: a displacement larger than
//! `distance` spread over more than `min_duration_ns` is a swipe. Short
//! bursts (jitter) and small displacements (drift) are rejected.

use std::collections::VecDeque;

use memtree_gesture_model::frame::TimestampNs;
use serde::{Deserialize, Serialize};

/// One wrist position sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeSample {
    pub x: f64,
    pub t: TimestampNs,
}

/// Direction of the hand's travel across the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    /// Wrist X increased (hand moved toward the right edge of the image).
    Rightward,
    /// Wrist X decreased.
    Leftward,
}

/// Bounded FIFO of wrist samples. Never holds more than its capacity.
#[derive(Debug, Clone)]
pub struct SwipeHistory {
    samples: VecDeque<SwipeSample>,
    capacity: usize,
}

impl SwipeHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when full.
    pub fn push(&mut self, x: f64, t: TimestampNs) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(SwipeSample { x, t });
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn samples(&self) -> impl Iterator<Item = &SwipeSample> {
        self.samples.iter()
    }

    /// Evaluate the history for a swipe.
    ///
    /// Requires strictly more than `min_samples` entries, a time span strictly
    /// longer than `min_duration_ns`, and a displacement strictly larger than `distance`.
    pub fn detect(
        &self,
        min_samples: usize,
        distance: f64,
        min_duration_ns: u64,
    ) -> Option<SwipeDirection> {
        if self.samples.len() <= min_samples {
            return None;
        }
        let first = self.samples.front()?;
        let last = self.samples.back()?;

        let dx = last.x - first.x;
        let dt = last.t.saturating_sub(first.t);

        if dt > min_duration_ns && dx.abs() > distance {
            Some(if dx > 0.0 {
                SwipeDirection::Rightward
            } else {
                SwipeDirection::Leftward
            })
        } else {
            None
        }
    }
}
