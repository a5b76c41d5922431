//! Landmark classification.
//!
//! Reduces one frame's 21 landmarks to discrete gesture flags plus the
//! continuous wrist and pointer values used for steering.
//!
//! # Finger tests
//!
//! Image `y` grows downward, so a raised fingertip has a *smaller* `y`
//! than its PIP knuckle.
//!
//! * **Index extended:** tip sits above its PIP by more than `index_extension_margin`.
//! * **Middle / ring / pinky folded:** tip sits below its PIP.
//! * **OK:** thumb tip and index tip closer than `ok_pinch_distance`,
//!   middle and ring not folded.

use memtree_common::config::ClassifierConfig;
use memtree_gesture_model::frame::{
    HandFrame, HandLandmarks, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP,
    RING_PIP, RING_TIP, THUMB_TIP,
};
use memtree_gesture_model::gesture::GestureSignal;

/// Stateless landmark classifier.
#[derive(Debug, Clone, Default)]
pub struct LandmarkClassifier {
    config: ClassifierConfig,
}

/// Per-finger posture of one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerState {
    pub index_extended: bool,
    pub middle_folded: bool,
    pub ring_folded: bool,
    pub pinky_folded: bool,
}

impl LandmarkClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a frame. Missing or malformed hands yield an inactive signal.
    pub fn classify(&self, frame: &HandFrame) -> GestureSignal {
        match frame.hand() {
            Ok(Some(hand)) => self.classify_hand(&hand),
            Ok(None) => GestureSignal::inactive(),
            Err(e) => {
                tracing::trace!(t = frame.timestamp_ns, error = %e, "Discarding malformed hand");
                GestureSignal::inactive()
            }
        }
    }

    /// Classify an optional frame; `None` is treated like a frame without a hand.
    pub fn classify_opt(&self, frame: Option<&HandFrame>) -> GestureSignal {
        frame
            .map(|f| self.classify(f))
            .unwrap_or_else(GestureSignal::inactive)
    }

    /// Classify a validated hand.
    pub fn classify_hand(&self, hand: &HandLandmarks) -> GestureSignal {
        let fingers = self.finger_state(hand);
        let curled = fingers.middle_folded && fingers.ring_folded && fingers.pinky_folded;
        let spread = !fingers.middle_folded && !fingers.ring_folded && !fingers.pinky_folded;

        let pinch = hand.get(THUMB_TIP).planar_distance(hand.get(INDEX_TIP));
        let is_ok_gesture =
            pinch < self.config.ok_pinch_distance && !fingers.middle_folded && !fingers.ring_folded;

        let wrist = hand.wrist();
        let index_tip = hand.get(INDEX_TIP);

        GestureSignal {
            is_fist: !fingers.index_extended && curled,
            is_pointing: fingers.index_extended && curled,
            is_open_palm: fingers.index_extended && spread,
            is_ok_gesture,
            hand_x: wrist.x,
            hand_y: wrist.y,
            pointer_x: (0.5 - index_tip.x) * 2.0,
            pointer_y: (0.5 - index_tip.y) * 2.0,
            is_active: true,
        }
    }

    /// Per-finger extension tests.
    pub fn finger_state(&self, hand: &HandLandmarks) -> FingerState {
        let folded = |tip: usize, pip: usize| hand.get(tip).y > hand.get(pip).y;
        FingerState {
            index_extended: hand.get(INDEX_TIP).y
                < hand.get(INDEX_PIP).y - self.config.index_extension_margin,
            middle_folded: folded(MIDDLE_TIP, MIDDLE_PIP),
            ring_folded: folded(RING_TIP, RING_PIP),
            pinky_folded: folded(PINKY_TIP, PINKY_PIP),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memtree_gesture_model::frame::{Landmark, LANDMARK_COUNT};
    use memtree_gesture_model::pose::HandPose;

    fn classify(pose: HandPose) -> GestureSignal {
        LandmarkClassifier::default().classify(&pose.frame(0, 0.5, 0.7))
    }

    #[test]
    fn test_no_hand_is_inactive() {
        let signal = LandmarkClassifier::default().classify(&HandFrame::empty(0));
        assert_eq!(signal, GestureSignal::inactive());
    }

    #[test]
    fn test_malformed_hand_is_inactive() {
        let frame = HandFrame::with_landmarks(0, vec![Landmark::new(0.5, 0.5); 3]);
        let signal = LandmarkClassifier::default().classify(&frame);
        assert!(!signal.is_active);
        assert_eq!(signal.label(), "inactive");
    }

    #[test]
    fn test_missing_frame_is_inactive() {
        assert!(!LandmarkClassifier::default().classify_opt(None).is_active);
    }

    #[test]
    fn test_fist() {
        let s = classify(HandPose::Fist);
        assert!(s.is_active && s.is_fist);
        assert!(!s.is_pointing && !s.is_open_palm && !s.is_ok_gesture);
    }

    #[test]
    fn test_pointing() {
        let s = classify(HandPose::Pointing);
        assert!(s.is_pointing);
        assert!(!s.is_fist && !s.is_open_palm && !s.is_ok_gesture);
    }

    #[test]
    fn test_open_palm() {
        let s = classify(HandPose::OpenPalm);
        assert!(s.is_open_palm);
        assert!(!s.is_fist && !s.is_pointing && !s.is_ok_gesture);
    }

    #[test]
    fn test_ok() {
        let s = classify(HandPose::Ok);
        assert!(s.is_ok_gesture);
        assert!(!s.is_fist && !s.is_pointing && !s.is_open_palm);
    }

    #[test]
    fn test_relaxed_raises_nothing() {
        let s = classify(HandPose::Relaxed);
        assert!(s.is_active);
        assert_eq!(s.label(), "none");
    }

    #[test]
    fn test_continuous_values() {
        let signal =
            LandmarkClassifier::default().classify(&HandPose::Pointing.frame(0, 0.3, 0.8));
        assert!((signal.hand_x - 0.3).abs() < 1e-12);
        assert!((signal.hand_y - 0.8).abs() < 1e-12);

        // Index tip sits at (0.27, 0.58): left of and above center.
        assert!((signal.pointer_x - (0.5 - 0.27) * 2.0).abs() < 1e-9);
        assert!((signal.pointer_y - (0.5 - 0.58) * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_index_margin_is_strict() {
        // Index tip only 0.04 above its PIP does not count as extended.
        let mut points = HandPose::Pointing.landmarks(0.5, 0.7);
        points[INDEX_TIP].y = points[INDEX_PIP].y - 0.04;
        let frame = HandFrame::with_landmarks(0, points);
        let s = LandmarkClassifier::default().classify(&frame);
        assert!(!s.is_pointing);
        assert!(s.is_fist);
    }

    #[test]
    fn test_custom_pinch_threshold() {
        let classifier = LandmarkClassifier::new(ClassifierConfig {
            ok_pinch_distance: 0.005,
            ..Default::default()
        });
        let s = classifier.classify(&HandPose::Ok.frame(0, 0.5, 0.7));
        assert!(!s.is_ok_gesture);
    }

    #[test]
    fn test_collapsed_hand_reads_as_pinch() {
        // Degenerate but well-formed: every point coincides, so nothing is
        // extended or folded and the thumb/index distance is zero.
        let frame = HandFrame::with_landmarks(0, vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT]);
        let s = LandmarkClassifier::default().classify(&frame);
        assert!(s.is_active);
        assert!(!s.is_fist && !s.is_pointing && !s.is_open_palm);
        assert!(s.is_ok_gesture);
    }
}
