//! Gesture signals, engine states, and the snapshot handed to the renderer.

use serde::{Deserialize, Serialize};

use crate::frame::TimestampNs;

/// The per-frame interpretation of one hand.
///
/// The four flags are not mutually exclusive; the interaction engine
/// resolves overlaps by priority.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureSignal {
    pub is_fist: bool,
    pub is_pointing: bool,
    pub is_open_palm: bool,
    pub is_ok_gesture: bool,

    /// Wrist X [0.0, 1.0].
    pub hand_x: f64,
    /// Wrist Y [0.0, 1.0].
    pub hand_y: f64,

    /// Index-tip offset from frame center [-1.0, 1.0], positive for rightward hand motion.
    pub pointer_x: f64,
    /// Index-tip offset from frame center [-1.0, 1.0], positive for upward hand motion.
    pub pointer_y: f64,

    /// False when no usable hand was detected.
    pub is_active: bool,
}

impl GestureSignal {
    /// Neutral signal for frames without a usable hand.
    pub const fn inactive() -> Self {
        Self {
            is_fist: false,
            is_pointing: false,
            is_open_palm: false,
            is_ok_gesture: false,
            hand_x: 0.5,
            hand_y: 0.5,
            pointer_x: 0.0,
            pointer_y: 0.0,
            is_active: false,
        }
    }

    /// Short human-readable label of the raised flags, e.g. `"fist"` or `"none"`.
    pub fn label(&self) -> String {
        if !self.is_active {
            return "inactive".to_string();
        }
        let flags = [
            (self.is_ok_gesture, "ok"),
            (self.is_pointing, "pointing"),
            (self.is_fist, "fist"),
            (self.is_open_palm, "open_palm"),
        ];
        let raised: Vec<&str> = flags
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        if raised.is_empty() {
            "none".to_string()
        } else {
            raised.join("+")
        }
    }
}

impl Default for GestureSignal {
    fn default() -> Self {
        Self::inactive()
    }
}

/// Short-lived mode governing how gestures affect the active item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    /// Pointing at the active item; the renderer pulls it closer.
    Approaching,
    /// OK gesture held; the active item is shown in full.
    ChangePhoto,
    /// Particles gathering back into the tree after a fist.
    Clustering,
}

/// Long-lived global display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    #[default]
    TreeMode,
    ExplodeMode,
}

/// A committed change reported by the engine for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EngineAction {
    /// Active index moved forward (OK release or leftward swipe).
    Advanced { from: usize, to: usize },
    /// Active index moved backward (rightward swipe).
    Retreated { from: usize, to: usize },
    /// Display mode toggled by fist or open palm.
    ModeChanged { from: AppState, to: AppState },
}

/// Read-only engine output, updated once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Tick time in monotonic nanoseconds.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,
    pub app_state: AppState,
    pub interaction_state: InteractionState,
    pub active_index: usize,
    /// Latest signal, for continuous steering of visuals.
    pub gesture: GestureSignal,
}

/// First line of a snapshot stream, written as a `#` comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStreamHeader {
    pub schema_version: String,
    /// Wall-clock time at session start (RFC 3339).
    pub epoch_wall: String,
    pub item_count: usize,
    pub tick_rate_hz: u32,
}

impl SnapshotStreamHeader {
    pub const SCHEMA_VERSION: &'static str = "1.0";

    pub fn new(epoch_wall: impl Into<String>, item_count: usize, tick_rate_hz: u32) -> Self {
        Self {
            schema_version: Self::SCHEMA_VERSION.to_string(),
            epoch_wall: epoch_wall.into(),
            item_count,
            tick_rate_hz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_signal_is_neutral() {
        let signal = GestureSignal::default();
        assert!(!signal.is_active);
        assert!(!signal.is_fist && !signal.is_pointing && !signal.is_open_palm);
        assert!(!signal.is_ok_gesture);
        assert_eq!((signal.hand_x, signal.hand_y), (0.5, 0.5));
        assert_eq!((signal.pointer_x, signal.pointer_y), (0.0, 0.0));
    }

    #[test]
    fn test_label_lists_overlapping_flags() {
        let signal = GestureSignal {
            is_fist: true,
            is_ok_gesture: true,
            is_active: true,
            ..GestureSignal::inactive()
        };
        assert_eq!(signal.label(), "ok+fist");
        assert_eq!(GestureSignal::inactive().label(), "inactive");
    }

    #[test]
    fn test_states_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&InteractionState::ChangePhoto).unwrap(),
            "\"change_photo\""
        );
        assert_eq!(
            serde_json::to_string(&AppState::ExplodeMode).unwrap(),
            "\"explode_mode\""
        );
    }

    #[test]
    fn test_action_json_is_tagged() {
        let json = serde_json::to_string(&EngineAction::Advanced { from: 7, to: 0 }).unwrap();
        assert!(json.contains("\"action\":\"advanced\""));
        assert!(json.contains("\"to\":0"));
    }
}
