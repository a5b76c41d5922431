//! Classifier and engine wired together for one frame tick.

use memtree_common::config::AppConfig;
use memtree_gesture_model::frame::{HandFrame, TimestampNs};
use memtree_gesture_model::gesture::{EngineAction, EngineSnapshot};

use crate::classifier::LandmarkClassifier;
use crate::engine::InteractionEngine;

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    pub snapshot: EngineSnapshot,
    pub actions: Vec<EngineAction>,
}

/// Landmarks in, snapshot out.
#[derive(Debug, Clone, Default)]
pub struct GesturePipeline {
    classifier: LandmarkClassifier,
    engine: InteractionEngine,
}

impl GesturePipeline {
    pub fn new(classifier: LandmarkClassifier, engine: InteractionEngine) -> Self {
        Self { classifier, engine }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            LandmarkClassifier::new(config.classifier.clone()),
            InteractionEngine::new(config.engine.clone()),
        )
    }

    /// Run one tick.
    ///
    /// `Some(frame)` is classified and fed to the engine. `None` means the
    /// camera produced nothing new this tick: the previous state is kept and
    /// only timers advance.
    pub fn tick(&mut self, frame: Option<&HandFrame>, now: TimestampNs) -> TickOutput {
        let actions = match frame {
            Some(frame) => {
                let signal = self.classifier.classify(frame);
                self.engine.process(&signal, now)
            }
            None => {
                self.engine.expire(now);
                Vec::new()
            }
        };
        TickOutput {
            snapshot: self.engine.snapshot(),
            actions,
        }
    }

    /// Process a recording deterministically, one tick per frame at the frame's own timestamp.
    pub fn replay(&mut self, frames: &[HandFrame]) -> Vec<TickOutput> {
        frames
            .iter()
            .map(|frame| self.tick(Some(frame), frame.timestamp_ns))
            .collect()
    }

    pub fn classifier(&self) -> &LandmarkClassifier {
        &self.classifier
    }

    pub fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.engine.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memtree_gesture_model::gesture::InteractionState;
    use memtree_gesture_model::pose::HandPose;

    const MS: u64 = 1_000_000;

    #[test]
    fn test_missing_frame_keeps_state() {
        let mut pipeline = GesturePipeline::default();
        pipeline.tick(Some(&HandPose::Pointing.frame(0, 0.5, 0.7)), 0);
        let out = pipeline.tick(None, 16 * MS);
        assert_eq!(out.snapshot.interaction_state, InteractionState::Approaching);
        assert!(out.snapshot.gesture.is_pointing);
        assert!(out.actions.is_empty());
    }

    #[test]
    fn test_replay_uses_frame_timestamps() {
        let frames = vec![
            HandPose::Ok.frame(0, 0.5, 0.7),
            HandPose::Ok.frame(16 * MS, 0.5, 0.7),
            HandPose::Relaxed.frame(32 * MS, 0.5, 0.7),
        ];
        let outputs = GesturePipeline::default().replay(&frames);
        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[1].snapshot.interaction_state, InteractionState::ChangePhoto);
        assert_eq!(outputs[2].snapshot.active_index, 1);
        assert_eq!(outputs[2].snapshot.timestamp_ns, 32 * MS);
        assert_eq!(outputs[2].actions.len(), 1);
    }

    #[test]
    fn test_from_config_applies_item_count() {
        let mut config = AppConfig::default();
        config.engine.item_count = 3;
        let pipeline = GesturePipeline::from_config(&config);
        assert_eq!(pipeline.engine().item_count(), 3);
    }
}
