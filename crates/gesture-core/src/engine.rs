//! The interaction engine: a single-threaded reducer over gesture signals.
//!
//! Owns all short-term interaction memory:
//! - the active item index and the two state machines
//! - the swipe history
//! - the time of the last committed index change (cooldown)
//! - whether the OK gesture was held on the previous tick
//! - the deadline at which the fist "clustering" phase reverts to idle
//!
//! The clustering revert is a deadline checked on every tick, not a timer
//! callback: any other interaction change made before it expires cancels it.

use memtree_common::clock::SessionClock;
use memtree_common::config::EngineConfig;
use memtree_gesture_model::frame::TimestampNs;
use memtree_gesture_model::gesture::{
    AppState, EngineAction, EngineSnapshot, GestureSignal, InteractionState,
};

use crate::rules::{Flow, Rule, RULE_ORDER};
use crate::swipe::{SwipeDirection, SwipeHistory};

/// Stateful gesture-to-action reducer.
#[derive(Debug, Clone)]
pub struct InteractionEngine {
    config: EngineConfig,
    item_count: usize,
    interaction: InteractionState,
    app: AppState,
    active_index: usize,
    history: SwipeHistory,
    last_action_ns: Option<TimestampNs>,
    was_ok_gesture: bool,
    cluster_deadline_ns: Option<TimestampNs>,
    last_signal: GestureSignal,
    last_tick_ns: TimestampNs,
}

impl InteractionEngine {
    /// Create an engine. An `item_count` of zero is treated as one.
    pub fn new(config: EngineConfig) -> Self {
        let item_count = config.item_count.max(1);
        let history = SwipeHistory::new(config.swipe_history_capacity);
        Self {
            config,
            item_count,
            interaction: InteractionState::Idle,
            app: AppState::TreeMode,
            active_index: 0,
            history,
            last_action_ns: None,
            was_ok_gesture: false,
            cluster_deadline_ns: None,
            last_signal: GestureSignal::inactive(),
            last_tick_ns: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Process one tick's signal and return the actions it committed.
    pub fn process(&mut self, signal: &GestureSignal, now: TimestampNs) -> Vec<EngineAction> {
        self.expire(now);
        self.last_signal = *signal;

        let mut actions = Vec::new();
        for rule in RULE_ORDER {
            if self.apply_rule(rule, signal, now, &mut actions) == Flow::Halt {
                tracing::trace!(rule = rule.name(), t = now, "Rule evaluation halted");
                break;
            }
        }
        actions
    }

    /// Advance timers on a tick that brought no new frame.
    ///
    /// Reverts an expired clustering phase; everything else is kept as is.
    pub fn expire(&mut self, now: TimestampNs) {
        self.last_tick_ns = self.last_tick_ns.max(now);
        if let Some(deadline) = self.cluster_deadline_ns {
            if now >= deadline {
                self.cluster_deadline_ns = None;
                if self.interaction == InteractionState::Clustering {
                    tracing::debug!(t = now, "Clustering finished");
                    self.set_interaction(InteractionState::Idle);
                }
            }
        }
    }

    /// Evaluate a single rule against a signal.
    pub fn apply_rule(
        &mut self,
        rule: Rule,
        signal: &GestureSignal,
        now: TimestampNs,
        actions: &mut Vec<EngineAction>,
    ) -> Flow {
        match rule {
            Rule::Inactivity => {
                if signal.is_active {
                    return Flow::Continue;
                }
                self.history.clear();
                if self.interaction == InteractionState::ChangePhoto {
                    self.set_interaction(InteractionState::Idle);
                }
                Flow::Halt
            }
            Rule::OkHoldRelease => {
                if signal.is_ok_gesture {
                    self.set_interaction(InteractionState::ChangePhoto);
                    self.was_ok_gesture = true;
                } else {
                    if self.was_ok_gesture && !self.in_cooldown(now) {
                        actions.push(self.step_forward());
                        self.set_interaction(InteractionState::Idle);
                        self.last_action_ns = Some(now);
                    }
                    self.was_ok_gesture = false;
                }
                Flow::Continue
            }
            Rule::CooldownGate => {
                if self.in_cooldown(now) {
                    Flow::Halt
                } else {
                    Flow::Continue
                }
            }
            Rule::Pointing => {
                if signal.is_pointing && !signal.is_fist && !signal.is_ok_gesture {
                    self.set_interaction(InteractionState::Approaching);
                } else if self.interaction == InteractionState::Approaching && !signal.is_pointing
                {
                    self.set_interaction(InteractionState::Idle);
                }
                Flow::Continue
            }
            Rule::FistCluster => {
                if !(signal.is_fist && !signal.is_pointing && !signal.is_ok_gesture) {
                    return Flow::Continue;
                }
                if self.app != AppState::TreeMode {
                    actions.push(self.set_app(AppState::TreeMode));
                    self.set_interaction(InteractionState::Clustering);
                    self.cluster_deadline_ns = Some(
                        now.saturating_add(SessionClock::ms_to_ns(self.config.cluster_revert_ms)),
                    );
                }
                Flow::Halt
            }
            Rule::OpenPalmSwipe => {
                if !(signal.is_open_palm && !signal.is_ok_gesture) {
                    return Flow::Continue;
                }
                if self.app != AppState::ExplodeMode {
                    actions.push(self.set_app(AppState::ExplodeMode));
                }
                self.history.push(signal.hand_x, now);
                let swipe = self.history.detect(
                    self.config.swipe_min_samples,
                    self.config.swipe_distance,
                    SessionClock::ms_to_ns(self.config.swipe_min_duration_ms),
                );
                if let Some(direction) = swipe {
                    let action = match direction {
                        SwipeDirection::Rightward => self.step_back(),
                        SwipeDirection::Leftward => self.step_forward(),
                    };
                    actions.push(action);
                    self.last_action_ns = Some(now);
                    self.history.clear();
                }
                Flow::Continue
            }
        }
    }

    /// Whether a committed index change happened less than the cooldown ago.
    pub fn in_cooldown(&self, now: TimestampNs) -> bool {
        match self.last_action_ns {
            Some(last) => {
                now.saturating_sub(last) < SessionClock::ms_to_ns(self.config.cooldown_ms)
            }
            None => false,
        }
    }

    /// Read-only view for the renderer.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            timestamp_ns: self.last_tick_ns,
            app_state: self.app,
            interaction_state: self.interaction,
            active_index: self.active_index,
            gesture: self.last_signal,
        }
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.interaction
    }

    pub fn app_state(&self) -> AppState {
        self.app
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn history(&self) -> &SwipeHistory {
        &self.history
    }

    pub fn is_holding_ok(&self) -> bool {
        self.was_ok_gesture
    }

    /// Pending clustering revert, if any.
    pub fn cluster_deadline(&self) -> Option<TimestampNs> {
        self.cluster_deadline_ns
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn step_forward(&mut self) -> EngineAction {
        let from = self.active_index;
        self.active_index = (from + 1) % self.item_count;
        tracing::info!(from, to = self.active_index, "Advanced active item");
        EngineAction::Advanced {
            from,
            to: self.active_index,
        }
    }

    fn step_back(&mut self) -> EngineAction {
        let from = self.active_index;
        self.active_index = (from + self.item_count - 1) % self.item_count;
        tracing::info!(from, to = self.active_index, "Retreated active item");
        EngineAction::Retreated {
            from,
            to: self.active_index,
        }
    }

    fn set_app(&mut self, to: AppState) -> EngineAction {
        let from = self.app;
        self.app = to;
        tracing::info!(?from, ?to, "Display mode changed");
        EngineAction::ModeChanged { from, to }
    }

    fn set_interaction(&mut self, next: InteractionState) {
        if self.interaction == next {
            return;
        }
        tracing::debug!(from = ?self.interaction, to = ?next, "Interaction state changed");
        self.interaction = next;
        if next != InteractionState::Clustering {
            self.cluster_deadline_ns = None;
        }
    }
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
