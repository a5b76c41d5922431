//! The engine's ordered rule table.
//!
//! Gesture flags can overlap, so each tick walks these rules in a fixed
//! order and a rule may halt the walk. The order *is* the priority policy:
//! OK beats pointing, pointing beats fist, fist beats open palm.

use serde::{Deserialize, Serialize};

/// One step of the per-tick evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// No hand: clear the swipe history, leave the photo focus, halt.
    Inactivity,
    /// OK held focuses the active item; releasing it advances. Runs during cooldown.
    OkHoldRelease,
    /// Halts while a committed action is cooling down.
    CooldownGate,
    /// Pointing approaches the active item; dropping the point returns to idle.
    Pointing,
    /// Fist returns to tree mode with a timed clustering phase. Halts when the fist flags match.
    FistCluster,
    /// Open palm explodes the tree and feeds the swipe detector.
    OpenPalmSwipe,
}

/// Whether evaluation continues with the next rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// Evaluation order, highest priority first.
pub const RULE_ORDER: [Rule; 6] = [
    Rule::Inactivity,
    Rule::OkHoldRelease,
    Rule::CooldownGate,
    Rule::Pointing,
    Rule::FistCluster,
    Rule::OpenPalmSwipe,
];

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Rule::Inactivity => "inactivity",
            Rule::OkHoldRelease => "ok_hold_release",
            Rule::CooldownGate => "cooldown_gate",
            Rule::Pointing => "pointing",
            Rule::FistCluster => "fist_cluster",
            Rule::OpenPalmSwipe => "open_palm_swipe",
        }
    }

    /// Rules that still run while a cooldown is active.
    pub fn runs_during_cooldown(self) -> bool {
        matches!(self, Rule::Inactivity | Rule::OkHoldRelease | Rule::CooldownGate)
    }
}
