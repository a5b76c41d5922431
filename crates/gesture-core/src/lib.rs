//! Memtree Gesture Core
//!
//! Turns a per-frame stream of hand landmarks into committed user actions:
//! - **Classifier:** Stateless landmarks → gesture flags and pointer values
//! - **Engine:** Stateful reducer applying an ordered rule table with a
//!   cooldown, an OK hold/release edge, a swipe history, and a clustering deadline
//! - **Pipeline:** Both stages wired together for one tick
//!
//! This crate is pure computation: no I/O and no clock of its own.
//! Every tick receives its timestamp from the caller.

pub mod classifier;
pub mod engine;
pub mod pipeline;
pub mod rules;
pub mod swipe;

pub use classifier::LandmarkClassifier;
pub use engine::InteractionEngine;
pub use pipeline::GesturePipeline;
pub use swipe::{SwipeDirection, SwipeHistory};
