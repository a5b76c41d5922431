//! Memtree Gesture Model
//!
//! Defines the data contracts that flow through one frame tick:
//! - **Frames:** Timestamped hand-landmark sets delivered by the camera collaborator
//! - **Signals:** The per-frame gesture interpretation (flags + pointer values)
//! - **Snapshots:** The read-only engine output consumed by the renderer
//! - **Poses:** Synthetic landmark sets for tests and scripted recordings
//!
//! All landmark coordinates are normalized to `[0.0, 1.0]` with the origin
//! at the top-left of the camera frame (smaller `y` is higher up).

pub mod frame;
pub mod gesture;
pub mod pose;

pub use frame::*;
pub use gesture::*;
pub use pose::*;
