pub mod classify;
pub mod config;
pub mod replay;
pub mod run;
pub mod synth;

use std::path::Path;

use memtree_gesture_model::frame::{parse_frames, HandFrame};

/// Read a frames JSONL file.
pub fn load_frames(path: &Path) -> anyhow::Result<Vec<HandFrame>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let frames = parse_frames(&content)
        .map_err(|e| anyhow::anyhow!("Invalid frame file {}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), frames = frames.len(), "Loaded frames");
    Ok(frames)
}
