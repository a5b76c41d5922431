//! Run the interaction engine over a recording, on the frames' own timestamps.

use std::path::PathBuf;

use memtree_common::clock::SessionClock;
use memtree_common::config::AppConfig;
use memtree_frame_driver::writer::SnapshotWriter;
use memtree_gesture_core::pipeline::GesturePipeline;
use memtree_gesture_model::gesture::{EngineAction, SnapshotStreamHeader};

pub fn run(
    mut config: AppConfig,
    path: PathBuf,
    out: Option<PathBuf>,
    items: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(items) = items {
        config.engine.item_count = items;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    println!("Replaying: {}", path.display());
    let frames = super::load_frames(&path)?;
    println!("  Loaded {} frames", frames.len());
    println!("  Items: {}", config.engine.item_count);
    println!();

    let mut pipeline = GesturePipeline::from_config(&config);
    let outputs = pipeline.replay(&frames);

    let mut writer = match out {
        Some(ref out) => {
            let clock = SessionClock::start();
            let header = SnapshotStreamHeader::new(
                clock.epoch_wall(),
                config.engine.item_count,
                config.driver.tick_rate_hz,
            );
            Some(
                SnapshotWriter::new(out.clone(), &header)
                    .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", out.display()))?,
            )
        }
        None => None,
    };

    let mut committed = 0usize;
    for output in &outputs {
        for action in &output.actions {
            committed += 1;
            let secs = SessionClock::ns_to_secs(output.snapshot.timestamp_ns);
            match action {
                EngineAction::Advanced { from, to } => {
                    println!("  {secs:>9.3}s  advanced   {from} -> {to}")
                }
                EngineAction::Retreated { from, to } => {
                    println!("  {secs:>9.3}s  retreated  {from} -> {to}")
                }
                EngineAction::ModeChanged { from, to } => {
                    println!("  {secs:>9.3}s  mode       {from:?} -> {to:?}")
                }
            }
        }
        if let Some(writer) = writer.as_mut() {
            writer.write_snapshot(&output.snapshot)?;
        }
    }

    if let Some(mut writer) = writer {
        writer.flush()?;
        println!();
        println!(
            "Wrote {} snapshots to: {}",
            writer.snapshots_written(),
            writer.path().display()
        );
    }

    let last = pipeline.snapshot();
    println!();
    println!("Committed actions: {committed}");
    println!(
        "Final state: {:?} / {:?}, active item {}",
        last.app_state, last.interaction_state, last.active_index
    );
    Ok(())
}
