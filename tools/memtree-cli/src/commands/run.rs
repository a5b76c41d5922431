//! Drive a recording through the paced frame-tick loop.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use memtree_common::clock::SessionClock;
use memtree_common::config::AppConfig;
use memtree_frame_driver::{FrameDriver, ReplaySource, SnapshotSink, SnapshotWriter};
use memtree_gesture_core::pipeline::GesturePipeline;
use memtree_gesture_model::gesture::{EngineSnapshot, SnapshotStreamHeader};
use tokio::sync::watch;

pub async fn run(
    mut config: AppConfig,
    path: PathBuf,
    looping: bool,
    out: Option<PathBuf>,
    fps: Option<u32>,
) -> anyhow::Result<()> {
    if let Some(fps) = fps {
        config.driver.tick_rate_hz = fps;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let source = ReplaySource::from_file(&path)
        .map_err(|e| anyhow::anyhow!("Failed to open recording: {e}"))?
        .looping(looping);

    println!("Driving: {}", path.display());
    println!("  Frames: {}", source.len());
    println!("  Tick rate: {} Hz", config.driver.tick_rate_hz);
    println!("  Loop: {looping}");
    if looping {
        println!("Press Ctrl+C to stop...");
    }
    println!();

    let pipeline = GesturePipeline::from_config(&config);
    let clock = SessionClock::start();
    let (tx, rx) = watch::channel(pipeline.snapshot());

    let sink: Box<dyn SnapshotSink> = match out {
        Some(ref out) => {
            let header = SnapshotStreamHeader::new(
                clock.epoch_wall(),
                config.engine.item_count,
                config.driver.tick_rate_hz,
            );
            let writer = SnapshotWriter::new(out.clone(), &header)
                .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", out.display()))?;
            Box::new((tx, writer))
        }
        None => Box::new(tx),
    };

    let mut driver =
        FrameDriver::new(Box::new(source), pipeline, sink, &config.driver).with_clock(clock);

    let stop = driver.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.store(true, Ordering::SeqCst);
        }
    });

    let printer = tokio::spawn(print_changes(rx));

    let stats = driver.run().await?;
    drop(driver);
    printer.await?;

    println!();
    println!(
        "Stopped after {} ticks ({} frames, {} actions)",
        stats.ticks, stats.frames, stats.actions
    );
    if let Some(out) = out {
        println!("Snapshots written to: {}", out.display());
    }
    Ok(())
}

/// Print every visible state change, like a renderer reacting to snapshots.
async fn print_changes(mut rx: watch::Receiver<EngineSnapshot>) {
    let mut last = *rx.borrow_and_update();
    while rx.changed().await.is_ok() {
        let snapshot = *rx.borrow_and_update();
        if (snapshot.app_state, snapshot.interaction_state, snapshot.active_index)
            != (last.app_state, last.interaction_state, last.active_index)
        {
            println!(
                "  {:>9.3}s  {:?} / {:?}, active item {}",
                SessionClock::ns_to_secs(snapshot.timestamp_ns),
                snapshot.app_state,
                snapshot.interaction_state,
                snapshot.active_index
            );
        }
        last = snapshot;
    }
}
