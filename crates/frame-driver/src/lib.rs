//! Memtree Frame Driver
//!
//! Runs the per-frame tick loop: poll a hand-landmark source, push the
//! frame through the gesture pipeline, publish the resulting snapshot.
//! Sources and sinks are injected, so the same loop serves a live camera
//! producer, a recorded session, or a test.
//!
//! Each tick polls at most one frame. A tick with no new frame keeps the
//! previous gesture state and only advances engine timers. The loop ends
//! when the stop flag is set or the source is exhausted, and the source is
//! released exactly once on the way out.

pub mod sources;
pub mod writer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use memtree_common::clock::{RateController, SessionClock};
use memtree_common::config::DriverConfig;
use memtree_common::error::{MemtreeError, MemtreeResult};
use memtree_gesture_core::pipeline::{GesturePipeline, TickOutput};
use memtree_gesture_model::frame::HandFrame;
use memtree_gesture_model::gesture::EngineSnapshot;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

pub use sources::{ChannelSource, ReplaySource};
pub use writer::SnapshotWriter;

/// Trait for hand-landmark sources.
pub trait FrameSource: Send {
    /// Poll for the next frame. Returns `None` if no new frame is available.
    fn poll(&mut self) -> MemtreeResult<Option<HandFrame>>;

    /// Source name for logging.
    fn name(&self) -> &str;

    /// Check if the source can deliver frames on this system.
    fn is_available(&self) -> bool;

    /// Whether the source will never deliver another frame.
    fn is_exhausted(&self) -> bool {
        false
    }

    /// Tear down the underlying device. Called once when the driver stops.
    fn release(&mut self) {}
}

/// Receives one snapshot per tick.
pub trait SnapshotSink: Send {
    fn publish(&mut self, snapshot: &EngineSnapshot) -> MemtreeResult<()>;

    fn flush(&mut self) -> MemtreeResult<()> {
        Ok(())
    }
}

/// Latest-value handoff to a renderer task.
impl SnapshotSink for watch::Sender<EngineSnapshot> {
    fn publish(&mut self, snapshot: &EngineSnapshot) -> MemtreeResult<()> {
        self.send_replace(*snapshot);
        Ok(())
    }
}

/// Collects every snapshot in memory.
impl SnapshotSink for Vec<EngineSnapshot> {
    fn publish(&mut self, snapshot: &EngineSnapshot) -> MemtreeResult<()> {
        self.push(*snapshot);
        Ok(())
    }
}

/// Fan out to two sinks.
impl<A: SnapshotSink, B: SnapshotSink> SnapshotSink for (A, B) {
    fn publish(&mut self, snapshot: &EngineSnapshot) -> MemtreeResult<()> {
        self.0.publish(snapshot)?;
        self.1.publish(snapshot)
    }

    fn flush(&mut self) -> MemtreeResult<()> {
        self.0.flush()?;
        self.1.flush()
    }
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub ticks: u64,
    pub frames: u64,
    pub actions: u64,
    pub source_errors: u64,
}

/// Coordinates a frame source, the gesture pipeline and a snapshot sink.
pub struct FrameDriver {
    source: Box<dyn FrameSource>,
    pipeline: GesturePipeline,
    sink: Box<dyn SnapshotSink>,
    clock: SessionClock,
    tick_interval: Duration,
    stop_flag: Arc<AtomicBool>,
    stats: DriverStats,
    released: bool,
}

impl FrameDriver {
    pub fn new(
        source: Box<dyn FrameSource>,
        pipeline: GesturePipeline,
        sink: Box<dyn SnapshotSink>,
        config: &DriverConfig,
    ) -> Self {
        let pacing = RateController::new(config.tick_rate_hz);
        Self {
            source,
            pipeline,
            sink,
            clock: SessionClock::start(),
            tick_interval: Duration::from_nanos(pacing.interval_ns()),
            stop_flag: Arc::new(AtomicBool::new(false)),
            stats: DriverStats::default(),
            released: false,
        }
    }

    /// Use an existing session clock (e.g. one whose epoch went into a stream header).
    pub fn with_clock(mut self, clock: SessionClock) -> Self {
        self.clock = clock;
        self
    }

    /// Run the tick loop until stopped or the source runs dry.
    pub async fn run(&mut self) -> MemtreeResult<DriverStats> {
        if self.released {
            return Err(MemtreeError::source(format!(
                "{} source already released",
                self.source.name()
            )));
        }
        if !self.source.is_available() {
            tracing::warn!(source = %self.source.name(), "Frame source reports unavailable");
        }
        tracing::info!(
            source = %self.source.name(),
            interval_ms = self.tick_interval.as_secs_f64() * 1000.0,
            "Frame driver started"
        );

        let result = self.run_loop().await;
        let flushed = self.sink.flush();

        self.source.release();
        self.released = true;

        tracing::info!(
            ticks = self.stats.ticks,
            frames = self.stats.frames,
            actions = self.stats.actions,
            "Frame driver stopped"
        );

        result?;
        flushed?;
        Ok(self.stats)
    }

    async fn run_loop(&mut self) -> MemtreeResult<()> {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut status = RateController::new(1);

        loop {
            interval.tick().await;
            if self.stop_flag.load(Ordering::Relaxed) {
                break;
            }

            let frame = match self.source.poll() {
                Ok(frame) => frame,
                Err(e) => {
                    self.stats.source_errors += 1;
                    tracing::warn!(error = %e, "Frame source error");
                    None
                }
            };
            if frame.is_none() && self.source.is_exhausted() {
                tracing::debug!(source = %self.source.name(), "Frame source exhausted");
                break;
            }

            let output = self.step(frame.as_ref())?;
            if status.should_tick(output.snapshot.timestamp_ns) {
                tracing::debug!(
                    ticks = self.stats.ticks,
                    frames = self.stats.frames,
                    state = ?output.snapshot.interaction_state,
                    active_index = output.snapshot.active_index,
                    "Frame driver status"
                );
            }
        }
        Ok(())
    }

    fn step(&mut self, frame: Option<&HandFrame>) -> MemtreeResult<TickOutput> {
        let now = self.clock.elapsed_ns();
        let output = self.pipeline.tick(frame, now);

        self.stats.ticks += 1;
        if frame.is_some() {
            self.stats.frames += 1;
        }
        self.stats.actions += output.actions.len() as u64;

        self.sink.publish(&output.snapshot)?;
        Ok(output)
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn pipeline(&self) -> &GesturePipeline {
        &self.pipeline
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memtree_gesture_model::gesture::InteractionState;
    use memtree_gesture_model::pose::HandPose;

    const MS: u64 = 1_000_000;

    fn fast() -> DriverConfig {
        DriverConfig { tick_rate_hz: 1000 }
    }

    struct FlakySource {
        polls: u32,
        released: Arc<AtomicBool>,
    }

    impl FrameSource for FlakySource {
        fn poll(&mut self) -> MemtreeResult<Option<HandFrame>> {
            self.polls += 1;
            match self.polls {
                1 => Err(MemtreeError::source("camera hiccup")),
                2 => Ok(Some(HandPose::Pointing.frame(0, 0.5, 0.7))),
                _ => Ok(None),
            }
        }

        fn name(&self) -> &str {
            "flaky"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn is_exhausted(&self) -> bool {
            self.polls >= 4
        }

        fn release(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_replay_runs_to_exhaustion() {
        let frames = vec![
            HandPose::Ok.frame(0, 0.5, 0.7),
            HandPose::Ok.frame(16 * MS, 0.5, 0.7),
            HandPose::Relaxed.frame(32 * MS, 0.5, 0.7),
        ];
        let source = ReplaySource::new(frames).unpaced();
        let (tx, rx) = watch::channel(GesturePipeline::default().snapshot());

        let mut driver = FrameDriver::new(
            Box::new(source),
            GesturePipeline::default(),
            Box::new(tx),
            &fast(),
        );
        let stats = driver.run().await.unwrap();

        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.actions, 1);
        let latest = *rx.borrow();
        assert_eq!(latest.active_index, 1);
        assert_eq!(latest.interaction_state, InteractionState::Idle);
    }

    #[tokio::test]
    async fn test_source_errors_are_skipped_and_source_released() {
        let released = Arc::new(AtomicBool::new(false));
        let source = FlakySource {
            polls: 0,
            released: released.clone(),
        };
        let mut driver = FrameDriver::new(
            Box::new(source),
            GesturePipeline::default(),
            Box::new(Vec::<EngineSnapshot>::new()),
            &fast(),
        );
        let stats = driver.run().await.unwrap();

        // Error tick and empty tick still publish; the fourth poll ends the loop.
        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.source_errors, 1);
        assert!(released.load(Ordering::SeqCst));
        assert_eq!(
            driver.pipeline().snapshot().interaction_state,
            InteractionState::Approaching
        );

        // No processing after teardown.
        assert!(driver.run().await.is_err());
        assert_eq!(driver.stats().ticks, 3);
    }

    #[test]
    fn test_tee_sink_publishes_to_both() {
        let (tx, rx) = watch::channel(GesturePipeline::default().snapshot());
        let mut sink = (tx, Vec::<EngineSnapshot>::new());
        let mut snapshot = GesturePipeline::default().snapshot();
        snapshot.active_index = 4;
        sink.publish(&snapshot).unwrap();
        assert_eq!(rx.borrow().active_index, 4);
        assert_eq!(sink.1.len(), 1);
    }

    #[tokio::test]
    async fn test_stop_flag_ends_live_loop() {
        let (tx, source) = ChannelSource::channel(4);
        let mut driver = FrameDriver::new(
            Box::new(source),
            GesturePipeline::default(),
            Box::new(Vec::<EngineSnapshot>::new()),
            &fast(),
        );
        let stop = driver.stop_flag();

        let producer = tokio::spawn(async move {
            tx.send(HandPose::Fist.frame(0, 0.5, 0.7)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            stop.store(true, Ordering::SeqCst);
            // Keep the sender alive until after the stop so the loop ends on the flag.
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(tx);
        });

        let stats = driver.run().await.unwrap();
        producer.await.unwrap();
        assert!(stats.ticks >= 1);
        assert_eq!(stats.frames, 1);
    }
}
