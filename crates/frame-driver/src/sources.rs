//! Frame source backends.
//!
//! - **Replay:** a pre-recorded landmark stream, paced by its own timestamps
//! - **Channel:** frames pushed by an external capture task over a tokio channel

use std::path::Path;
use std::time::Instant;

use memtree_common::error::{MemtreeError, MemtreeResult};
use memtree_gesture_model::frame::{parse_frames, HandFrame, TimestampNs};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::FrameSource;

/// Plays back recorded frames as if they came from a live camera.
///
/// Paced sources release a frame only once the wall time since the first
/// poll has caught up with the frame's offset in the recording. Unpaced
/// sources release one frame per poll.
#[derive(Debug)]
pub struct ReplaySource {
    frames: Vec<HandFrame>,
    cursor: usize,
    looping: bool,
    paced: bool,
    started: Option<Instant>,
    /// Recording time consumed by completed loops.
    loop_offset_ns: TimestampNs,
    loops: u64,
    released: bool,
}

impl ReplaySource {
    pub fn new(frames: Vec<HandFrame>) -> Self {
        Self {
            frames,
            cursor: 0,
            looping: false,
            paced: true,
            started: None,
            loop_offset_ns: 0,
            loops: 0,
            released: false,
        }
    }

    /// Load a JSONL recording.
    pub fn from_file(path: &Path) -> MemtreeResult<Self> {
        if !path.exists() {
            return Err(MemtreeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let frames = parse_frames(&content)?;
        tracing::debug!(path = %path.display(), frames = frames.len(), "Loaded recording");
        Ok(Self::new(frames))
    }

    /// Restart from the first frame when the recording ends.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Release one frame per poll regardless of timestamps.
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of completed passes over the recording.
    pub fn loops(&self) -> u64 {
        self.loops
    }

    fn first_ts(&self) -> TimestampNs {
        self.frames.first().map_or(0, |f| f.timestamp_ns)
    }

    /// Recording span plus one average frame gap, so a loop does not
    /// replay the last and first frames at the same instant.
    fn loop_span_ns(&self) -> TimestampNs {
        let (Some(first), Some(last)) = (self.frames.first(), self.frames.last()) else {
            return 0;
        };
        let span = last.timestamp_ns.saturating_sub(first.timestamp_ns);
        let gaps = (self.frames.len() as u64).saturating_sub(1).max(1);
        span + span / gaps
    }
}

impl FrameSource for ReplaySource {
    fn poll(&mut self) -> MemtreeResult<Option<HandFrame>> {
        if self.released {
            return Err(MemtreeError::source("replay source already released"));
        }
        if self.frames.is_empty() {
            return Ok(None);
        }
        if self.cursor == self.frames.len() {
            if !self.looping {
                return Ok(None);
            }
            self.cursor = 0;
            self.loops += 1;
            self.loop_offset_ns += self.loop_span_ns();
            tracing::debug!(loops = self.loops, "Replay looped");
        }

        if self.paced {
            let started = *self.started.get_or_insert_with(Instant::now);
            let elapsed = started.elapsed().as_nanos() as u64;
            let due = self.loop_offset_ns
                + self.frames[self.cursor]
                    .timestamp_ns
                    .saturating_sub(self.first_ts());
            if elapsed < due {
                return Ok(None);
            }
        }

        let frame = self.frames[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn name(&self) -> &str {
        "replay"
    }

    fn is_available(&self) -> bool {
        !self.released
    }

    fn is_exhausted(&self) -> bool {
        self.released
            || self.frames.is_empty()
            || (!self.looping && self.cursor >= self.frames.len())
    }

    fn release(&mut self) {
        if !self.released {
            tracing::debug!(delivered = self.cursor, "Replay source released");
        }
        self.released = true;
    }
}

/// Frames pushed by an external producer (for example a camera capture task).
///
/// When several frames queued up between two ticks, the newest one wins and
/// the rest are dropped. Once every sender is gone the source is exhausted.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<HandFrame>,
    disconnected: bool,
    dropped: u64,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<HandFrame>) -> Self {
        Self {
            rx,
            disconnected: false,
            dropped: 0,
        }
    }

    /// Create a bounded channel and the source reading from it.
    pub fn channel(buffer: usize) -> (mpsc::Sender<HandFrame>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self::new(rx))
    }

    /// Stale frames skipped in favour of newer ones.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl FrameSource for ChannelSource {
    fn poll(&mut self) -> MemtreeResult<Option<HandFrame>> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(frame) => {
                    if latest.replace(frame).is_some() {
                        self.dropped += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        tracing::debug!("Frame producer disconnected");
                    }
                    self.disconnected = true;
                    break;
                }
            }
        }
        Ok(latest)
    }

    fn name(&self) -> &str {
        "channel"
    }

    fn is_available(&self) -> bool {
        !self.disconnected
    }

    fn is_exhausted(&self) -> bool {
        self.disconnected
    }

    fn release(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memtree_gesture_model::pose::HandPose;

    const MS: u64 = 1_000_000;

    fn frames(n: u64) -> Vec<HandFrame> {
        (0..n)
            .map(|i| HandPose::OpenPalm.frame(i * 16 * MS, 0.5, 0.7))
            .collect()
    }

    #[test]
    fn test_unpaced_replay_yields_every_frame_then_exhausts() {
        let mut source = ReplaySource::new(frames(3)).unpaced();
        for i in 0..3 {
            let frame = source.poll().unwrap().unwrap();
            assert_eq!(frame.timestamp_ns, i * 16 * MS);
        }
        assert!(source.is_exhausted());
        assert!(source.poll().unwrap().is_none());
    }

    #[test]
    fn test_paced_replay_holds_future_frames() {
        let mut recording = frames(1);
        recording.push(HandPose::Fist.frame(60_000 * MS, 0.5, 0.7));
        let mut source = ReplaySource::new(recording);

        // The first frame is due immediately, the second one a minute later.
        assert!(source.poll().unwrap().is_some());
        assert!(source.poll().unwrap().is_none());
        assert!(!source.is_exhausted());
    }

    #[test]
    fn test_looping_replay_never_exhausts() {
        let mut source = ReplaySource::new(frames(2)).unpaced().looping(true);
        for _ in 0..5 {
            assert!(source.poll().unwrap().is_some());
        }
        assert_eq!(source.loops(), 2);
        assert!(!source.is_exhausted());
    }

    #[test]
    fn test_empty_replay_is_exhausted() {
        let mut source = ReplaySource::new(Vec::new()).looping(true);
        assert!(source.is_exhausted());
        assert!(source.poll().unwrap().is_none());
    }

    #[test]
    fn test_released_replay_refuses_to_poll() {
        let mut source = ReplaySource::new(frames(2)).unpaced();
        source.release();
        assert!(source.poll().is_err());
        assert!(source.is_exhausted());
        assert!(!source.is_available());
    }

    #[test]
    fn test_replay_from_missing_file() {
        let err = ReplaySource::from_file(Path::new("/nonexistent/memtree/frames.jsonl"))
            .unwrap_err();
        assert!(matches!(err, MemtreeError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_channel_keeps_newest_frame() {
        let (tx, mut source) = ChannelSource::channel(8);
        for frame in frames(3) {
            tx.send(frame).await.unwrap();
        }
        let frame = source.poll().unwrap().unwrap();
        assert_eq!(frame.timestamp_ns, 32 * MS);
        assert_eq!(source.dropped(), 2);
        assert!(source.poll().unwrap().is_none());
        assert!(!source.is_exhausted());

        drop(tx);
        assert!(source.poll().unwrap().is_none());
        assert!(source.is_exhausted());
    }

    #[tokio::test]
    async fn test_channel_release_closes_producer_side() {
        let (tx, mut source) = ChannelSource::channel(1);
        source.release();
        assert!(tx.send(HandFrame::empty(0)).await.is_err());
    }
}
