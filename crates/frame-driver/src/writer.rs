//! Append-only snapshot writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use memtree_common::error::{MemtreeError, MemtreeResult};
use memtree_gesture_model::gesture::{EngineSnapshot, SnapshotStreamHeader};

use crate::SnapshotSink;

/// Flush to disk every this many snapshots.
const FLUSH_EVERY: u64 = 1000;

/// Writes snapshots to a JSONL file, one per tick.
pub struct SnapshotWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    snapshots_written: u64,
}

impl SnapshotWriter {
    /// Create the file and write the header as the first line.
    pub fn new(path: PathBuf, header: &SnapshotStreamHeader) -> MemtreeResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);

        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| MemtreeError::sink(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path,
            snapshots_written: 0,
        })
    }

    pub fn write_snapshot(&mut self, snapshot: &EngineSnapshot) -> MemtreeResult<()> {
        let json = serde_json::to_string(snapshot)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| MemtreeError::sink(format!("Failed to write snapshot: {e}")))?;
        self.snapshots_written += 1;

        if self.snapshots_written % FLUSH_EVERY == 0 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> MemtreeResult<()> {
        self.writer
            .flush()
            .map_err(|e| MemtreeError::sink(format!("Failed to flush snapshots: {e}")))
    }

    pub fn snapshots_written(&self) -> u64 {
        self.snapshots_written
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SnapshotSink for SnapshotWriter {
    fn publish(&mut self, snapshot: &EngineSnapshot) -> MemtreeResult<()> {
        self.write_snapshot(snapshot)
    }

    fn flush(&mut self) -> MemtreeResult<()> {
        SnapshotWriter::flush(self)
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memtree_gesture_model::gesture::{AppState, GestureSignal, InteractionState};

    fn snapshot(t: u64, active_index: usize) -> EngineSnapshot {
        EngineSnapshot {
            timestamp_ns: t,
            app_state: AppState::TreeMode,
            interaction_state: InteractionState::Idle,
            active_index,
            gesture: GestureSignal::inactive(),
        }
    }

    #[test]
    fn test_snapshot_writer_output() {
        let dir = std::env::temp_dir().join("memtree_test_snapshot_writer");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("snapshots.jsonl");
        let header = SnapshotStreamHeader::new("2026-01-01T00:00:00Z", 8, 60);

        {
            let mut writer = SnapshotWriter::new(path.clone(), &header).unwrap();
            writer.write_snapshot(&snapshot(0, 0)).unwrap();
            writer.write_snapshot(&snapshot(16_000_000, 1)).unwrap();
            assert_eq!(writer.snapshots_written(), 2);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        let parsed_header: SnapshotStreamHeader =
            serde_json::from_str(lines[0].strip_prefix("# ").unwrap()).unwrap();
        assert_eq!(parsed_header.item_count, 8);
        assert_eq!(parsed_header.schema_version, "1.0");

        let last: EngineSnapshot = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(last.active_index, 1);
        assert_eq!(last.timestamp_ns, 16_000_000);

        std::fs::remove_dir_all(&dir).ok();
    }
}
