//! Error types shared across Memtree crates.
//!
//! The gesture core never fails: missing hands and ambiguous gestures are
//! ordinary inputs. These errors only surface at the I/O edges (config files,
//! recorded frame files, frame sources, snapshot sinks).

use std::path::PathBuf;

/// Top-level error type for Memtree operations.
#[derive(Debug, thiserror::Error)]
pub enum MemtreeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Frame source error: {message}")]
    Source { message: String },

    #[error("Snapshot sink error: {message}")]
    Sink { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using MemtreeError.
pub type MemtreeResult<T> = Result<T, MemtreeError>;

impl MemtreeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = MemtreeError::config("item_count must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: item_count must be at least 1"
        );

        let err = MemtreeError::FileNotFound {
            path: PathBuf::from("/nope/frames.jsonl"),
        };
        assert!(err.to_string().contains("/nope/frames.jsonl"));
    }

    #[test]
    fn test_io_error_converts() {
        fn open() -> MemtreeResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))?;
            Ok(())
        }
        assert!(matches!(open(), Err(MemtreeError::Io(_))));
    }

    #[test]
    fn test_json_error_converts() {
        fn parse() -> MemtreeResult<serde_json::Value> {
            Ok(serde_json::from_str("{not json")?)
        }
        let err = parse().unwrap_err();
        assert!(matches!(err, MemtreeError::Json(_)));
        assert!(!err.to_string().is_empty());
    }
}
