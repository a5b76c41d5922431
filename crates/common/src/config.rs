//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MemtreeError, MemtreeResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Temporal thresholds for the interaction engine.
    pub engine: EngineConfig,

    /// Landmark classifier thresholds.
    pub classifier: ClassifierConfig,

    /// Frame-tick driver settings.
    pub driver: DriverConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Interaction engine timing and swipe thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum time between two committed index changes (ms).
    pub cooldown_ms: u64,

    /// Minimum horizontal wrist travel (normalized) for a swipe.
    pub swipe_distance: f64,

    /// Minimum time span (ms) a swipe must cover; shorter bursts are jitter.
    pub swipe_min_duration_ms: u64,

    /// Capacity of the wrist position history.
    pub swipe_history_capacity: usize,

    /// A swipe is only evaluated once the history holds more than this many samples.
    pub swipe_min_samples: usize,

    /// Delay before the fist "clustering" state reverts to idle (ms).
    pub cluster_revert_ms: u64,

    /// Length of the item list the active index cycles through.
    pub item_count: usize,
}

/// Thresholds used when turning landmarks into gesture flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// How far (normalized y) the index tip must sit above its PIP joint to count as extended.
    pub index_extension_margin: f64,

    /// Maximum thumb-tip to index-tip distance for the OK pinch.
    pub ok_pinch_distance: f64,
}

/// Frame-tick driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Tick cadence (Hz), normally the display refresh rate.
    pub tick_rate_hz: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "memtree=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 600,
            swipe_distance: 0.15,
            swipe_min_duration_ms: 50,
            swipe_history_capacity: 10,
            swipe_min_samples: 5,
            cluster_revert_ms: 800,
            item_count: 8,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            index_extension_margin: 0.05,
            ok_pinch_distance: 0.04,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { tick_rate_hz: 60 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl EngineConfig {
    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> MemtreeResult<()> {
        if self.item_count == 0 {
            return Err(MemtreeError::config("engine.item_count must be at least 1"));
        }
        if self.swipe_history_capacity == 0 {
            return Err(MemtreeError::config(
                "engine.swipe_history_capacity must be at least 1",
            ));
        }
        if self.swipe_min_samples >= self.swipe_history_capacity {
            return Err(MemtreeError::config(format!(
                "engine.swipe_min_samples ({}) must be below swipe_history_capacity ({})",
                self.swipe_min_samples, self.swipe_history_capacity
            )));
        }
        if !(self.swipe_distance.is_finite() && self.swipe_distance > 0.0) {
            return Err(MemtreeError::config(
                "engine.swipe_distance must be a positive number",
            ));
        }
        Ok(())
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> MemtreeResult<()> {
        if !(self.index_extension_margin.is_finite() && self.index_extension_margin >= 0.0) {
            return Err(MemtreeError::config(
                "classifier.index_extension_margin must be a non-negative number",
            ));
        }
        if !(self.ok_pinch_distance.is_finite() && self.ok_pinch_distance > 0.0) {
            return Err(MemtreeError::config(
                "classifier.ok_pinch_distance must be a positive number",
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> MemtreeResult<Self> {
        if !path.exists() {
            return Err(MemtreeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> MemtreeResult<()> {
        self.engine.validate()?;
        self.classifier.validate()?;
        if self.driver.tick_rate_hz == 0 {
            return Err(MemtreeError::config("driver.tick_rate_hz must be at least 1"));
        }
        Ok(())
    }

    /// Save config to the standard location.
    pub fn save(&self) -> MemtreeResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> MemtreeResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("memtree").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = AppConfig::default();
        assert_eq!(config.engine.cooldown_ms, 600);
        assert_eq!(config.engine.swipe_history_capacity, 10);
        assert_eq!(config.engine.swipe_min_samples, 5);
        assert_eq!(config.engine.cluster_revert_ms, 800);
        assert!((config.engine.swipe_distance - 0.15).abs() < 1e-12);
        assert!((config.classifier.ok_pinch_distance - 0.04).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"engine":{"item_count":3}}"#).unwrap();
        assert_eq!(config.engine.item_count, 3);
        assert_eq!(config.engine.cooldown_ms, 600);
        assert_eq!(config.driver.tick_rate_hz, 60);
    }

    #[test]
    fn test_validate_rejects_empty_item_list() {
        let mut config = AppConfig::default();
        config.engine.item_count = 0;
        assert!(matches!(
            config.validate(),
            Err(MemtreeError::Config { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unreachable_swipe_threshold() {
        let mut config = AppConfig::default();
        config.engine.swipe_min_samples = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = std::env::temp_dir().join("memtree_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.engine.item_count = 12;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("memtree_definitely_missing.json");
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(MemtreeError::FileNotFound { .. })
        ));
    }
}
