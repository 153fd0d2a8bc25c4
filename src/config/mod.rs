//! Configuration management
//!
//! Handles loading, validation, and normalization of configuration from:
//! - TOML files
//! - CLI arguments
//! - Flat key-value settings and named profiles (see [`settings`], [`profiles`])
//!
//! Every section and field has a default, so an empty file is a valid
//! configuration. Out-of-range engine values are clamped with a warning
//! rather than rejected; only structurally invalid values are errors.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod error;
pub mod profiles;
pub mod settings;
pub mod types;

pub use error::ConfigError;
pub use profiles::{ProfileSet, DEFAULT_PROFILE};
pub use settings::{Settings, SettingsImport};
pub use types::{ConfigUpdate, EngineConfig, LoggingConfig, SessionConfig, TrackingConfig};

use crate::cursor::{SmoothingConfig, StickingConfig};
use crate::geometry::Size;
use crate::gesture::GestureConfig;

/// Highest supported frame rate
pub const MAX_FRAME_RATE: u32 = 240;

/// Clamp a setting into `[min, max]`, warning when it was out of range
pub fn clamp_setting<T>(name: &str, value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + Display,
{
    let clamped = if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    };

    if clamped != value {
        warn!(
            "{} = {} is outside [{}, {}], using {}",
            name, value, min, max, clamped
        );
    }
    clamped
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tracking area configuration
    #[serde(default)]
    pub tracking: TrackingConfig,
    /// Blink gesture configuration
    #[serde(default)]
    pub gestures: GestureConfig,
    /// Smoothing filter configuration
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    /// Control sticking configuration
    #[serde(default)]
    pub sticking: StickingConfig,
    /// Replay session configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse, normalize and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, the default path if it exists, or defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Per-user config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lamco-gaze-cursor").join("config.toml"))
    }

    /// Clamp every engine value to its documented range
    pub fn normalized(mut self) -> Self {
        let engine = self.engine_config().normalized();
        self.tracking.inner_level = engine.inner_level;
        self.tracking.outer_level = engine.outer_level;
        self.gestures = engine.gestures;
        self.smoothing = engine.smoothing;
        self.sticking = engine.sticking;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        if self.session.frame_rate == 0 || self.session.frame_rate > MAX_FRAME_RATE {
            anyhow::bail!(
                "frame_rate ({}) must be between 1 and {}",
                self.session.frame_rate,
                MAX_FRAME_RATE
            );
        }

        if self.session.screen_width == 0 || self.session.screen_height == 0 {
            anyhow::bail!(
                "Invalid screen size: {}x{}",
                self.session.screen_width,
                self.session.screen_height
            );
        }

        Ok(())
    }

    /// Engine snapshot for the control loop
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            inner_level: self.tracking.inner_level,
            outer_level: self.tracking.outer_level,
            gestures: self.gestures.clone(),
            smoothing: self.smoothing.clone(),
            sticking: self.sticking.clone(),
        }
    }

    /// Adopt a profile's settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.tracking.inner_level = settings.engine.inner_level;
        self.tracking.outer_level = settings.engine.outer_level;
        self.tracking.camera_index = settings.camera_index;
        self.tracking.cursor_highlight = settings.cursor_highlight;
        self.gestures = settings.engine.gestures.clone();
        self.smoothing = settings.engine.smoothing.clone();
        self.sticking = settings.engine.sticking.clone();
    }

    /// Virtual screen size for replay sessions
    pub fn screen_size(&self) -> Size {
        Size::new(self.session.screen_width, self.session.screen_height)
    }

    /// Override config with CLI arguments
    pub fn with_overrides(
        mut self,
        replay: Option<PathBuf>,
        frame_rate: Option<u32>,
        controls: Option<PathBuf>,
    ) -> Self {
        if replay.is_some() {
            self.session.replay = replay;
        }
        if let Some(fps) = frame_rate {
            self.session.frame_rate = fps;
        }
        if controls.is_some() {
            self.session.controls = controls;
        }
        self
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tracking.inner_level, 7);
        assert_eq!(config.session.frame_rate, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let config = Config::from_toml_str(
            r#"
            [tracking]
            inner_level = 50
            outer_level = 0

            [smoothing]
            window = 100

            [gestures]
            long_blink_threshold = 9.5
            "#,
        )
        .unwrap();
        assert_eq!(config.tracking.inner_level, 31);
        assert_eq!(config.tracking.outer_level, 1);
        assert_eq!(config.smoothing.window, 30);
        assert_eq!(config.gestures.long_blink_threshold, 2.0);
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_frame_rate() {
        assert!(Config::from_toml_str("[session]\nframe_rate = 0\n").is_err());
    }

    #[test]
    fn test_unparsable_toml() {
        assert!(Config::from_toml_str("[tracking\ninner_level = 3").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tracking]\ninner_level = 12\n[sticking]\nenabled = false").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.tracking.inner_level, 12);
        assert!(!config.sticking.enabled);
        assert_eq!(config.engine_config().inner_level, 12);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.tracking.outer_level = 5;
        config.session.replay = Some(PathBuf::from("/tmp/session.jsonl"));
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_apply_settings() {
        let mut settings = Settings::default();
        settings.engine.inner_level = 3;
        settings.camera_index = 1;

        let mut config = Config::default();
        config.apply_settings(&settings);
        assert_eq!(config.tracking.inner_level, 3);
        assert_eq!(config.tracking.camera_index, 1);
        assert_eq!(Settings::from_config(&config), settings);
    }

    #[test]
    fn test_clamp_setting() {
        assert_eq!(clamp_setting("x", 5, 1, 3), 3);
        assert_eq!(clamp_setting("x", 0.5, 0.1, 2.0), 0.5);
    }
}
