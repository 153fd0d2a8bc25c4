//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::clamp_setting;
use crate::cursor::{clamp_window, SmoothingConfig, StickingConfig};
use crate::gesture::{BlinkSensitivity, GestureConfig};
use crate::tracking::{
    DEFAULT_INNER_LEVEL, DEFAULT_OUTER_LEVEL, MAX_INNER_LEVEL, MAX_OUTER_LEVEL, MIN_INNER_LEVEL,
    MIN_OUTER_LEVEL,
};

/// Tracking area configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Movement area level (1-31, higher = smaller dead zone)
    #[serde(default = "default_inner_level")]
    pub inner_level: u8,

    /// Click area level (1-9, higher = wider click margin)
    #[serde(default = "default_outer_level")]
    pub outer_level: u8,

    /// Camera device index (used by live landmark providers)
    #[serde(default)]
    pub camera_index: u32,

    /// Draw a highlight ring around the cursor (host UI)
    #[serde(default)]
    pub cursor_highlight: bool,
}

fn default_inner_level() -> u8 {
    DEFAULT_INNER_LEVEL
}
fn default_outer_level() -> u8 {
    DEFAULT_OUTER_LEVEL
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            inner_level: default_inner_level(),
            outer_level: default_outer_level(),
            camera_index: 0,
            cursor_highlight: false,
        }
    }
}

/// Replay session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Frames processed per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Virtual screen width
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,

    /// Virtual screen height
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,

    /// Landmark recording (JSON lines)
    #[serde(default)]
    pub replay: Option<PathBuf>,

    /// On-screen controls for sticking (JSON array)
    #[serde(default)]
    pub controls: Option<PathBuf>,

    /// Start with tracking enabled
    #[serde(default = "default_start_tracking")]
    pub start_tracking: bool,
}

fn default_frame_rate() -> u32 {
    30
}
fn default_screen_width() -> u32 {
    1920
}
fn default_screen_height() -> u32 {
    1080
}
fn default_start_tracking() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            replay: None,
            controls: None,
            start_tracking: default_start_tracking(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory (None = console only)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Print a metrics summary when the session ends
    #[serde(default = "default_metrics")]
    pub metrics: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_metrics() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
            metrics: default_metrics(),
        }
    }
}

/// Immutable runtime snapshot used by the control loop
///
/// Replaced as a whole between frames; never mutated mid-frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Movement area level (1-31)
    pub inner_level: u8,
    /// Click area level (1-9)
    pub outer_level: u8,
    /// Blink gesture timing
    pub gestures: GestureConfig,
    /// Smoothing filter
    pub smoothing: SmoothingConfig,
    /// Control sticking
    pub sticking: StickingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inner_level: DEFAULT_INNER_LEVEL,
            outer_level: DEFAULT_OUTER_LEVEL,
            gestures: GestureConfig::default(),
            smoothing: SmoothingConfig::default(),
            sticking: StickingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Clamp every value to its documented range
    pub fn normalized(self) -> Self {
        Self {
            inner_level: clamp_inner_level(self.inner_level),
            outer_level: clamp_outer_level(self.outer_level),
            gestures: self.gestures.normalized(),
            smoothing: self.smoothing.normalized(),
            sticking: self.sticking.normalized(),
        }
    }
}

pub(crate) fn clamp_inner_level(level: u8) -> u8 {
    clamp_setting("tracking.inner_level", level, MIN_INNER_LEVEL, MAX_INNER_LEVEL)
}

pub(crate) fn clamp_outer_level(level: u8) -> u8 {
    clamp_setting("tracking.outer_level", level, MIN_OUTER_LEVEL, MAX_OUTER_LEVEL)
}

/// Partial configuration change sent to a running control loop
///
/// Every field is optional; absent fields keep their current value. Values
/// are clamped when applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    /// New movement area level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_level: Option<u8>,
    /// New click area level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_level: Option<u8>,
    /// New eyelid sensitivity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blink_threshold_level: Option<BlinkSensitivity>,
    /// New left-click wink duration (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_blink_threshold: Option<f64>,
    /// New double-click interval (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_click_interval: Option<f64>,
    /// New smoothing window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing_window: Option<usize>,
    /// Enable or disable sticking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticking_enabled: Option<bool>,
}

impl ConfigUpdate {
    /// Update setting every field from a full configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            inner_level: Some(config.inner_level),
            outer_level: Some(config.outer_level),
            blink_threshold_level: Some(config.gestures.blink_threshold_level),
            long_blink_threshold: Some(config.gestures.long_blink_threshold),
            double_click_interval: Some(config.gestures.double_click_interval),
            smoothing_window: Some(config.smoothing.window),
            sticking_enabled: Some(config.sticking.enabled),
        }
    }

    /// No field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set the movement area level
    pub fn inner_level(mut self, level: u8) -> Self {
        self.inner_level = Some(level);
        self
    }

    /// Set the click area level
    pub fn outer_level(mut self, level: u8) -> Self {
        self.outer_level = Some(level);
        self
    }

    /// Set the eyelid sensitivity
    pub fn blink_threshold_level(mut self, level: BlinkSensitivity) -> Self {
        self.blink_threshold_level = Some(level);
        self
    }

    /// Set the left-click wink duration
    pub fn long_blink_threshold(mut self, seconds: f64) -> Self {
        self.long_blink_threshold = Some(seconds);
        self
    }

    /// Set the double-click interval
    pub fn double_click_interval(mut self, seconds: f64) -> Self {
        self.double_click_interval = Some(seconds);
        self
    }

    /// Set the smoothing window
    pub fn smoothing_window(mut self, window: usize) -> Self {
        self.smoothing_window = Some(window);
        self
    }

    /// Enable or disable sticking
    pub fn sticking_enabled(mut self, enabled: bool) -> Self {
        self.sticking_enabled = Some(enabled);
        self
    }

    /// Merge a later update over this one
    pub fn merge(self, later: ConfigUpdate) -> Self {
        Self {
            inner_level: later.inner_level.or(self.inner_level),
            outer_level: later.outer_level.or(self.outer_level),
            blink_threshold_level: later.blink_threshold_level.or(self.blink_threshold_level),
            long_blink_threshold: later.long_blink_threshold.or(self.long_blink_threshold),
            double_click_interval: later.double_click_interval.or(self.double_click_interval),
            smoothing_window: later.smoothing_window.or(self.smoothing_window),
            sticking_enabled: later.sticking_enabled.or(self.sticking_enabled),
        }
    }

    /// Produce the new snapshot, clamping every supplied value
    pub fn apply(&self, current: &EngineConfig) -> EngineConfig {
        let mut next = current.clone();

        if let Some(level) = self.inner_level {
            next.inner_level = clamp_inner_level(level);
        }
        if let Some(level) = self.outer_level {
            next.outer_level = clamp_outer_level(level);
        }
        if let Some(level) = self.blink_threshold_level {
            next.gestures.blink_threshold_level = level;
        }
        if let Some(seconds) = self.long_blink_threshold {
            next.gestures.long_blink_threshold = seconds;
        }
        if let Some(seconds) = self.double_click_interval {
            next.gestures.double_click_interval = seconds;
        }
        next.gestures = next.gestures.normalized();
        if let Some(window) = self.smoothing_window {
            next.smoothing.window = clamp_window(window);
        }
        if let Some(enabled) = self.sticking_enabled {
            next.sticking.enabled = enabled;
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.inner_level, 7);
        assert_eq!(config.outer_level, 1);
        assert_eq!(config.smoothing.window, 6);
        assert_eq!(config.gestures.long_blink_threshold, 0.27);
    }

    #[test]
    fn test_update_clamps() {
        let update = ConfigUpdate::default()
            .inner_level(40)
            .outer_level(0)
            .long_blink_threshold(0.01)
            .double_click_interval(5.0)
            .smoothing_window(0);
        let next = update.apply(&EngineConfig::default());
        assert_eq!(next.inner_level, 31);
        assert_eq!(next.outer_level, 1);
        assert_eq!(next.gestures.long_blink_threshold, 0.1);
        assert_eq!(next.gestures.double_click_interval, 2.0);
        assert_eq!(next.smoothing.window, 1);
    }

    #[test]
    fn test_empty_update_is_identity() {
        let current = EngineConfig::default();
        let update = ConfigUpdate::default();
        assert!(update.is_empty());
        assert_eq!(update.apply(&current), current);
    }

    #[test]
    fn test_full_update_round_trip() {
        let mut config = EngineConfig::default();
        config.inner_level = 12;
        config.gestures.blink_threshold_level = BlinkSensitivity::High;
        config.sticking.enabled = false;

        let update = ConfigUpdate::from_config(&config);
        assert_eq!(update.apply(&EngineConfig::default()), config);
    }

    #[test]
    fn test_merge_prefers_later() {
        let merged = ConfigUpdate::default()
            .inner_level(3)
            .smoothing_window(4)
            .merge(ConfigUpdate::default().inner_level(9));
        assert_eq!(merged.inner_level, Some(9));
        assert_eq!(merged.smoothing_window, Some(4));
    }
}
