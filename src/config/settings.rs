//! Flat Key-Value Settings
//!
//! The persistence layer stores each profile as a flat JSON object. This
//! module converts between that representation and [`Settings`].
//!
//! | Key | Field | Import rule |
//! |-----|-------|-------------|
//! | `rect_padding` | inner level | snapped to the nearest level |
//! | `outer_gap_level` | outer level | clamped 1-9 |
//! | `blink_threshold_level` | sensitivity | `Low`/`Medium`/`High`, else `Medium` |
//! | `long_blink_threshold` | left-click wink | clamped 0.1-2.0 s |
//! | `double_blink_interval` | double-click gap | clamped 0.1-2.0 s |
//! | `smooth_window_internal` | smoothing window | clamped 1-30 |
//! | `enable_button_sticking` | sticking | bool |
//! | `enable_cursor_highlight` | highlight ring | bool |
//! | `camera_index` | camera | non-negative integer |
//!
//! Import never fails. Legacy and unknown keys are dropped, values of the
//! wrong type fall back to defaults, and both are reported in
//! [`SettingsImport`]. Export always writes every key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::types::EngineConfig;
use super::Config;
use crate::cursor::clamp_window;
use crate::gesture::BlinkSensitivity;
use crate::tracking::{level_for_padding, padding_for_level, MAX_OUTER_LEVEL, MIN_OUTER_LEVEL};

/// Persisted key for the movement area padding (pixels)
pub const KEY_RECT_PADDING: &str = "rect_padding";
/// Persisted key for the click area level
pub const KEY_OUTER_GAP_LEVEL: &str = "outer_gap_level";
/// Persisted key for the eyelid sensitivity
pub const KEY_BLINK_THRESHOLD_LEVEL: &str = "blink_threshold_level";
/// Persisted key for the left-click wink duration
pub const KEY_LONG_BLINK_THRESHOLD: &str = "long_blink_threshold";
/// Persisted key for the double-click interval
pub const KEY_DOUBLE_BLINK_INTERVAL: &str = "double_blink_interval";
/// Persisted key for the smoothing window
pub const KEY_SMOOTH_WINDOW: &str = "smooth_window_internal";
/// Persisted key for control sticking
pub const KEY_ENABLE_STICKING: &str = "enable_button_sticking";
/// Persisted key for the cursor highlight
pub const KEY_ENABLE_HIGHLIGHT: &str = "enable_cursor_highlight";
/// Persisted key for the camera index
pub const KEY_CAMERA_INDEX: &str = "camera_index";

/// Every key written on export
pub const KNOWN_KEYS: &[&str] = &[
    KEY_RECT_PADDING,
    KEY_OUTER_GAP_LEVEL,
    KEY_BLINK_THRESHOLD_LEVEL,
    KEY_LONG_BLINK_THRESHOLD,
    KEY_DOUBLE_BLINK_INTERVAL,
    KEY_SMOOTH_WINDOW,
    KEY_ENABLE_STICKING,
    KEY_ENABLE_HIGHLIGHT,
    KEY_CAMERA_INDEX,
];

/// Keys written by older releases, dropped on import
pub const LEGACY_KEYS: &[&str] = &[
    "cursor_sensitivity_level",
    "cursor_speed_level",
    "cursor_sensitivity",
    "min_speed",
    "max_speed",
    "acceleration",
    "min_speed_factor",
    "max_speed_factor",
    "double_blink_threshold",
];

/// One profile's settings: the engine snapshot plus host-side options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Settings {
    /// Engine configuration
    pub engine: EngineConfig,
    /// Camera device index
    pub camera_index: u32,
    /// Cursor highlight ring
    pub cursor_highlight: bool,
}

/// Result of importing a flat map
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsImport {
    /// Imported settings
    pub settings: Settings,
    /// Legacy or unknown keys that were dropped
    pub dropped_keys: Vec<String>,
    /// Known keys whose values had the wrong type and were defaulted
    pub defaulted_keys: Vec<String>,
}

impl SettingsImport {
    /// Nothing was dropped or defaulted
    pub fn is_clean(&self) -> bool {
        self.dropped_keys.is_empty() && self.defaulted_keys.is_empty()
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

impl Settings {
    /// Settings matching a loaded configuration file
    pub fn from_config(config: &Config) -> Self {
        Self {
            engine: config.engine_config(),
            camera_index: config.tracking.camera_index,
            cursor_highlight: config.tracking.cursor_highlight,
        }
    }

    /// Import a flat map
    pub fn from_map(map: &Map<String, Value>) -> SettingsImport {
        let mut settings = Settings::default();
        let mut dropped_keys = Vec::new();
        let mut defaulted_keys = Vec::new();

        for (key, value) in map {
            let applied = match key.as_str() {
                KEY_RECT_PADDING => as_integer(value).map(|px| {
                    let px = px.clamp(0, i64::from(u32::MAX)) as u32;
                    settings.engine.inner_level = level_for_padding(px);
                }),
                KEY_OUTER_GAP_LEVEL => as_integer(value).map(|level| {
                    settings.engine.outer_level = level
                        .clamp(i64::from(MIN_OUTER_LEVEL), i64::from(MAX_OUTER_LEVEL))
                        as u8;
                }),
                KEY_BLINK_THRESHOLD_LEVEL => value
                    .as_str()
                    .and_then(|s| s.parse::<BlinkSensitivity>().ok())
                    .map(|level| settings.engine.gestures.blink_threshold_level = level),
                KEY_LONG_BLINK_THRESHOLD => as_float(value)
                    .map(|s| settings.engine.gestures.long_blink_threshold = s),
                KEY_DOUBLE_BLINK_INTERVAL => as_float(value)
                    .map(|s| settings.engine.gestures.double_click_interval = s),
                KEY_SMOOTH_WINDOW => as_integer(value).map(|w| {
                    settings.engine.smoothing.window = clamp_window(w.max(0) as usize);
                }),
                KEY_ENABLE_STICKING => {
                    as_bool(value).map(|b| settings.engine.sticking.enabled = b)
                }
                KEY_ENABLE_HIGHLIGHT => as_bool(value).map(|b| settings.cursor_highlight = b),
                KEY_CAMERA_INDEX => as_integer(value).map(|i| {
                    settings.camera_index = i.clamp(0, i64::from(u32::MAX)) as u32;
                }),
                _ => {
                    if LEGACY_KEYS.contains(&key.as_str()) {
                        debug!("Dropping legacy setting {}", key);
                    } else {
                        debug!("Dropping unknown setting {}", key);
                    }
                    dropped_keys.push(key.clone());
                    continue;
                }
            };

            if applied.is_none() {
                warn!("Setting {} has invalid value {}, using default", key, value);
                defaulted_keys.push(key.clone());
            }
        }

        settings.engine.gestures = settings.engine.gestures.normalized();

        SettingsImport {
            settings,
            dropped_keys,
            defaulted_keys,
        }
    }

    /// Export every key
    pub fn to_map(&self) -> Map<String, Value> {
        let engine = &self.engine;
        let mut map = Map::new();
        map.insert(
            KEY_RECT_PADDING.into(),
            Value::from(padding_for_level(engine.inner_level)),
        );
        map.insert(KEY_OUTER_GAP_LEVEL.into(), Value::from(engine.outer_level));
        map.insert(
            KEY_BLINK_THRESHOLD_LEVEL.into(),
            Value::from(engine.gestures.blink_threshold_level.to_string()),
        );
        map.insert(
            KEY_LONG_BLINK_THRESHOLD.into(),
            Value::from(engine.gestures.long_blink_threshold),
        );
        map.insert(
            KEY_DOUBLE_BLINK_INTERVAL.into(),
            Value::from(engine.gestures.double_click_interval),
        );
        map.insert(KEY_SMOOTH_WINDOW.into(), Value::from(engine.smoothing.window));
        map.insert(KEY_ENABLE_STICKING.into(), Value::from(engine.sticking.enabled));
        map.insert(KEY_ENABLE_HIGHLIGHT.into(), Value::from(self.cursor_highlight));
        map.insert(KEY_CAMERA_INDEX.into(), Value::from(self.camera_index));
        map
    }
}

impl From<Map<String, Value>> for Settings {
    fn from(map: Map<String, Value>) -> Self {
        let import = Settings::from_map(&map);
        if !import.dropped_keys.is_empty() {
            debug!("Dropped settings keys: {:?}", import.dropped_keys);
        }
        import.settings
    }
}

impl From<Settings> for Map<String, Value> {
    fn from(settings: Settings) -> Self {
        settings.to_map()
    }
}
