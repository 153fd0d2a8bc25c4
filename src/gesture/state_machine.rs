//! Gesture State Machine
//!
//! Timer-driven classification of eye closures. Three timestamps carry all
//! state between frames:
//!
//! ```text
//! left_closed_since      start of a left-only closure in progress
//! both_closed_since      start of a both-eyes closure in progress
//! last_both_closed_end   when the previous both-eyes closure ended
//! ```
//!
//! Both-eyes closures are evaluated on their edges. At the onset, a previous
//! closure that ended within the double-click interval produces `Double`
//! straight away and consumes the pair. At the reopen, a closure held for the
//! middle-hold duration produces `Middle`; a shorter one only records its end
//! time so the next onset can pair with it. Left winks are judged when the
//! left-only closure ends and only if neither both-eyes gesture fired.
//!
//! Every emitted click, every frame without usable eyelid data, and every
//! tracking start/stop clears all timers.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::{BlinkSensitivity, ClickEvent, EyeState};
use crate::config::clamp_setting;

/// Default minimum left-wink duration for a left click (seconds)
pub const DEFAULT_LONG_BLINK_THRESHOLD_S: f64 = 0.27;
/// Default maximum gap between two blinks for a double click (seconds)
pub const DEFAULT_DOUBLE_CLICK_INTERVAL_S: f64 = 0.45;
/// Default minimum both-eyes hold for a middle click (seconds)
pub const DEFAULT_MIDDLE_HOLD_S: f64 = 0.35;

/// Configuration for blink gesture recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Eyelid closure sensitivity preset
    #[serde(default)]
    pub blink_threshold_level: BlinkSensitivity,

    /// Minimum left-wink duration for a left click (seconds, 0.1-2.0)
    #[serde(default = "default_long_blink")]
    pub long_blink_threshold: f64,

    /// Maximum gap between blinks for a double click (seconds, 0.1-2.0)
    #[serde(default = "default_double_interval")]
    pub double_click_interval: f64,

    /// Minimum both-eyes hold for a middle click (seconds, 0.1-3.0)
    #[serde(default = "default_middle_hold")]
    pub middle_hold_duration: f64,
}

fn default_long_blink() -> f64 {
    DEFAULT_LONG_BLINK_THRESHOLD_S
}
fn default_double_interval() -> f64 {
    DEFAULT_DOUBLE_CLICK_INTERVAL_S
}
fn default_middle_hold() -> f64 {
    DEFAULT_MIDDLE_HOLD_S
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            blink_threshold_level: BlinkSensitivity::default(),
            long_blink_threshold: default_long_blink(),
            double_click_interval: default_double_interval(),
            middle_hold_duration: default_middle_hold(),
        }
    }
}

impl GestureConfig {
    /// Clamp every value to its documented range
    pub fn normalized(self) -> Self {
        Self {
            blink_threshold_level: self.blink_threshold_level,
            long_blink_threshold: clamp_setting(
                "gestures.long_blink_threshold",
                finite_or(self.long_blink_threshold, DEFAULT_LONG_BLINK_THRESHOLD_S),
                0.1,
                2.0,
            ),
            double_click_interval: clamp_setting(
                "gestures.double_click_interval",
                finite_or(self.double_click_interval, DEFAULT_DOUBLE_CLICK_INTERVAL_S),
                0.1,
                2.0,
            ),
            middle_hold_duration: clamp_setting(
                "gestures.middle_hold_duration",
                finite_or(self.middle_hold_duration, DEFAULT_MIDDLE_HOLD_S),
                0.1,
                3.0,
            ),
        }
    }

    /// Aperture below which an eye counts as closed
    pub fn closure_threshold(&self) -> f64 {
        self.blink_threshold_level.threshold()
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// The three gesture timestamps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureTimers {
    /// Start of an in-progress left-only closure
    pub left_closed_since: Option<Instant>,
    /// Start of an in-progress both-eyes closure
    pub both_closed_since: Option<Instant>,
    /// End of the most recent both-eyes closure
    pub last_both_closed_end: Option<Instant>,
}

impl GestureTimers {
    /// True when no timer is running
    pub fn is_clear(&self) -> bool {
        self.left_closed_since.is_none()
            && self.both_closed_since.is_none()
            && self.last_both_closed_end.is_none()
    }
}

/// Blink gesture classifier
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    long_blink: Duration,
    double_interval: Duration,
    middle_hold: Duration,
    timers: GestureTimers,
    both_were_closed: bool,
}

impl GestureStateMachine {
    /// Create a classifier from configuration
    pub fn new(config: &GestureConfig) -> Self {
        let mut machine = Self {
            long_blink: Duration::ZERO,
            double_interval: Duration::ZERO,
            middle_hold: Duration::ZERO,
            timers: GestureTimers::default(),
            both_were_closed: false,
        };
        machine.set_config(config);
        machine
    }

    /// Apply new timing configuration (timers are kept)
    pub fn set_config(&mut self, config: &GestureConfig) {
        let config = config.clone().normalized();
        self.long_blink = Duration::from_secs_f64(config.long_blink_threshold);
        self.double_interval = Duration::from_secs_f64(config.double_click_interval);
        self.middle_hold = Duration::from_secs_f64(config.middle_hold_duration);
    }

    /// Current timers
    pub fn timers(&self) -> &GestureTimers {
        &self.timers
    }

    /// Clear all timers and edge state
    pub fn reset(&mut self) {
        if !self.timers.is_clear() {
            trace!("Gesture timers reset");
        }
        self.timers = GestureTimers::default();
        self.both_were_closed = false;
    }

    /// Process one frame of eye state
    ///
    /// Returns at most one click. `click_permitted` is the gaze position's
    /// click-rectangle membership for this frame.
    pub fn update(&mut self, eyes: EyeState, click_permitted: bool, now: Instant) -> Option<ClickEvent> {
        let mut fired = self.update_both_eyes(eyes.both_closed(), click_permitted, now);

        if fired.is_none() {
            fired = self.update_left_eye(eyes, click_permitted, now);
        }

        if let Some(click) = fired {
            debug!("Gesture recognized: {}", click);
            self.timers = GestureTimers::default();
            if click == ClickEvent::Left {
                // The both-eyes closure that ended the wink starts its own timer next frame
                self.both_were_closed = false;
            }
        }

        fired
    }

    fn update_both_eyes(&mut self, both_closed: bool, click_permitted: bool, now: Instant) -> Option<ClickEvent> {
        let was_closed = std::mem::replace(&mut self.both_were_closed, both_closed);

        if both_closed {
            if was_closed {
                return None;
            }

            // Onset: pair with the previous closure if it ended recently
            if let Some(prev_end) = self.timers.last_both_closed_end {
                let gap = now.saturating_duration_since(prev_end);
                if gap <= self.double_interval && click_permitted {
                    return Some(ClickEvent::Double);
                }
            }

            trace!("Both eyes closed");
            self.timers.both_closed_since = Some(now);
            return None;
        }

        // Reopen: judge the hold duration
        let start = self.timers.both_closed_since.take()?;
        let held = now.saturating_duration_since(start);
        trace!("Both eyes reopened after {:?}", held);

        if held >= self.middle_hold && click_permitted {
            self.timers.last_both_closed_end = None;
            return Some(ClickEvent::Middle);
        }

        self.timers.last_both_closed_end = Some(now);
        None
    }

    fn update_left_eye(&mut self, eyes: EyeState, click_permitted: bool, now: Instant) -> Option<ClickEvent> {
        if eyes.left_only_closed() {
            self.timers.left_closed_since.get_or_insert(now);
            return None;
        }

        let start = self.timers.left_closed_since.take()?;
        let held = now.saturating_duration_since(start);
        trace!("Left wink ended after {:?}", held);

        (held >= self.long_blink && click_permitted).then_some(ClickEvent::Left)
    }
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}
