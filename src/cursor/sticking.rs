//! Control Sticking
//!
//! Snaps the cursor onto a nearby actionable control and holds it there
//! until the user's gaze clearly moves away.
//!
//! ```text
//!              engage: dist < threshold
//!              and (toward control | barely moving | very close)
//!   Free ───────────────────────────────────────────────> Stuck(anchor)
//!     ^                                                        │
//!     └──────── release: |raw - anchor| > threshold * mult ────┘
//! ```
//!
//! The release distance is larger than the engage distance, so the cursor
//! does not oscillate at the boundary. Control enumeration is rate-limited to
//! one query per check interval. The release test runs on every frame.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use super::smoothing::CursorMotionState;
use crate::config::clamp_setting;
use crate::geometry::{Point, Size};
use crate::platform::{ControlLocator, Result};

/// Default engage distance (pixels)
pub const DEFAULT_STICK_THRESHOLD_PX: f64 = 25.0;
/// Default release distance as a multiple of the engage distance
pub const DEFAULT_RELEASE_MULTIPLIER: f64 = 1.8;
/// Default control search radius (pixels)
pub const DEFAULT_SEARCH_RADIUS_PX: f64 = 100.0;
/// Default interval between control queries (seconds)
pub const DEFAULT_CHECK_INTERVAL_S: f64 = 0.2;

/// Cosine above which intended movement counts as heading toward a control
const TOWARD_COSINE: f64 = -0.1;
/// Intended movement below this is treated as holding still (pixels)
const NEGLIGIBLE_MOVEMENT_PX: f64 = 5.0;
/// Fraction of the threshold within which a control always captures
const CLOSE_CAPTURE_FRACTION: f64 = 0.6;

/// Configuration for control sticking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickingConfig {
    /// Enable sticking (ignored when the platform cannot enumerate controls)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Engage distance (pixels, 1-200)
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Release multiplier (1.0-5.0)
    #[serde(default = "default_release_multiplier")]
    pub release_multiplier: f64,

    /// Control search radius (pixels, 1-1000)
    #[serde(default = "default_search_radius")]
    pub search_radius: f64,

    /// Seconds between control queries (0.05-5.0)
    #[serde(default = "default_check_interval")]
    pub check_interval: f64,
}

fn default_enabled() -> bool {
    true
}
fn default_threshold() -> f64 {
    DEFAULT_STICK_THRESHOLD_PX
}
fn default_release_multiplier() -> f64 {
    DEFAULT_RELEASE_MULTIPLIER
}
fn default_search_radius() -> f64 {
    DEFAULT_SEARCH_RADIUS_PX
}
fn default_check_interval() -> f64 {
    DEFAULT_CHECK_INTERVAL_S
}

impl Default for StickingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            threshold: default_threshold(),
            release_multiplier: default_release_multiplier(),
            search_radius: default_search_radius(),
            check_interval: default_check_interval(),
        }
    }
}

impl StickingConfig {
    /// Clamp every value to its documented range
    pub fn normalized(self) -> Self {
        let finite = |v: f64, d: f64| if v.is_finite() { v } else { d };
        Self {
            enabled: self.enabled,
            threshold: clamp_setting(
                "sticking.threshold",
                finite(self.threshold, DEFAULT_STICK_THRESHOLD_PX),
                1.0,
                200.0,
            ),
            release_multiplier: clamp_setting(
                "sticking.release_multiplier",
                finite(self.release_multiplier, DEFAULT_RELEASE_MULTIPLIER),
                1.0,
                5.0,
            ),
            search_radius: clamp_setting(
                "sticking.search_radius",
                finite(self.search_radius, DEFAULT_SEARCH_RADIUS_PX),
                1.0,
                1000.0,
            ),
            check_interval: clamp_setting(
                "sticking.check_interval",
                finite(self.check_interval, DEFAULT_CHECK_INTERVAL_S),
                0.05,
                5.0,
            ),
        }
    }

    /// Distance from the anchor at which a stick releases
    pub fn release_distance(&self) -> f64 {
        self.threshold * self.release_multiplier
    }
}

/// What the sticking engine decided for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StickOutcome {
    /// Not stuck; the smoothing filter drives the cursor
    Free,
    /// Newly stuck; move the cursor onto the anchor
    Engaged {
        /// Anchor in screen pixels
        anchor: (i32, i32),
    },
    /// Still stuck; suppress filter output
    Holding {
        /// Move back onto the anchor if the cursor wandered off
        enforce: Option<(i32, i32)>,
    },
    /// Stick released this frame; motion history was cleared
    Released,
}

/// Snap-and-hold engine over a [`ControlLocator`]
#[derive(Debug, Clone)]
pub struct StickingEngine {
    config: StickingConfig,
    check_interval: Duration,
    last_check: Option<Instant>,
}

impl StickingEngine {
    /// Create an engine from configuration
    pub fn new(config: &StickingConfig) -> Self {
        let config = config.clone().normalized();
        Self {
            check_interval: Duration::from_secs_f64(config.check_interval),
            config,
            last_check: None,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &StickingConfig {
        &self.config
    }

    /// Turn sticking on or off
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Sticking is configured on
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Release any stick and clear motion history
    ///
    /// Returns true if a stick was released.
    pub fn release(&mut self, state: &mut CursorMotionState) -> bool {
        let was_stuck = state.is_stuck();
        state.set_anchor(None);
        if was_stuck {
            debug!("Stick released");
            state.reset();
        }
        was_stuck
    }

    /// Release and forget the query timer
    pub fn reset(&mut self, state: &mut CursorMotionState) -> bool {
        self.last_check = None;
        self.release(state)
    }

    fn check_due(&self, now: Instant) -> bool {
        self.last_check
            .map_or(true, |last| now.saturating_duration_since(last) > self.check_interval)
    }

    /// Run one frame
    ///
    /// `target` is the user's raw intended screen position, `cursor` the
    /// actual cursor. Fails only when the control query fails, in which case
    /// the state is unchanged and the caller proceeds unstuck.
    pub fn update<L: ControlLocator + ?Sized>(
        &mut self,
        state: &mut CursorMotionState,
        target: Point,
        cursor: Point,
        screen: Size,
        locator: &L,
        now: Instant,
    ) -> Result<StickOutcome> {
        if let Some(anchor) = state.anchor() {
            return Ok(self.hold(state, anchor, target, cursor, screen, now));
        }

        if !self.check_due(now) {
            return Ok(StickOutcome::Free);
        }
        self.last_check = Some(now);

        let control = match locator.find_nearest_actionable_control(cursor, self.config.search_radius)? {
            Some(control) => control,
            None => return Ok(StickOutcome::Free),
        };

        if !self.should_engage(control, target, cursor) {
            return Ok(StickOutcome::Free);
        }

        debug!(
            "Stick engaged at ({:.0}, {:.0}), cursor {:.1}px away",
            control.x,
            control.y,
            cursor.distance_to(control)
        );
        state.set_anchor(Some(control));
        state.reset();
        state.push_history(control);
        state.set_last_targets(target, control);

        Ok(StickOutcome::Engaged {
            anchor: screen.clamp(control).round(),
        })
    }

    fn hold(
        &mut self,
        state: &mut CursorMotionState,
        anchor: Point,
        target: Point,
        cursor: Point,
        screen: Size,
        now: Instant,
    ) -> StickOutcome {
        if target.distance_to(anchor) > self.config.release_distance() {
            self.release(state);
            // Do not re-capture the same control on the next frame
            self.last_check = Some(now);
            return StickOutcome::Released;
        }

        // Keep the intended positions so release hands off smoothly
        state.push_history(target);
        state.set_last_targets(target, anchor);

        let mut enforce = None;
        if self.check_due(now) {
            self.last_check = Some(now);
            if cursor.distance_to(anchor) > 1.0 {
                enforce = Some(screen.clamp(anchor).round());
            }
        }
        StickOutcome::Holding { enforce }
    }

    fn should_engage(&self, control: Point, target: Point, cursor: Point) -> bool {
        let distance = cursor.distance_to(control);
        if distance >= self.config.threshold {
            return false;
        }

        let intended = target - cursor;
        let to_control = control - cursor;
        let intended_len = intended.length();
        let control_len = to_control.length();

        let cosine = if intended_len > 1e-6 && control_len > 1e-6 {
            intended.dot(to_control) / (intended_len * control_len)
        } else {
            0.0
        };

        cosine > TOWARD_COSINE
            || intended_len < NEGLIGIBLE_MOVEMENT_PX
            || distance < self.config.threshold * CLOSE_CAPTURE_FRACTION
    }
}

impl Default for StickingEngine {
    fn default() -> Self {
        Self::new(&StickingConfig::default())
    }
}
