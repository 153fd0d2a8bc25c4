//! Adaptive Smoothing Filter
//!
//! Moving-average smoothing with drift correction and speed-adaptive gain.
//! Compensates for landmark jitter without the lag a plain moving average
//! would add.
//!
//! # Model
//!
//! ```text
//! S     = mean(history)                                   smoothed target
//! speed = clamp(|T - T_prev| * ACCEL + MIN, MIN, MAX)     adaptive speed
//! E     = S - C                                           drift
//! scale = min(1 + |E| / 40, 2)                            distance scaling
//! gain  = min(BASE_GAIN * speed * scale, 1)               never overshoots
//! C'    = round(clamp(C + E * gain))
//! ```
//!
//! `T` is the raw screen target for this frame and `C` the actual cursor.
//! Fast gaze jumps raise the speed multiplier so the cursor follows quickly,
//! while slow fine positioning stays damped.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

use crate::config::clamp_setting;
use crate::geometry::{Point, Size};

/// Base responsiveness of the drift controller
pub const BASE_GAIN: f64 = 0.80;
/// Speed multiplier increase per pixel of raw target movement
pub const ACCELERATION: f64 = 0.07;
/// Lower bound of the speed multiplier
pub const MIN_SPEED_FACTOR: f64 = 0.5;
/// Upper bound of the speed multiplier
pub const MAX_SPEED_FACTOR: f64 = 2.4;
/// Drift distance at which distance scaling reaches 2x
pub const DRIFT_DISTANCE_DIVISOR: f64 = 40.0;
/// Maximum distance scaling factor
pub const MAX_DISTANCE_SCALE: f64 = 2.0;

/// Default smoothing window (frames)
pub const DEFAULT_SMOOTHING_WINDOW: usize = 6;
/// Smallest allowed smoothing window
pub const MIN_SMOOTHING_WINDOW: usize = 1;
/// Largest allowed smoothing window
pub const MAX_SMOOTHING_WINDOW: usize = 30;

/// Configuration for the smoothing filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Number of raw targets averaged (1-30)
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_window() -> usize {
    DEFAULT_SMOOTHING_WINDOW
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

impl SmoothingConfig {
    /// Clamp the window to its documented range
    pub fn normalized(self) -> Self {
        Self {
            window: clamp_window(self.window),
        }
    }
}

/// Clamp a smoothing window size, logging when it changes
pub fn clamp_window(window: usize) -> usize {
    clamp_setting(
        "smoothing.window",
        window,
        MIN_SMOOTHING_WINDOW,
        MAX_SMOOTHING_WINDOW,
    )
}

/// Speed multiplier for a raw target step
///
/// Without a previous target the multiplier sits at its minimum.
pub fn speed_multiplier(previous: Option<Point>, current: Point) -> f64 {
    match previous {
        Some(prev) => (current.distance_to(prev) * ACCELERATION + MIN_SPEED_FACTOR)
            .clamp(MIN_SPEED_FACTOR, MAX_SPEED_FACTOR),
        None => MIN_SPEED_FACTOR,
    }
}

/// Distance scaling for a drift magnitude
pub fn distance_scale(drift: f64) -> f64 {
    (1.0 + drift / DRIFT_DISTANCE_DIVISOR).min(MAX_DISTANCE_SCALE)
}

/// Gain applied to the drift vector, capped at 1.0
pub fn compute_gain(speed_multiplier: f64, drift: f64) -> f64 {
    (BASE_GAIN * speed_multiplier * distance_scale(drift)).min(1.0)
}

/// Per-session cursor motion state
///
/// Shared by the smoothing filter and the sticking engine. An anchor is
/// present exactly while the cursor is stuck to a control.
#[derive(Debug, Clone)]
pub struct CursorMotionState {
    history: VecDeque<Point>,
    window: usize,
    last_raw: Option<Point>,
    last_smoothed: Option<Point>,
    speed_multiplier: f64,
    anchor: Option<Point>,
}

impl CursorMotionState {
    /// Create empty state with the given window
    pub fn new(window: usize) -> Self {
        let window = window.clamp(MIN_SMOOTHING_WINDOW, MAX_SMOOTHING_WINDOW);
        Self {
            history: VecDeque::with_capacity(window),
            window,
            last_raw: None,
            last_smoothed: None,
            speed_multiplier: MIN_SPEED_FACTOR,
            anchor: None,
        }
    }

    /// Append a raw target, evicting the oldest beyond the window
    pub fn push_history(&mut self, target: Point) {
        self.history.push_back(target);
        while self.history.len() > self.window {
            self.history.pop_front();
        }
    }

    /// Mean of the buffered targets
    pub fn mean(&self) -> Option<Point> {
        if self.history.is_empty() {
            return None;
        }
        let sum = self
            .history
            .iter()
            .fold(Point::default(), |acc, p| acc + *p);
        Some(sum * (1.0 / self.history.len() as f64))
    }

    /// Clear history and last-target references
    ///
    /// The anchor is left alone; releasing a stick is the sticking engine's
    /// call.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_raw = None;
        self.last_smoothed = None;
        self.speed_multiplier = MIN_SPEED_FACTOR;
    }

    /// Change the window size, resetting history
    pub fn set_window(&mut self, window: usize) {
        self.window = window.clamp(MIN_SMOOTHING_WINDOW, MAX_SMOOTHING_WINDOW);
        self.reset();
    }

    /// Current window size
    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of buffered targets
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Raw target of the previous frame
    pub fn last_raw(&self) -> Option<Point> {
        self.last_raw
    }

    /// Smoothed target of the previous frame
    pub fn last_smoothed(&self) -> Option<Point> {
        self.last_smoothed
    }

    /// Speed multiplier computed on the previous frame
    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Stick anchor, if engaged
    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    /// Cursor is stuck to a control
    pub fn is_stuck(&self) -> bool {
        self.anchor.is_some()
    }

    pub(crate) fn set_anchor(&mut self, anchor: Option<Point>) {
        self.anchor = anchor;
    }

    pub(crate) fn set_last_targets(&mut self, raw: Point, smoothed: Point) {
        self.last_raw = Some(raw);
        self.last_smoothed = Some(smoothed);
    }
}

impl Default for CursorMotionState {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}

/// Result of one filter step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    /// Mean of the history after this frame's target was added
    pub smoothed: Point,
    /// Speed multiplier used
    pub speed_multiplier: f64,
    /// Gain applied to the drift vector
    pub gain: f64,
    /// Rounded, clamped position the cursor should be at
    pub position: (i32, i32),
    /// Move command, present only when the position changed
    pub move_to: Option<(i32, i32)>,
}

/// Drift-correcting moving-average filter
#[derive(Debug, Clone, Default)]
pub struct AdaptiveSmoothingFilter {
    state: CursorMotionState,
}

impl AdaptiveSmoothingFilter {
    /// Create a filter with the given configuration
    pub fn new(config: &SmoothingConfig) -> Self {
        Self {
            state: CursorMotionState::new(config.window),
        }
    }

    /// Motion state
    pub fn state(&self) -> &CursorMotionState {
        &self.state
    }

    /// Mutable motion state (for the sticking engine)
    pub fn state_mut(&mut self) -> &mut CursorMotionState {
        &mut self.state
    }

    /// Change the smoothing window (clears history)
    pub fn set_window(&mut self, window: usize) {
        if window != self.state.window() {
            trace!("Smoothing window {} -> {}", self.state.window(), window);
        }
        self.state.set_window(window);
    }

    /// Clear motion history
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Best estimate of the cursor when the platform cannot report it
    ///
    /// Uses the last smoothed target, else the screen center.
    pub fn fallback_cursor(&self, screen: Size) -> Point {
        self.state
            .last_smoothed()
            .unwrap_or_else(|| screen.center())
    }

    /// Run one frame of the filter
    ///
    /// `target` is the raw screen-space target, `cursor` the actual (or
    /// fallback) cursor position.
    pub fn step(&mut self, target: Point, cursor: Point, screen: Size) -> MotionStep {
        self.state.push_history(target);
        let smoothed = self.state.mean().unwrap_or(target);

        let speed = speed_multiplier(self.state.last_raw(), target);
        let drift = smoothed - cursor;
        let gain = compute_gain(speed, drift.length());

        let position = screen.clamp(cursor + drift * gain).round();
        let current = cursor.round();

        self.state.speed_multiplier = speed;
        self.state.set_last_targets(target, smoothed);

        trace!(
            "Smoothing: target=({:.1}, {:.1}), smoothed=({:.1}, {:.1}), gain={:.3}, next={:?}",
            target.x,
            target.y,
            smoothed.x,
            smoothed.y,
            gain,
            position
        );

        MotionStep {
            smoothed,
            speed_multiplier: speed,
            gain,
            position,
            move_to: (position != current).then_some(position),
        }
    }
}
