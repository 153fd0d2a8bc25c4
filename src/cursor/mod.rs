//! Cursor Motion
//!
//! Turns a noisy stream of raw screen targets into cursor move commands.
//!
//! # Pipeline
//!
//! ```text
//! raw target T
//!   └─> StickingEngine (if enabled and supported)
//!       ├─> Engaged / Holding: cursor pinned to the control, filter output suppressed
//!       ├─> Released: motion history cleared, continue
//!       └─> Free: continue
//!   └─> AdaptiveSmoothingFilter
//!       ├─> moving average over the last N targets
//!       ├─> speed multiplier from the raw step size
//!       └─> drift correction toward the average, gain <= 1
//! ```
//!
//! Both stages share one [`CursorMotionState`], so a release or an
//! out-of-bounds reset is visible to the filter on the very next frame.

mod smoothing;
mod sticking;

pub use smoothing::{
    clamp_window, compute_gain, distance_scale, speed_multiplier, AdaptiveSmoothingFilter,
    CursorMotionState, MotionStep, SmoothingConfig, ACCELERATION, BASE_GAIN,
    DEFAULT_SMOOTHING_WINDOW, MAX_SMOOTHING_WINDOW, MAX_SPEED_FACTOR, MIN_SMOOTHING_WINDOW,
    MIN_SPEED_FACTOR,
};
pub use sticking::{
    StickOutcome, StickingConfig, StickingEngine, DEFAULT_CHECK_INTERVAL_S,
    DEFAULT_RELEASE_MULTIPLIER, DEFAULT_SEARCH_RADIUS_PX, DEFAULT_STICK_THRESHOLD_PX,
};
