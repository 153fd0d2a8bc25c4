//! Blink Gesture Recognition
//!
//! Turns per-eye aperture measurements into click gestures:
//!
//! | Gesture | Eyes | Timing | Click |
//! |---------|------|--------|-------|
//! | Long wink | left closed, right open | held >= long blink threshold | Left |
//! | Double blink | both closed twice | second onset within the double interval | Double |
//! | Long blink | both closed | held >= middle hold duration | Middle |
//!
//! Gestures are only honoured while the gaze is inside the click-permitted
//! rectangle. At most one click is produced per frame, with priority
//! Double > Middle > Left.

mod state_machine;

pub use state_machine::{
    GestureConfig, GestureStateMachine, GestureTimers, DEFAULT_DOUBLE_CLICK_INTERVAL_S,
    DEFAULT_LONG_BLINK_THRESHOLD_S, DEFAULT_MIDDLE_HOLD_S,
};

use serde::{Deserialize, Serialize};

/// A click gesture recognized in one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickEvent {
    /// Single left click (long left-eye wink)
    Left,
    /// Left double click (two quick blinks)
    Double,
    /// Middle click (long blink with both eyes)
    Middle,
}

impl ClickEvent {
    /// Stable lowercase name, used for metric keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Double => "double",
            Self::Middle => "middle",
        }
    }
}

impl std::fmt::Display for ClickEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "Left"),
            Self::Double => write!(f, "Double"),
            Self::Middle => write!(f, "Middle"),
        }
    }
}

/// Eyelid sensitivity presets
///
/// Higher sensitivity means a larger aperture still counts as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlinkSensitivity {
    /// Eyes must be almost fully shut
    Low,
    /// Balanced default
    #[default]
    Medium,
    /// Partially closed eyes already count
    High,
}

impl BlinkSensitivity {
    /// Aperture below which an eye is considered closed
    pub fn threshold(&self) -> f64 {
        match self {
            Self::Low => 0.0045,
            Self::Medium => 0.0055,
            Self::High => 0.0065,
        }
    }
}

impl std::fmt::Display for BlinkSensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for BlinkSensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "default" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown blink sensitivity: {}", s)),
        }
    }
}

/// Vertical eyelid distances for one frame (normalized frame units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeApertures {
    /// Left eye aperture
    pub left: f64,
    /// Right eye aperture
    pub right: f64,
}

impl EyeApertures {
    /// Both measurements are finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.left.is_finite() && self.right.is_finite() && self.left >= 0.0 && self.right >= 0.0
    }
}

/// Open/closed state of both eyes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EyeState {
    /// Left eye is closed
    pub left_closed: bool,
    /// Right eye is closed
    pub right_closed: bool,
}

impl EyeState {
    /// Create from explicit flags
    pub const fn new(left_closed: bool, right_closed: bool) -> Self {
        Self {
            left_closed,
            right_closed,
        }
    }

    /// Classify apertures against a closure threshold
    pub fn from_apertures(apertures: EyeApertures, threshold: f64) -> Self {
        Self {
            left_closed: apertures.left < threshold,
            right_closed: apertures.right < threshold,
        }
    }

    /// Both eyes closed
    pub fn both_closed(&self) -> bool {
        self.left_closed && self.right_closed
    }

    /// Left eye closed while the right stays open
    pub fn left_only_closed(&self) -> bool {
        self.left_closed && !self.right_closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitivity_thresholds_ordered() {
        assert!(BlinkSensitivity::Low.threshold() < BlinkSensitivity::Medium.threshold());
        assert!(BlinkSensitivity::Medium.threshold() < BlinkSensitivity::High.threshold());
        assert_eq!("HIGH".parse::<BlinkSensitivity>().unwrap(), BlinkSensitivity::High);
        assert!("extreme".parse::<BlinkSensitivity>().is_err());
    }

    #[test]
    fn test_eye_state_from_apertures() {
        let apertures = EyeApertures {
            left: 0.003,
            right: 0.012,
        };
        let state = EyeState::from_apertures(apertures, BlinkSensitivity::Medium.threshold());
        assert!(state.left_only_closed());
        assert!(!state.both_closed());
    }

    #[test]
    fn test_invalid_apertures() {
        assert!(!EyeApertures {
            left: f64::NAN,
            right: 0.01
        }
        .is_valid());
        assert!(!EyeApertures {
            left: -0.1,
            right: 0.01
        }
        .is_valid());
    }
}
