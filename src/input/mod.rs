//! Landmark Input
//!
//! The boundary to the external face-landmark provider. Each camera frame
//! becomes exactly one [`LandmarkFrame`]:
//!
//! | Frame | Meaning | Status |
//! |-------|---------|--------|
//! | `NotReady` | camera or landmark model failed | Not Ready |
//! | `NoFace` | no face in view | No Face |
//! | `Detected` with gaze | usable sample | Tracking / Out of Bounds |
//! | `Detected` without gaze | face found, landmarks insufficient | Gaze Error |
//!
//! Gaze is carried in normalized frame coordinates (`[0,1]`), eyelid
//! apertures in normalized vertical distance. Timestamps are monotonic and
//! drive every timer in the engine, so a replayed recording behaves exactly
//! like the live session it was captured from.
//!
//! # Architecture
//!
//! ```text
//! camera / recording
//!       ↓
//! ┌─────────────────────┐
//! │  LandmarkProvider   │ ← ReplayProvider (JSON lines)
//! └─────────────────────┘
//!       ↓ LandmarkFrame
//! ┌─────────────────────┐
//! │  ControlLoop::tick  │
//! └─────────────────────┘
//! ```

mod error;
mod replay;

pub use error::{LandmarkError, Result};
pub use replay::{RecordedFrame, ReplayProvider, DEFAULT_REPLAY_FRAME_SIZE};

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::geometry::{Point, Size};
use crate::gesture::EyeApertures;

/// Raw landmark positions needed by the engine (normalized frame units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    /// Left iris center
    pub left_iris: Point,
    /// Right iris center
    pub right_iris: Point,
    /// Left eye upper and lower eyelid y
    pub left_lids: (f64, f64),
    /// Right eye upper and lower eyelid y
    pub right_lids: (f64, f64),
}

impl FaceLandmarks {
    /// Gaze point: midpoint of both irises
    pub fn gaze(&self) -> Point {
        (self.left_iris + self.right_iris) * 0.5
    }

    /// Vertical eyelid distances
    pub fn apertures(&self) -> EyeApertures {
        EyeApertures {
            left: (self.left_lids.0 - self.left_lids.1).abs(),
            right: (self.right_lids.0 - self.right_lids.1).abs(),
        }
    }
}

/// One frame's observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    /// Normalized gaze position, absent when landmarks were insufficient
    pub gaze: Option<Point>,
    /// Eyelid apertures, absent when they could not be measured
    pub apertures: Option<EyeApertures>,
    /// Camera frame size in pixels
    pub frame: Size,
    /// Capture time
    pub timestamp: Instant,
}

impl GazeSample {
    /// Sample with both gaze and apertures
    pub fn new(gaze: Point, apertures: EyeApertures, frame: Size, timestamp: Instant) -> Self {
        Self {
            gaze: Some(gaze),
            apertures: Some(apertures),
            frame,
            timestamp,
        }
    }

    /// Build from raw landmarks
    pub fn from_landmarks(landmarks: &FaceLandmarks, frame: Size, timestamp: Instant) -> Self {
        Self::new(landmarks.gaze(), landmarks.apertures(), frame, timestamp)
    }

    /// Gaze in camera pixels: truncated, clamped to the frame
    pub fn pixel_position(&self) -> Option<(i32, i32)> {
        let gaze = self.gaze.filter(|g| g.x.is_finite() && g.y.is_finite())?;
        if self.frame.is_empty() {
            return None;
        }
        let max_x = self.frame.width as i32 - 1;
        let max_y = self.frame.height as i32 - 1;
        let x = (gaze.x * self.frame.width as f64) as i32;
        let y = (gaze.y * self.frame.height as f64) as i32;
        Some((x.clamp(0, max_x), y.clamp(0, max_y)))
    }

    /// Apertures, if present and well-formed
    pub fn valid_apertures(&self) -> Option<EyeApertures> {
        self.apertures.filter(EyeApertures::is_valid)
    }
}

/// What the landmark provider produced for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LandmarkFrame {
    /// Camera or landmark model not available
    NotReady,
    /// No face detected
    NoFace,
    /// Face detected
    Detected(GazeSample),
}

impl LandmarkFrame {
    /// Sample, if a face was detected
    pub fn sample(&self) -> Option<&GazeSample> {
        match self {
            LandmarkFrame::Detected(sample) => Some(sample),
            _ => None,
        }
    }
}

/// Source of landmark frames
///
/// `Ok(None)` means the source is exhausted. Errors are per frame; callers
/// report them as a not-ready frame and keep polling while the error is
/// transient.
pub trait LandmarkProvider {
    /// Produce the next frame
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>>;
}
