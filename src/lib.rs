//! # lamco-gaze-cursor
//!
//! Gaze-to-cursor control engine: turns a noisy per-frame stream of gaze
//! positions and eyelid apertures into smooth cursor motion and blink
//! clicks.
//!
//! # Architecture
//!
//! ```text
//! LandmarkProvider (camera + face mesh, or a recording)
//!   └─> ControlLoop::tick (one pass per frame)
//!       ├─> TrackingRegion / GazeMapper (movement + click rectangles)
//!       ├─> StickingEngine (snap to nearby controls, optional capability)
//!       ├─> AdaptiveSmoothingFilter (moving average + adaptive drift gain)
//!       └─> GestureStateMachine (left / double / middle blink clicks)
//!   └─> Platform (CursorDevice, ClickSink, ControlLocator)
//!   └─> FrameReport (status + click) ─> UI, TutorialFlow
//! ```
//!
//! # Data Flow
//!
//! **Motion Path:** Landmarks → GazeMapper → StickingEngine → Filter → CursorDevice
//!
//! **Click Path:** Landmarks → EyeState → GestureStateMachine → ClickSink
//!
//! **Config Path:** Settings / Profiles → ConfigUpdate → ConfigHandle → next frame

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration, flat settings and profiles
pub mod config;

/// Smoothing filter and control sticking
pub mod cursor;

/// Per-frame orchestration and status
pub mod engine;

/// Points, sizes and rectangles
pub mod geometry;

/// Blink gesture recognition
pub mod gesture;

/// Landmark frames and providers
pub mod input;

/// Host cursor, click and window-enumeration interfaces
pub mod platform;

/// Movement/click regions and gaze mapping
pub mod tracking;

/// Guided gesture tutorial
pub mod tutorial;

/// Utility functions
pub mod utils;
