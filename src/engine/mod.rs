//! Control Engine
//!
//! The per-frame orchestrator. A host feeds one [`LandmarkFrame`] per camera
//! frame into [`ControlLoop::tick`] and gets back a [`FrameReport`] with the
//! resolved [`Status`] and any recognized click.
//!
//! ```rust
//! use std::time::Instant;
//! use lamco_gaze_cursor::config::EngineConfig;
//! use lamco_gaze_cursor::engine::{ControlLoop, Status};
//! use lamco_gaze_cursor::geometry::{Point, Size};
//! use lamco_gaze_cursor::gesture::EyeApertures;
//! use lamco_gaze_cursor::input::{GazeSample, LandmarkFrame};
//! use lamco_gaze_cursor::platform::VirtualDesktop;
//!
//! let mut engine = ControlLoop::new(VirtualDesktop::new(Size::new(1920, 1080)), EngineConfig::default());
//! engine.start_tracking();
//!
//! let sample = GazeSample::new(
//!     Point::new(0.5, 0.5),
//!     EyeApertures { left: 0.02, right: 0.02 },
//!     Size::new(640, 480),
//!     Instant::now(),
//! );
//! let report = engine.tick(LandmarkFrame::Detected(sample));
//! assert_eq!(report.status, Status::Tracking);
//! ```
//!
//! [`LandmarkFrame`]: crate::input::LandmarkFrame
//!
//! # Threading
//!
//! The loop is single-threaded and owns all session state. The only thing
//! other threads may hold is a [`ConfigHandle`]: updates sent through it are
//! queued and applied atomically before the next frame starts.

mod control_loop;
mod status;

pub use control_loop::{ConfigHandle, ControlLoop};
pub use status::{FrameReport, Status};
