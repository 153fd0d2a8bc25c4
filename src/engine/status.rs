//! Per-frame status and report

use serde::{Deserialize, Serialize};

use crate::gesture::ClickEvent;

/// Discrete status reported once per frame
///
/// Listed from highest to lowest priority: when several conditions hold in
/// one frame, the first one wins. `Tracking` and `OutOfBounds` are mutually
/// exclusive and share a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Camera or landmark provider failed
    NotReady,
    /// No face in the frame
    NoFace,
    /// Face present but the gaze could not be computed
    GazeError,
    /// Tracking region is degenerate for the current frame
    ConfigError,
    /// Gaze inside the movement area, cursor following
    Tracking,
    /// Gaze outside the movement area
    OutOfBounds,
    /// Tracking is switched off
    Idle,
}

impl Status {
    /// Text shown to the user
    pub fn display_text(&self) -> &'static str {
        match self {
            Self::NotReady => "System Not Ready",
            Self::NoFace => "No Face!",
            Self::GazeError => "Gaze Error",
            Self::ConfigError => "Config Error",
            Self::Tracking => "Tracking",
            Self::OutOfBounds => "Out of Bounds",
            Self::Idle => "Idle",
        }
    }

    /// Stable lowercase key for metrics and logs
    pub fn key(&self) -> &'static str {
        match self {
            Self::NotReady => "not_ready",
            Self::NoFace => "no_face",
            Self::GazeError => "gaze_error",
            Self::ConfigError => "config_error",
            Self::Tracking => "tracking",
            Self::OutOfBounds => "out_of_bounds",
            Self::Idle => "idle",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_text())
    }
}

/// What the control loop emits for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Resolved status
    pub status: Status,
    /// Click recognized this frame, issued or not
    pub click: Option<ClickEvent>,
}

impl FrameReport {
    /// Report without a click
    pub fn new(status: Status) -> Self {
        Self {
            status,
            click: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text() {
        assert_eq!(Status::NoFace.to_string(), "No Face!");
        assert_eq!(Status::OutOfBounds.to_string(), "Out of Bounds");
        assert_eq!(Status::NotReady.to_string(), "System Not Ready");
    }

    #[test]
    fn test_keys_are_distinct() {
        let all = [
            Status::NotReady,
            Status::NoFace,
            Status::GazeError,
            Status::ConfigError,
            Status::Tracking,
            Status::OutOfBounds,
            Status::Idle,
        ];
        let keys: std::collections::HashSet<_> = all.iter().map(Status::key).collect();
        assert_eq!(keys.len(), all.len());
    }
}
