//! Gesture Tutorial
//!
//! A guided walk-through of the three click gestures. The flow only reads
//! [`FrameReport`]s; it never touches gesture detection. Hosts show
//! [`TutorialStep::prompt`], forward every report to
//! [`TutorialFlow::on_report`], and call [`TutorialFlow::next`] when the user
//! confirms an information step.
//!
//! ```text
//! Intro ─next─> WaitingLeft ─Left─> LeftSuccess ─next─> WaitingDouble ─Double─> DoubleSuccess
//!   ─next─> WaitingMiddle ─Middle─> MiddleSuccess ─next─> HighlighterInfo ─next─> ControlsInfo
//!   ─next─> Complete
//!
//! any non-terminal step ─skip─> Skipped
//! ```
//!
//! Tracking must stay off while the tutorial runs, so recognized clicks are
//! reported but never issued.

use tracing::{debug, info};

use crate::engine::FrameReport;
use crate::gesture::{ClickEvent, GestureConfig};

/// One step of the tutorial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TutorialStep {
    /// Welcome and overlay legend
    Intro,
    /// Waiting for a long left wink
    WaitingLeft,
    /// Left click confirmed
    LeftSuccess,
    /// Waiting for two quick blinks
    WaitingDouble,
    /// Double click confirmed
    DoubleSuccess,
    /// Waiting for a held blink
    WaitingMiddle,
    /// Middle click confirmed
    MiddleSuccess,
    /// Cursor highlighter colors
    HighlighterInfo,
    /// Settings overview
    ControlsInfo,
    /// Finished normally
    Complete,
    /// Abandoned by the user
    Skipped,
}

impl TutorialStep {
    /// Click this step is waiting for
    pub fn expected_click(&self) -> Option<ClickEvent> {
        match self {
            Self::WaitingLeft => Some(ClickEvent::Left),
            Self::WaitingDouble => Some(ClickEvent::Double),
            Self::WaitingMiddle => Some(ClickEvent::Middle),
            _ => None,
        }
    }

    /// Step advances on a gesture rather than on confirmation
    pub fn is_waiting(&self) -> bool {
        self.expected_click().is_some()
    }

    /// Tutorial has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Skipped)
    }

    fn successor(&self) -> Option<Self> {
        let next = match self {
            Self::Intro => Self::WaitingLeft,
            Self::WaitingLeft => Self::LeftSuccess,
            Self::LeftSuccess => Self::WaitingDouble,
            Self::WaitingDouble => Self::DoubleSuccess,
            Self::DoubleSuccess => Self::WaitingMiddle,
            Self::WaitingMiddle => Self::MiddleSuccess,
            Self::MiddleSuccess => Self::HighlighterInfo,
            Self::HighlighterInfo => Self::ControlsInfo,
            Self::ControlsInfo => Self::Complete,
            Self::Complete | Self::Skipped => return None,
        };
        Some(next)
    }

    /// Text to show for this step
    pub fn prompt(&self, gestures: &GestureConfig) -> String {
        match self {
            Self::Intro => "Welcome! This tutorial walks through the eye gestures. \
                 Keep your face centered and well lit. The inner box is the movement \
                 area, the outer box is the click area."
                .to_string(),
            Self::WaitingLeft => format!(
                "Step 1: Left click. Close only your left eye for about {:.2}s, \
                 keeping your gaze inside the click area.",
                gestures.long_blink_threshold
            ),
            Self::LeftSuccess => "Success! Left click detected.".to_string(),
            Self::WaitingDouble => format!(
                "Step 2: Double click. Blink both eyes twice, less than {:.2}s apart.",
                gestures.double_click_interval
            ),
            Self::DoubleSuccess => "Great! Double click detected.".to_string(),
            Self::WaitingMiddle => format!(
                "Step 3: Middle click. Close both eyes and hold for about {:.2}s.",
                gestures.middle_hold_duration
            ),
            Self::MiddleSuccess => "Excellent! Middle click detected.".to_string(),
            Self::HighlighterInfo => "Step 4: The ring around the cursor shows the status: \
                 tracking, idle, out of bounds or error."
                .to_string(),
            Self::ControlsInfo => "Step 5: Tracking area, click gap, blink sensitivity, \
                 control sticking and the highlighter can all be adjusted later."
                .to_string(),
            Self::Complete => "Tutorial complete!".to_string(),
            Self::Skipped => "Tutorial skipped.".to_string(),
        }
    }
}

impl std::fmt::Display for TutorialStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Tutorial progress
#[derive(Debug, Clone)]
pub struct TutorialFlow {
    step: TutorialStep,
    gesture_reset_pending: bool,
}

impl TutorialFlow {
    /// Start at the intro
    pub fn new() -> Self {
        Self {
            step: TutorialStep::Intro,
            gesture_reset_pending: false,
        }
    }

    /// Current step
    pub fn step(&self) -> TutorialStep {
        self.step
    }

    /// Tutorial still running
    pub fn is_active(&self) -> bool {
        !self.step.is_terminal()
    }

    /// Confirm an information step
    ///
    /// Returns false on waiting and terminal steps, which do not advance on
    /// confirmation.
    pub fn next(&mut self) -> bool {
        if self.step.is_waiting() {
            return false;
        }
        match self.step.successor() {
            Some(next) => {
                self.enter(next);
                true
            }
            None => false,
        }
    }

    /// Abandon the tutorial
    pub fn skip(&mut self) -> bool {
        if self.step.is_terminal() {
            return false;
        }
        self.enter(TutorialStep::Skipped);
        true
    }

    /// Feed one frame's report; returns true when the step advanced
    pub fn on_report(&mut self, report: &FrameReport) -> bool {
        let (Some(expected), Some(click)) = (self.step.expected_click(), report.click) else {
            return false;
        };
        if click != expected {
            debug!("Tutorial ignoring {} click while waiting for {}", click, expected);
            return false;
        }
        match self.step.successor() {
            Some(next) => {
                self.enter(next);
                true
            }
            None => false,
        }
    }

    /// Gesture timers should be cleared before the user tries the next
    /// gesture; true at most once per waiting step
    pub fn take_gesture_reset(&mut self) -> bool {
        std::mem::take(&mut self.gesture_reset_pending)
    }

    /// Run the tutorial again from the intro
    pub fn restart(&mut self) {
        self.enter(TutorialStep::Intro);
    }

    fn enter(&mut self, step: TutorialStep) {
        info!("Tutorial: {} -> {}", self.step, step);
        self.step = step;
        self.gesture_reset_pending = step.is_waiting();
    }
}

impl Default for TutorialFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Status;

    fn clicked(kind: ClickEvent) -> FrameReport {
        FrameReport {
            status: Status::Idle,
            click: Some(kind),
        }
    }

    #[test]
    fn test_full_walkthrough() {
        let mut flow = TutorialFlow::new();
        assert!(flow.next());
        assert_eq!(flow.step(), TutorialStep::WaitingLeft);
        assert!(flow.take_gesture_reset());
        assert!(!flow.take_gesture_reset());

        assert!(flow.on_report(&clicked(ClickEvent::Left)));
        assert!(flow.next());
        assert!(flow.on_report(&clicked(ClickEvent::Double)));
        assert!(flow.next());
        assert!(flow.on_report(&clicked(ClickEvent::Middle)));
        assert_eq!(flow.step(), TutorialStep::MiddleSuccess);

        assert!(flow.next());
        assert!(flow.next());
        assert!(flow.next());
        assert_eq!(flow.step(), TutorialStep::Complete);
        assert!(!flow.is_active());
        assert!(!flow.next());
    }

    #[test]
    fn test_waiting_step_ignores_other_clicks() {
        let mut flow = TutorialFlow::new();
        flow.next();
        assert!(!flow.on_report(&clicked(ClickEvent::Double)));
        assert!(!flow.on_report(&FrameReport::new(Status::Tracking)));
        assert!(!flow.next());
        assert_eq!(flow.step(), TutorialStep::WaitingLeft);
    }

    #[test]
    fn test_clicks_ignored_on_info_steps() {
        let mut flow = TutorialFlow::new();
        assert!(!flow.on_report(&clicked(ClickEvent::Left)));
        assert_eq!(flow.step(), TutorialStep::Intro);
    }

    #[test]
    fn test_skip_from_anywhere() {
        let mut flow = TutorialFlow::new();
        flow.next();
        assert!(flow.skip());
        assert_eq!(flow.step(), TutorialStep::Skipped);
        assert!(!flow.skip());

        flow.restart();
        assert_eq!(flow.step(), TutorialStep::Intro);
        assert!(flow.is_active());
    }

    #[test]
    fn test_prompt_uses_configured_timing() {
        let mut gestures = GestureConfig::default();
        gestures.long_blink_threshold = 0.5;
        assert!(TutorialStep::WaitingLeft.prompt(&gestures).contains("0.50s"));
    }
}
