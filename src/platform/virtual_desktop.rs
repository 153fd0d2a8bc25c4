//! In-Memory Desktop
//!
//! A platform implementation with no OS behind it. The session binary drives
//! it when replaying recordings, and the integration tests use it to observe
//! exactly which moves and clicks the engine issued.

use tracing::debug;

use super::controls::{nearest_actionable, ControlInfo};
use super::error::{PlatformError, Result};
use super::{ClickSink, ControlLocator, CursorDevice};
use crate::geometry::{Point, Size};
use crate::gesture::ClickEvent;

/// Simulated screen with a pointer and a click recorder
#[derive(Debug, Clone)]
pub struct VirtualDesktop {
    screen: Size,
    cursor: (i32, i32),
    moves: Vec<(i32, i32)>,
    clicks: Vec<ClickEvent>,
    cursor_query_failing: bool,
}

impl VirtualDesktop {
    /// Create a desktop with the pointer at the screen center
    pub fn new(screen: Size) -> Self {
        let center = screen.center().round();
        Self {
            screen,
            cursor: center,
            moves: Vec::new(),
            clicks: Vec::new(),
            cursor_query_failing: false,
        }
    }

    /// Place the pointer without recording a move
    pub fn warp(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
    }

    /// Current pointer position, independent of failure injection
    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    /// Every move issued so far
    pub fn moves(&self) -> &[(i32, i32)] {
        &self.moves
    }

    /// Every click issued so far
    pub fn clicks(&self) -> &[ClickEvent] {
        &self.clicks
    }

    /// Forget recorded moves and clicks
    pub fn clear_history(&mut self) {
        self.moves.clear();
        self.clicks.clear();
    }

    /// Make cursor position queries fail (simulates compositors that hide it)
    pub fn set_cursor_query_failing(&mut self, failing: bool) {
        self.cursor_query_failing = failing;
    }
}

impl CursorDevice for VirtualDesktop {
    fn cursor_position(&self) -> Result<(i32, i32)> {
        if self.cursor_query_failing {
            return Err(PlatformError::CursorQueryFailed(
                "pointer position hidden".to_string(),
            ));
        }
        Ok(self.cursor)
    }

    fn move_cursor_to(&mut self, x: i32, y: i32) -> Result<()> {
        let clamped = self.screen.clamp(Point::from_pixels(x, y)).round();
        self.cursor = clamped;
        self.moves.push(clamped);
        Ok(())
    }

    fn screen_size(&self) -> Result<Size> {
        Ok(self.screen)
    }
}

impl ClickSink for VirtualDesktop {
    fn issue_click(&mut self, kind: ClickEvent) -> Result<()> {
        debug!("Virtual {} click at {:?}", kind, self.cursor);
        self.clicks.push(kind);
        Ok(())
    }
}

/// Static set of on-screen controls for sticking
#[derive(Debug, Clone, Default)]
pub struct ControlLayout {
    screen: Option<Size>,
    controls: Vec<ControlInfo>,
}

impl ControlLayout {
    /// Create a layout for the given screen
    pub fn new(screen: Size, controls: Vec<ControlInfo>) -> Self {
        Self {
            screen: Some(screen),
            controls,
        }
    }

    /// Add one control
    pub fn push(&mut self, control: ControlInfo) {
        self.controls.push(control);
    }

    /// Controls in the layout
    pub fn controls(&self) -> &[ControlInfo] {
        &self.controls
    }
}

impl ControlLocator for ControlLayout {
    fn is_supported(&self) -> bool {
        self.screen.is_some()
    }

    fn find_nearest_actionable_control(&self, point: Point, radius: f64) -> Result<Option<Point>> {
        let screen = self
            .screen
            .ok_or(PlatformError::Unsupported("control layout without a screen"))?;
        Ok(nearest_actionable(&self.controls, point, radius, screen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::platform::ControlRole;

    #[test]
    fn test_moves_are_clamped_and_recorded() {
        let mut desktop = VirtualDesktop::new(Size::new(800, 600));
        assert_eq!(desktop.cursor(), (400, 300));

        desktop.move_cursor_to(900, -10).unwrap();
        assert_eq!(desktop.cursor(), (799, 0));
        assert_eq!(desktop.moves(), &[(799, 0)]);
    }

    #[test]
    fn test_failing_cursor_query() {
        let mut desktop = VirtualDesktop::new(Size::new(800, 600));
        desktop.set_cursor_query_failing(true);
        assert!(desktop.cursor_position().is_err());
    }

    #[test]
    fn test_layout_locator() {
        let layout = ControlLayout::new(
            Size::new(800, 600),
            vec![ControlInfo::new(ControlRole::Button, Rect::new(90, 90, 110, 110))],
        );
        assert!(layout.is_supported());
        let found = layout
            .find_nearest_actionable_control(Point::new(120.0, 100.0), 50.0)
            .unwrap();
        assert_eq!(found, Some(Point::new(100.0, 100.0)));

        assert!(!ControlLayout::default().is_supported());
    }
}
