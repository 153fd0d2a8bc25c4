//! Platform Boundary
//!
//! The engine never talks to the operating system directly. Everything it
//! needs from the host goes through three small traits:
//!
//! | Trait | Purpose | Required |
//! |-------|---------|----------|
//! | [`CursorDevice`] | read/set the pointer, query screen size | yes |
//! | [`ClickSink`] | inject left/double/middle clicks | yes |
//! | [`ControlLocator`] | find the nearest actionable on-screen control | optional |
//!
//! Platforms without window enumeration use [`NoControlLocator`], which
//! reports itself unsupported and turns control sticking off without any
//! branching inside the filter.
//!
//! All calls may fail; failures are logged by the caller and replaced with a
//! fallback (last known position, screen center, default screen size).

mod controls;
mod error;
mod virtual_desktop;

pub use controls::{
    nearest_actionable, ControlInfo, ControlRole, MAX_CONTROL_SCREEN_FRACTION,
    MIN_CONTROL_DIMENSION,
};
pub use error::{ErrorType, PlatformError, Result};
pub use virtual_desktop::{ControlLayout, VirtualDesktop};

use crate::geometry::{Point, Size};
use crate::gesture::ClickEvent;

/// Screen size used when the platform cannot report one
pub const FALLBACK_SCREEN_SIZE: Size = Size::new(1920, 1080);

/// Pointer access
#[cfg_attr(test, mockall::automock)]
pub trait CursorDevice {
    /// Current pointer position in screen pixels
    fn cursor_position(&self) -> Result<(i32, i32)>;

    /// Warp the pointer to an absolute screen position
    fn move_cursor_to(&mut self, x: i32, y: i32) -> Result<()>;

    /// Size of the primary screen
    fn screen_size(&self) -> Result<Size>;
}

/// Click injection
#[cfg_attr(test, mockall::automock)]
pub trait ClickSink {
    /// Inject one click of the given kind at the current pointer position
    fn issue_click(&mut self, kind: ClickEvent) -> Result<()>;
}

/// Window-enumeration capability used for control sticking
#[cfg_attr(test, mockall::automock)]
pub trait ControlLocator {
    /// Whether this platform can enumerate controls at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Center of the nearest actionable control within `radius` of `point`
    fn find_nearest_actionable_control(&self, point: Point, radius: f64) -> Result<Option<Point>>;
}

/// Locator for platforms without window enumeration
#[derive(Debug, Clone, Copy, Default)]
pub struct NoControlLocator;

impl ControlLocator for NoControlLocator {
    fn is_supported(&self) -> bool {
        false
    }

    fn find_nearest_actionable_control(&self, _point: Point, _radius: f64) -> Result<Option<Point>> {
        Ok(None)
    }
}

/// Query the screen size, falling back to [`FALLBACK_SCREEN_SIZE`]
pub fn screen_size_or_fallback<C: CursorDevice + ?Sized>(device: &C) -> Size {
    match device.screen_size() {
        Ok(size) if !size.is_empty() => size,
        Ok(size) => {
            tracing::warn!(
                "{}, using fallback {}x{}",
                PlatformError::InvalidScreenSize(size.width, size.height),
                FALLBACK_SCREEN_SIZE.width,
                FALLBACK_SCREEN_SIZE.height
            );
            FALLBACK_SCREEN_SIZE
        }
        Err(e) => {
            tracing::warn!(
                "{}, using fallback {}x{}",
                e,
                FALLBACK_SCREEN_SIZE.width,
                FALLBACK_SCREEN_SIZE.height
            );
            FALLBACK_SCREEN_SIZE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_locator_is_unsupported() {
        let locator = NoControlLocator;
        assert!(!locator.is_supported());
        assert!(locator
            .find_nearest_actionable_control(Point::new(1.0, 1.0), 100.0)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_screen_size_fallback_on_error() {
        let mut device = MockCursorDevice::new();
        device
            .expect_screen_size()
            .returning(|| Err(PlatformError::ScreenSizeUnavailable("headless".into())));
        assert_eq!(screen_size_or_fallback(&device), FALLBACK_SCREEN_SIZE);
    }

    #[test]
    fn test_screen_size_fallback_on_degenerate() {
        let mut device = MockCursorDevice::new();
        device.expect_screen_size().returning(|| Ok(Size::new(0, 1080)));
        assert_eq!(screen_size_or_fallback(&device), FALLBACK_SCREEN_SIZE);
    }
}
