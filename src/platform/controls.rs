//! Actionable Control Selection
//!
//! Shared filtering used by every window-enumerating backend: given the
//! controls visible on screen, pick the nearest one a user would plausibly
//! want to click. Backgrounds, full-window surfaces, decorations and text
//! fields never qualify.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

/// Smallest side length of a qualifying control (pixels)
pub const MIN_CONTROL_DIMENSION: i32 = 5;

/// Largest fraction of the screen a qualifying control may span per axis
pub const MAX_CONTROL_SCREEN_FRACTION: f64 = 0.80;

/// Role of an on-screen element as reported by the windowing system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlRole {
    /// Push button
    Button,
    /// Check box
    CheckBox,
    /// Radio button
    RadioButton,
    /// Drop-down / combo box
    ComboBox,
    /// List box or list view
    List,
    /// Tree view
    Tree,
    /// Slider / trackbar / spinner
    Slider,
    /// Scroll bar
    ScrollBar,
    /// Hyperlink
    Link,
    /// Tab strip
    Tab,
    /// Toolbar
    Toolbar,
    /// Menu item
    MenuItem,
    /// Static text or label
    Label,
    /// Text input
    TextInput,
    /// Tooltip
    Tooltip,
    /// Status bar
    StatusBar,
    /// Desktop, taskbar, window frame or other chrome
    Decoration,
}

impl ControlRole {
    /// Whether the role is a sticking target at all
    pub fn is_actionable(&self) -> bool {
        !matches!(
            self,
            Self::Label | Self::TextInput | Self::Tooltip | Self::StatusBar | Self::Decoration
        )
    }
}

/// One enumerated on-screen element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlInfo {
    /// Element role
    pub role: ControlRole,
    /// Screen bounds (right/bottom exclusive)
    pub bounds: Rect,
    /// Element is visible
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Element accepts input
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ControlInfo {
    /// Visible, enabled control with the given role and bounds
    pub fn new(role: ControlRole, bounds: Rect) -> Self {
        Self {
            role,
            bounds,
            visible: true,
            enabled: true,
        }
    }

    /// Center of the bounds in integer pixels
    pub fn center(&self) -> (i32, i32) {
        (
            self.bounds.left + self.bounds.width() / 2,
            self.bounds.top + self.bounds.height() / 2,
        )
    }

    /// Size sanity: not a sliver, not a background, on screen
    pub fn has_sane_bounds(&self, screen: Size) -> bool {
        let sw = screen.width as i32;
        let sh = screen.height as i32;
        let w = self.bounds.width();
        let h = self.bounds.height();

        if w < MIN_CONTROL_DIMENSION || h < MIN_CONTROL_DIMENSION {
            return false;
        }
        if self.bounds.right <= 0 || self.bounds.bottom <= 0 {
            return false;
        }
        if self.bounds.left >= sw || self.bounds.top >= sh {
            return false;
        }
        if w as f64 > sw as f64 * MAX_CONTROL_SCREEN_FRACTION
            || h as f64 > sh as f64 * MAX_CONTROL_SCREEN_FRACTION
        {
            return false;
        }

        let (cx, cy) = self.center();
        (0..sw).contains(&cx) && (0..sh).contains(&cy)
    }

    /// Full qualification check for sticking
    pub fn qualifies(&self, screen: Size) -> bool {
        self.visible && self.enabled && self.role.is_actionable() && self.has_sane_bounds(screen)
    }
}

/// Center of the nearest qualifying control within `radius` of `point`
pub fn nearest_actionable<'a, I>(controls: I, point: Point, radius: f64, screen: Size) -> Option<Point>
where
    I: IntoIterator<Item = &'a ControlInfo>,
{
    let radius_sq = radius * radius;

    controls
        .into_iter()
        .filter(|control| control.qualifies(screen))
        .filter_map(|control| {
            let (cx, cy) = control.center();
            let center = Point::from_pixels(cx, cy);
            let delta = center - point;
            let dist_sq = delta.dot(delta);
            (dist_sq <= radius_sq).then_some((center, dist_sq))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(center, _)| center)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Size = Size::new(1920, 1080);

    #[test]
    fn test_background_and_slivers_rejected() {
        let background = ControlInfo::new(ControlRole::Button, Rect::new(0, 0, 1900, 1000));
        assert!(!background.qualifies(SCREEN));

        let sliver = ControlInfo::new(ControlRole::Button, Rect::new(10, 10, 13, 40));
        assert!(!sliver.qualifies(SCREEN));

        let offscreen = ControlInfo::new(ControlRole::Button, Rect::new(2000, 10, 2080, 40));
        assert!(!offscreen.qualifies(SCREEN));
    }

    #[test]
    fn test_non_actionable_roles_rejected() {
        let label = ControlInfo::new(ControlRole::Label, Rect::new(100, 100, 180, 130));
        assert!(!label.qualifies(SCREEN));

        let mut hidden = ControlInfo::new(ControlRole::Button, Rect::new(100, 100, 180, 130));
        hidden.visible = false;
        assert!(!hidden.qualifies(SCREEN));
    }

    #[test]
    fn test_nearest_within_radius() {
        let controls = vec![
            ControlInfo::new(ControlRole::Button, Rect::new(100, 100, 140, 120)), // center (120,110)
            ControlInfo::new(ControlRole::CheckBox, Rect::new(200, 100, 220, 120)), // center (210,110)
        ];

        let found = nearest_actionable(&controls, Point::new(190.0, 110.0), 100.0, SCREEN);
        assert_eq!(found, Some(Point::new(210.0, 110.0)));

        let none = nearest_actionable(&controls, Point::new(800.0, 800.0), 100.0, SCREEN);
        assert_eq!(none, None);
    }
}
