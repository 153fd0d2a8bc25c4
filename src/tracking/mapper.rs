//! Gaze Mapping
//!
//! Classifies a camera-space gaze pixel against a [`TrackingRegion`] and, when
//! the gaze is inside the movement rectangle, produces a normalized screen
//! target in `[0, 1] x [0, 1]`.
//!
//! The movement rectangle is shrunk by a fixed edge margin before rescaling so
//! that screen edges and corners are reachable before the gaze hits the literal
//! rectangle edge, where landmark precision is poorest.

use tracing::trace;

use crate::geometry::{Point, Size};
use crate::tracking::region::TrackingRegion;

/// Inward margin applied to the movement rectangle before rescaling (pixels)
pub const EDGE_MAP_MARGIN_PX: i32 = 10;

/// Result of mapping one gaze position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GazeMapping {
    /// No gaze position was available
    NoFace,
    /// The region is degenerate for the current frame; motion must be suppressed
    InvalidRegion,
    /// Outside both rectangles
    OutOfBounds,
    /// Inside the movement rectangle, with the normalized screen target
    InBoundsInner(Point),
    /// Inside the click rectangle only
    InBoundsOuterOnly,
}

impl GazeMapping {
    /// Normalized target when inside the movement rectangle
    pub fn target(&self) -> Option<Point> {
        match self {
            Self::InBoundsInner(target) => Some(*target),
            _ => None,
        }
    }

    /// True when the cursor should follow this sample
    pub fn is_in_movement_bounds(&self) -> bool {
        matches!(self, Self::InBoundsInner(_))
    }
}

/// Mapping outcome plus the click permission flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedGaze {
    /// Bounds classification
    pub mapping: GazeMapping,
    /// Gaze lies within a valid click rectangle
    pub click_permitted: bool,
}

/// Stateless mapper from camera pixels to normalized screen targets
#[derive(Debug, Clone, Copy)]
pub struct GazeMapper {
    edge_margin_px: i32,
}

impl GazeMapper {
    /// Create a mapper with the default edge margin
    pub fn new() -> Self {
        Self {
            edge_margin_px: EDGE_MAP_MARGIN_PX,
        }
    }

    /// Create a mapper with a custom edge margin
    pub fn with_edge_margin(edge_margin_px: i32) -> Self {
        Self {
            edge_margin_px: edge_margin_px.max(0),
        }
    }

    /// Map a gaze pixel position (camera space) against the region
    pub fn map(&self, position: Option<(i32, i32)>, region: &TrackingRegion) -> MappedGaze {
        let Some((x, y)) = position else {
            return MappedGaze {
                mapping: GazeMapping::NoFace,
                click_permitted: false,
            };
        };

        let click_permitted = region.outer_valid() && region.outer.contains(x, y);

        if !region.is_valid() {
            return MappedGaze {
                mapping: GazeMapping::InvalidRegion,
                click_permitted,
            };
        }

        let mapping = if region.inner.contains(x, y) {
            GazeMapping::InBoundsInner(self.normalize(x, y, region))
        } else if click_permitted {
            GazeMapping::InBoundsOuterOnly
        } else {
            GazeMapping::OutOfBounds
        };

        trace!("Gaze ({}, {}) mapped to {:?}", x, y, mapping);

        MappedGaze {
            mapping,
            click_permitted,
        }
    }

    /// Rescale a point inside the movement rectangle to `[0, 1] x [0, 1]`
    fn normalize(&self, x: i32, y: i32, region: &TrackingRegion) -> Point {
        let effective = region.inner.inset(self.edge_margin_px);
        let rect = if effective.is_valid() {
            effective
        } else {
            region.inner
        };

        let nx = (x - rect.left) as f64 / rect.width() as f64;
        let ny = (y - rect.top) as f64 / rect.height() as f64;

        Point::new(nx.clamp(0.0, 1.0), ny.clamp(0.0, 1.0))
    }
}

impl Default for GazeMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale a normalized target to screen pixels, clamped to the screen
pub fn to_screen(normalized: Point, screen: Size) -> Point {
    screen.clamp(Point::new(
        normalized.x * screen.width as f64,
        normalized.y * screen.height as f64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn vga_region() -> TrackingRegion {
        // inner = (170,170)-(470,310), outer = (160,160)-(480,320)
        TrackingRegion::compute(7, 1, Size::new(640, 480))
    }

    #[test]
    fn test_absent_position_is_no_face() {
        let mapped = GazeMapper::new().map(None, &vga_region());
        assert_eq!(mapped.mapping, GazeMapping::NoFace);
        assert!(!mapped.click_permitted);
    }

    #[test]
    fn test_center_maps_to_center() {
        let mapped = GazeMapper::new().map(Some((320, 240)), &vga_region());
        let target = mapped.mapping.target().unwrap();
        assert!((target.x - 0.5).abs() < 1e-9);
        assert!((target.y - 0.5).abs() < 1e-9);
        assert!(mapped.click_permitted);
    }

    #[test]
    fn test_margin_makes_edges_reachable() {
        // 5px inside the inner edge is already past the 10px margin
        let mapped = GazeMapper::new().map(Some((175, 305)), &vga_region());
        assert_eq!(mapped.mapping, GazeMapping::InBoundsInner(Point::new(0.0, 1.0)));
    }

    #[test]
    fn test_outer_only_permits_clicks() {
        let mapped = GazeMapper::new().map(Some((165, 240)), &vga_region());
        assert_eq!(mapped.mapping, GazeMapping::InBoundsOuterOnly);
        assert!(mapped.click_permitted);
    }

    #[test]
    fn test_outside_everything() {
        let mapped = GazeMapper::new().map(Some((10, 10)), &vga_region());
        assert_eq!(mapped.mapping, GazeMapping::OutOfBounds);
        assert!(!mapped.click_permitted);
    }

    #[test]
    fn test_margin_larger_than_rect_falls_back() {
        let mapper = GazeMapper::with_edge_margin(500);
        let mapped = mapper.map(Some((470, 310)), &vga_region());
        assert_eq!(mapped.mapping, GazeMapping::InBoundsInner(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_invalid_region_reports_config_error() {
        let region = TrackingRegion::compute(1, 1, Size::new(320, 240));
        let mapped = GazeMapper::new().map(Some((160, 120)), &region);
        assert_eq!(mapped.mapping, GazeMapping::InvalidRegion);
    }

    #[test]
    fn test_to_screen_clamps() {
        let screen = Size::new(1920, 1080);
        assert_eq!(to_screen(Point::new(1.0, 1.0), screen), Point::new(1919.0, 1079.0));
        assert_eq!(to_screen(Point::new(0.5, 0.0), screen), Point::new(960.0, 0.0));
    }
}
