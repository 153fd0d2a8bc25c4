//! Tracking Region
//!
//! Derives the two camera-space rectangles that govern gaze tracking from a
//! pair of user-facing levels:
//!
//! ```text
//! ┌──────────── camera frame ────────────┐
//! │   ┌──────── outer (click) ───────┐   │
//! │   │ ┌──── inner (movement) ────┐ │   │
//! │   │ │                          │ │   │
//! │   │ └──────────────────────────┘ │   │
//! │   └──────────────────────────────┘   │
//! └──────────────────────────────────────┘
//! ```
//!
//! The inner rectangle is the frame inset by `padding_px`; higher inner levels
//! mean less padding and therefore a larger movement area. The outer rectangle
//! grows the inner one by `gap_px` and is clamped to the frame.
//!
//! Level/pixel conversions round-trip: settings UIs store pixels and redisplay
//! them as levels, so `padding_for_level(level_for_padding(padding_for_level(l)))`
//! must equal `padding_for_level(l)` for every level.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{Rect, Size};

/// Lowest inner (movement area) level
pub const MIN_INNER_LEVEL: u8 = 1;
/// Highest inner (movement area) level
pub const MAX_INNER_LEVEL: u8 = 31;
/// Padding in pixels at level 1
pub const PAD_AT_LEVEL_1: u32 = 200;
/// Padding in pixels at the highest level
pub const PAD_AT_MAX_LEVEL: u32 = 50;
/// Padding change per level
pub const PAD_LEVEL_STEP_PX: u32 = 5;

/// Lowest outer (click area) level
pub const MIN_OUTER_LEVEL: u8 = 1;
/// Highest outer (click area) level
pub const MAX_OUTER_LEVEL: u8 = 9;
/// Gap in pixels at level 1
pub const GAP_LEVEL_BASE_PX: u32 = 10;
/// Gap change per level
pub const GAP_LEVEL_STEP_PX: u32 = 5;

/// Default inner level (170 px padding)
pub const DEFAULT_INNER_LEVEL: u8 = 7;
/// Default outer level (10 px gap)
pub const DEFAULT_OUTER_LEVEL: u8 = 1;

/// Convert an inner level to padding pixels (level is clamped first)
pub fn padding_for_level(level: u8) -> u32 {
    let level = level.clamp(MIN_INNER_LEVEL, MAX_INNER_LEVEL);
    PAD_AT_LEVEL_1 - u32::from(level - MIN_INNER_LEVEL) * PAD_LEVEL_STEP_PX
}

/// Convert padding pixels to the nearest inner level
///
/// The padding is clamped to `[PAD_AT_MAX_LEVEL, PAD_AT_LEVEL_1]` and snapped
/// to the nearest level step before conversion.
pub fn level_for_padding(padding_px: u32) -> u8 {
    let clamped = padding_px.clamp(PAD_AT_MAX_LEVEL, PAD_AT_LEVEL_1);
    let steps_from_max = ((clamped - PAD_AT_MAX_LEVEL) as f64 / PAD_LEVEL_STEP_PX as f64).round();
    let snapped = steps_from_max as u32 * PAD_LEVEL_STEP_PX + PAD_AT_MAX_LEVEL;
    let level = MIN_INNER_LEVEL as f64 + (PAD_AT_LEVEL_1 - snapped) as f64 / PAD_LEVEL_STEP_PX as f64;
    (level.round() as u8).clamp(MIN_INNER_LEVEL, MAX_INNER_LEVEL)
}

/// Convert an outer level to gap pixels (level is clamped first)
pub fn gap_for_level(level: u8) -> u32 {
    let level = level.clamp(MIN_OUTER_LEVEL, MAX_OUTER_LEVEL);
    GAP_LEVEL_BASE_PX + u32::from(level - MIN_OUTER_LEVEL) * GAP_LEVEL_STEP_PX
}

/// Convert gap pixels to the nearest outer level
pub fn level_for_gap(gap_px: u32) -> u8 {
    let max_gap = gap_for_level(MAX_OUTER_LEVEL);
    let clamped = gap_px.clamp(GAP_LEVEL_BASE_PX, max_gap);
    let level = (clamped - GAP_LEVEL_BASE_PX) as f64 / GAP_LEVEL_STEP_PX as f64 + MIN_OUTER_LEVEL as f64;
    (level.round() as u8).clamp(MIN_OUTER_LEVEL, MAX_OUTER_LEVEL)
}

/// Movement and click rectangles over one camera frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRegion {
    /// Camera frame the region was computed for
    pub frame: Size,
    /// Movement area
    pub inner: Rect,
    /// Click-permitted area
    pub outer: Rect,
    /// Padding used for the inner rectangle
    pub padding_px: u32,
    /// Gap used for the outer rectangle
    pub gap_px: u32,
}

impl TrackingRegion {
    /// Compute the region for the given levels and frame size
    pub fn compute(inner_level: u8, outer_level: u8, frame: Size) -> Self {
        let padding_px = padding_for_level(inner_level);
        let gap_px = gap_for_level(outer_level);
        Self::from_pixels(padding_px, gap_px, frame)
    }

    /// Compute the region from raw pixel padding and gap
    pub fn from_pixels(padding_px: u32, gap_px: u32, frame: Size) -> Self {
        let w = frame.width as i64;
        let h = frame.height as i64;
        let pad = padding_px as i64;
        let gap = gap_px as i64;

        let left = pad.max(0);
        let right = (w - 1).min(w - pad);
        let top = pad.max(0);
        let bottom = (h - 1).min(h - pad);

        let outer_left = (left - gap).max(0);
        let outer_top = (top - gap).max(0);
        let outer_right = (w - 1).min(right + gap);
        let outer_bottom = (h - 1).min(bottom + gap);

        let region = Self {
            frame,
            inner: Rect::new(
                saturate(left),
                saturate(top),
                saturate(right),
                saturate(bottom),
            ),
            outer: Rect::new(
                saturate(outer_left),
                saturate(outer_top),
                saturate(outer_right),
                saturate(outer_bottom),
            ),
            padding_px,
            gap_px,
        };

        trace!(
            "Tracking region for {}x{}: inner={:?} outer={:?}",
            frame.width,
            frame.height,
            region.inner,
            region.outer
        );

        region
    }

    /// Movement rectangle is non-degenerate
    pub fn inner_valid(&self) -> bool {
        !self.frame.is_empty() && self.inner.is_valid()
    }

    /// Click rectangle is non-degenerate
    pub fn outer_valid(&self) -> bool {
        !self.frame.is_empty() && self.outer.is_valid()
    }

    /// Both rectangles are usable
    pub fn is_valid(&self) -> bool {
        self.inner_valid() && self.outer_valid()
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
