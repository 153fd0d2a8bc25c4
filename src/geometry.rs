//! Geometry Primitives
//!
//! Small value types shared by the tracking region, the smoothing filter and
//! the sticking engine. Camera space and screen space both use these; which
//! space a value lives in is always clear from the owning API.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point (or vector) in pixel space with sub-pixel precision
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a point from integer pixel coordinates
    pub fn from_pixels(x: i32, y: i32) -> Self {
        Self::new(x as f64, y as f64)
    }

    /// Euclidean length when treated as a vector
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (*self - other).length()
    }

    /// Dot product when both points are treated as vectors
    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Round to the nearest integer pixel
    pub fn round(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Width and height of a pixel surface (camera frame or screen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Create a new size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Center point of the surface
    pub fn center(&self) -> Point {
        Point::new((self.width / 2) as f64, (self.height / 2) as f64)
    }

    /// Clamp a point to the addressable pixels `[0, w-1] x [0, h-1]`
    pub fn clamp(&self, point: Point) -> Point {
        let max_x = self.width.saturating_sub(1) as f64;
        let max_y = self.height.saturating_sub(1) as f64;
        Point::new(point.x.clamp(0.0, max_x), point.y.clamp(0.0, max_y))
    }
}

/// Axis-aligned rectangle with inclusive integer edges
///
/// Matches the camera-space convention where a rectangle is described by its
/// left/top/right/bottom pixel columns and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Leftmost column
    pub left: i32,
    /// Topmost row
    pub top: i32,
    /// Rightmost column
    pub right: i32,
    /// Bottom row
    pub bottom: i32,
}

impl Rect {
    /// Create a rectangle from its edges
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Horizontal span (`right - left`)
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Vertical span (`bottom - top`)
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Non-degenerate: positive width and height
    pub fn is_valid(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    /// Inclusive containment test
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.left <= x && x <= self.right && self.top <= y && y <= self.bottom
    }

    /// Shrink by `margin` on every side (may produce an invalid rectangle)
    pub fn inset(&self, margin: i32) -> Rect {
        Rect::new(
            self.left + margin,
            self.top + margin,
            self.right - margin,
            self.bottom - margin,
        )
    }

    /// Every edge of `other` lies strictly inside this rectangle
    pub fn strictly_contains(&self, other: &Rect) -> bool {
        self.left < other.left
            && self.top < other.top
            && self.right > other.right
            && self.bottom > other.bottom
    }
}
