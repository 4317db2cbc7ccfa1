//! Axis-aligned geometry primitives shared by the page model and the
//! table-detection pipeline.
//!
//! All coordinates are absolute page units (f32). The page origin is
//! top-left: y grows downward, so `y0` is the top edge of a rectangle and
//! `y1` the bottom edge.

use serde::{Deserialize, Serialize};

/// A point in page space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate (grows downward).
    pub y: f32,
}

impl Point {
    /// Create a point from its coordinates.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with top-left corner `(x0, y0)` and bottom-right
/// corner `(x1, y1)`.
///
/// A rectangle is *empty* when `x0 > x1` or `y0 > y1`. Zero-width and
/// zero-height rectangles are NOT empty: a space glyph projects to a
/// zero-height box that must still survive intersection tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x0: f32,
    /// Top edge.
    pub y0: f32,
    /// Right edge.
    pub x1: f32,
    /// Bottom edge.
    pub y1: f32,
}

impl Rect {
    /// The canonical empty rectangle: absorbing under [`union`](Self::union),
    /// annihilating under [`intersect`](Self::intersect).
    pub const EMPTY: Self = Self {
        x0: f32::INFINITY,
        y0: f32::INFINITY,
        x1: f32::NEG_INFINITY,
        y1: f32::NEG_INFINITY,
    };

    /// Create a rectangle from its edges.
    #[inline]
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// True when the rectangle contains no points at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x0 > self.x1 || self.y0 > self.y1
    }

    /// Width of the rectangle (negative when empty).
    #[inline]
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle (negative when empty).
    #[inline]
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Center of the rectangle.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Smallest rectangle covering both `self` and `other`.
    #[inline]
    #[must_use]
    pub fn union(&self, other: Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Largest rectangle covered by both `self` and `other`; empty when the
    /// two do not meet.
    #[inline]
    #[must_use]
    pub fn intersect(&self, other: Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    /// Inclusive point containment.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.x0 <= p.x && p.x <= self.x1 && self.y0 <= p.y && p.y <= self.y1
    }

    /// True when all four edges are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}

impl Default for Rect {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Quadrilateral glyph outline: lower-left, upper-left, lower-right,
/// upper-right corners.
///
/// The engine only consumes the axis-aligned [`bounds`](Self::bounds) of a
/// quad, but the four corners are preserved so hosts can round-trip rotated
/// glyph geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    /// Lower-left corner.
    pub ll: Point,
    /// Upper-left corner.
    pub ul: Point,
    /// Lower-right corner.
    pub lr: Point,
    /// Upper-right corner.
    pub ur: Point,
}

impl Quad {
    /// Axis-aligned quad covering `rect` exactly.
    #[inline]
    #[must_use]
    pub const fn from_rect(rect: Rect) -> Self {
        Self {
            ll: Point::new(rect.x0, rect.y1),
            ul: Point::new(rect.x0, rect.y0),
            lr: Point::new(rect.x1, rect.y1),
            ur: Point::new(rect.x1, rect.y0),
        }
    }

    /// Axis-aligned bounding rectangle of the four corners.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect {
            x0: self.ll.x.min(self.ul.x).min(self.lr.x).min(self.ur.x),
            y0: self.ll.y.min(self.ul.y).min(self.lr.y).min(self.ur.y),
            x1: self.ll.x.max(self.ul.x).max(self.lr.x).max(self.ur.x),
            y1: self.ll.y.max(self.ul.y).max(self.lr.y).max(self.ur.y),
        }
    }

    /// Leftmost x of the glyph's leading edge.
    #[inline]
    #[must_use]
    pub fn left_x(&self) -> f32 {
        self.ll.x.min(self.ul.x)
    }

    /// Rightmost x of the glyph's trailing edge.
    #[inline]
    #[must_use]
    pub fn right_x(&self) -> f32 {
        self.lr.x.max(self.ur.x)
    }

    /// True when all eight coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [self.ll, self.ul, self.lr, self.ur]
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite())
    }
}
