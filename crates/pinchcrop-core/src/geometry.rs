//! Points, sizes and axis-aligned rectangles.
//!
//! Two coordinate spaces appear throughout the crate:
//!
//! - **Viewport space**: origin at the top-left corner of the crop window,
//!   in layout units. Gesture input and the image bounding rectangle live here.
//! - **Source space**: unscaled pixel coordinates of the loaded image.
//!   [`CropRect`] lives here.

use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points.
    pub fn midpoint(a: Point, b: Point) -> Point {
        Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    /// Euclidean distance between two points.
    pub fn distance(a: Point, b: Point) -> f64 {
        (b.x - a.x).hypot(b.y - a.y)
    }
}

/// Width and height in floating point units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or not finite.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// An axis-aligned rectangle stored by its edges.
///
/// `right >= left` and `bottom >= top` for every rectangle produced by this
/// module; [`Rect::ZERO`] is the empty rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// The empty rectangle `[0, 0, 0, 0]`.
    pub const ZERO: Rect = Rect {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_xywh(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    /// Rectangle of `size` centred on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        Self::from_xywh(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Moves the rectangle by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// True when `self` spans `inner` horizontally, within `tolerance`.
    pub fn covers_x(&self, inner: &Rect, tolerance: f64) -> bool {
        self.left <= inner.left + tolerance && self.right >= inner.right - tolerance
    }

    /// True when `self` spans `inner` vertically, within `tolerance`.
    pub fn covers_y(&self, inner: &Rect, tolerance: f64) -> bool {
        self.top <= inner.top + tolerance && self.bottom >= inner.bottom - tolerance
    }

    /// True when `self` fully contains `inner`, within `tolerance`.
    pub fn covers(&self, inner: &Rect, tolerance: f64) -> bool {
        self.covers_x(inner, tolerance) && self.covers_y(inner, tolerance)
    }
}

/// Axis-aligned intersection of two rectangles.
///
/// Returns [`Rect::ZERO`] when the rectangles do not overlap. Rectangles that
/// only touch along an edge produce a zero-area rectangle on that edge.
/// The result does not depend on argument order.
pub fn get_overlap(a: &Rect, b: &Rect) -> Rect {
    if a.right < b.left || a.bottom < b.top || a.left > b.right || a.top > b.bottom {
        return Rect::ZERO;
    }

    Rect::new(
        a.left.max(b.left),
        a.top.max(b.top),
        a.right.min(b.right),
        a.bottom.min(b.bottom),
    )
}

/// Region of the source image to rasterize, in unscaled source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const EMPTY: CropRect = CropRect {
        left: 0.0,
        top: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A crop rectangle with no area draws nothing.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Clamps the rectangle to `[0, 0] .. [width, height]`.
    pub fn clamp_to(&self, bounds: Size) -> CropRect {
        let left = self.left.clamp(0.0, bounds.width);
        let top = self.top.clamp(0.0, bounds.height);
        let right = (self.left + self.width).clamp(left, bounds.width);
        let bottom = (self.top + self.height).clamp(top, bounds.height);

        CropRect::new(left, top, right - left, bottom - top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_and_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(6.0, 8.0);
        assert_eq!(Point::midpoint(a, b), Point::new(3.0, 4.0));
        assert_eq!(Point::distance(a, b), 10.0);
    }

    #[test]
    fn test_overlap_disjoint_is_zero() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(get_overlap(&a, &b), Rect::ZERO);
        assert_eq!(get_overlap(&b, &a), Rect::ZERO);
    }

    #[test]
    fn test_overlap_partial() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 2.0, 15.0, 8.0);
        let overlap = get_overlap(&a, &b);
        assert_eq!(overlap, Rect::new(5.0, 2.0, 10.0, 8.0));
        assert_eq!(overlap.width(), 5.0);
        assert_eq!(overlap.height(), 6.0);
    }

    #[test]
    fn test_overlap_contained_returns_inner() {
        let outer = Rect::new(-50.0, -10.0, 350.0, 310.0);
        let inner = Rect::new(0.0, 0.0, 300.0, 300.0);
        assert_eq!(get_overlap(&outer, &inner), inner);
        assert_eq!(get_overlap(&inner, &outer), inner);
    }

    #[test]
    fn test_overlap_touching_edge_has_no_area() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        let overlap = get_overlap(&a, &b);
        assert!(overlap.is_empty());
        assert_eq!(overlap.left, 10.0);
    }

    #[test]
    fn test_covers_with_tolerance() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(0.0, 0.0, 100.0 + 1e-12, 100.0);
        assert!(!outer.covers(&inner, 0.0));
        assert!(outer.covers(&inner, 1e-9));
    }

    #[test]
    fn test_covers_axes_are_independent() {
        let outer = Rect::new(-10.0, 5.0, 110.0, 100.0);
        let inner = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.covers_x(&inner, 0.0));
        assert!(!outer.covers_y(&inner, 0.0));
    }

    #[test]
    fn test_crop_rect_clamp() {
        let bounds = Size::new(400.0, 300.0);

        let inside = CropRect::new(50.0, 0.0, 300.0, 300.0);
        assert_eq!(inside.clamp_to(bounds), inside);

        let drifted = CropRect::new(-0.5, 10.0, 400.5, 295.0);
        let clamped = drifted.clamp_to(bounds);
        assert_eq!(clamped, CropRect::new(0.0, 10.0, 400.0, 290.0));
    }

    #[test]
    fn test_crop_rect_clamp_outside_is_degenerate() {
        let bounds = Size::new(100.0, 100.0);
        let outside = CropRect::new(150.0, 150.0, 20.0, 20.0);
        assert!(outside.clamp_to(bounds).is_degenerate());
    }

    #[test]
    fn test_size_is_empty() {
        assert!(Size::new(0.0, 10.0).is_empty());
        assert!(Size::new(f64::NAN, 10.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
