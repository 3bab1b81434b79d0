//! The dimmed overlay drawn over the stage, with the crop window cut out.
//!
//! The overlay is stage-sized: black at [`COVER_ALPHA`] everywhere except the
//! crop window, which is fully transparent, and a dashed white outline along
//! the window edge. Circular viewports get a circular window inset by
//! [`CIRCLE_INSET`].

use std::f64::consts::TAU;

use crate::decode::DecodedImage;
use crate::geometry::{Point, Rect};
use crate::viewport::{Stage, Viewport};

/// Overlay opacity (0.83).
pub const COVER_ALPHA: u8 = 212;

/// Outline stroke width.
pub const OUTLINE_WIDTH: f64 = 4.0;

/// Dash and gap length of the outline.
pub const DASH_LENGTH: f64 = 16.0;

/// Radius reduction for circular windows, so the outline fits inside.
pub const CIRCLE_INSET: f64 = 4.0;

const DIMMED: [u8; 4] = [0, 0, 0, COVER_ALPHA];
const CLEAR: [u8; 4] = [0, 0, 0, 0];
const OUTLINE: [u8; 4] = [255, 255, 255, 255];

/// Window shape in stage coordinates.
#[derive(Debug, Clone, Copy)]
enum Window {
    Rect(Rect),
    Circle { center: Point, radius: f64 },
}

impl Window {
    fn for_stage(stage: &Stage, viewport: &Viewport) -> Self {
        let offset = stage.viewport_offset(viewport);
        if viewport.is_circular() {
            Window::Circle {
                center: Point::new(stage.width / 2.0, stage.height / 2.0),
                radius: (viewport.width() / 2.0 - CIRCLE_INSET).max(0.0),
            }
        } else {
            Window::Rect(Rect::from_xywh(
                offset.x,
                offset.y,
                viewport.width(),
                viewport.height(),
            ))
        }
    }

    fn contains(&self, p: Point) -> bool {
        match *self {
            Window::Rect(r) => p.x >= r.left && p.x < r.right && p.y >= r.top && p.y < r.bottom,
            Window::Circle { center, radius } => Point::distance(p, center) <= radius,
        }
    }

    /// Distance from `p` to the outline, and the arc length along the outline
    /// of the nearest point (measured from where a canvas path starts).
    fn outline_position(&self, p: Point) -> (f64, f64) {
        match *self {
            Window::Rect(r) => rect_outline_position(&r, p),
            Window::Circle { center, radius } => {
                let distance = (Point::distance(p, center) - radius).abs();
                let angle = (p.y - center.y).atan2(p.x - center.x).rem_euclid(TAU);
                (distance, angle * radius)
            }
        }
    }
}

/// Render the overlay for `viewport` centred in `stage`.
///
/// Stage dimensions are truncated to whole pixels.
pub fn render_cover(stage: &Stage, viewport: &Viewport) -> DecodedImage {
    let width = stage.width.floor().max(0.0) as u32;
    let height = stage.height.floor().max(0.0) as u32;
    let window = Window::for_stage(stage, viewport);
    let half_stroke = OUTLINE_WIDTH / 2.0;

    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let (distance, arc) = window.outline_position(p);

            let color = if distance <= half_stroke && dash_on(arc) {
                OUTLINE
            } else if window.contains(p) {
                CLEAR
            } else {
                DIMMED
            };
            pixels.extend_from_slice(&color);
        }
    }

    DecodedImage::new(width, height, pixels)
}

fn dash_on(arc: f64) -> bool {
    arc.rem_euclid(DASH_LENGTH * 2.0) < DASH_LENGTH
}

/// Nearest point on a rectangle outline traversed clockwise from top-left.
fn rect_outline_position(r: &Rect, p: Point) -> (f64, f64) {
    let corners = [
        Point::new(r.left, r.top),
        Point::new(r.right, r.top),
        Point::new(r.right, r.bottom),
        Point::new(r.left, r.bottom),
    ];

    let mut best = (f64::INFINITY, 0.0);
    let mut travelled = 0.0;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let length = Point::distance(a, b);
        let along = if length > 0.0 {
            (((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / length).clamp(0.0, length)
        } else {
            0.0
        };
        let nearest = if length > 0.0 {
            Point::new(
                a.x + (b.x - a.x) * along / length,
                a.y + (b.y - a.y) * along / length,
            )
        } else {
            a
        };

        let distance = Point::distance(p, nearest);
        if distance < best.0 {
            best = (distance, travelled + along);
        }
        travelled += length;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_setup(circular: bool) -> DecodedImage {
        let stage = Stage::new(200.0, 200.0).unwrap();
        let viewport = Viewport::new(100.0, 100.0, 1.0, circular).unwrap();
        render_cover(&stage, &viewport)
    }

    #[test]
    fn test_cover_size_matches_stage() {
        let stage = Stage::new(320.5, 240.0).unwrap();
        let viewport = Viewport::new(100.0, 80.0, 1.0, false).unwrap();
        let cover = render_cover(&stage, &viewport);
        assert_eq!((cover.width, cover.height), (320, 240));
    }

    #[test]
    fn test_window_is_clear_and_outside_dimmed() {
        let cover = square_setup(false);
        assert_eq!(cover.pixel(100, 100), Some(CLEAR));
        assert_eq!(cover.pixel(0, 0), Some(DIMMED));
        assert_eq!(cover.pixel(199, 199), Some(DIMMED));
    }

    #[test]
    fn test_rect_outline_is_dashed() {
        let cover = square_setup(false);
        // Just above the top edge, 2.5 units along the path: dash.
        assert_eq!(cover.pixel(52, 49), Some(OUTLINE));
        // 20.5 units along: gap, so the underlying overlay shows.
        assert_eq!(cover.pixel(70, 49), Some(DIMMED));
        assert_eq!(cover.pixel(70, 50), Some(CLEAR));
    }

    #[test]
    fn test_circle_window() {
        let cover = square_setup(true);
        assert_eq!(cover.pixel(100, 100), Some(CLEAR));
        // Inside the square but outside the inset circle.
        assert_eq!(cover.pixel(52, 52), Some(DIMMED));
        // Rightmost point of the circle, at the start of the path: dash.
        assert_eq!(cover.pixel(145, 99), Some(OUTLINE));
    }

    #[test]
    fn test_dash_pattern() {
        assert!(dash_on(0.0));
        assert!(dash_on(15.9));
        assert!(!dash_on(16.0));
        assert!(!dash_on(31.9));
        assert!(dash_on(32.0));
    }

    #[test]
    fn test_stage_fitting_viewport_has_no_dimmed_interior() {
        let viewport = Viewport::new(64.0, 48.0, 1.0, false).unwrap();
        let cover = render_cover(&Stage::fitting(&viewport), &viewport);
        assert!(cover.pixels.chunks(4).all(|px| px != DIMMED));
    }
}
