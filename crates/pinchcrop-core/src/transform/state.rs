//! The image affine transform and the pure constraint checks over it.
//!
//! # Model
//!
//! The untransformed image is centred on the viewport centre. A point `p`
//! in image-local coordinates (relative to the image centre, unscaled) is
//! drawn at
//!
//! ```text
//! viewport_center + translate + origin + scale * (p - origin)
//! ```
//!
//! so `origin` is the pivot scaling happens around. The visual centre of the
//! image is therefore `viewport_center + translate + origin * (1 - scale)`.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};
use crate::viewport::Viewport;

/// Hard maximum zoom.
pub const MAX_SCALE: f64 = 1.6;

/// Scale multiplier applied on the first two-finger gesture after a load.
pub const INITIAL_ZOOM_NUDGE: f64 = 1.1;

/// Slack allowed when comparing image edges against viewport edges.
pub const EDGE_TOLERANCE: f64 = 1e-9;

/// Uniform scale, translation and pivot of the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self::with_scale(1.0)
    }
}

impl ImageTransform {
    /// A transform with the given scale, no translation and a centred pivot.
    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale_x: scale,
            scale_y: scale,
            translate_x: 0.0,
            translate_y: 0.0,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    /// Current uniform scale.
    pub fn scale(&self) -> f64 {
        self.scale_x
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale_x = scale;
        self.scale_y = scale;
    }

    /// Offset of the image's visual centre from the viewport centre at `scale`.
    pub fn center_offset_at(&self, scale: f64) -> Point {
        Point::new(
            self.translate_x + self.origin_x * (1.0 - scale),
            self.translate_y + self.origin_y * (1.0 - scale),
        )
    }

    /// Bounding rectangle of the image in viewport space, as drawn.
    pub fn image_rect(&self, natural: Size, viewport: &Viewport) -> Rect {
        self.image_rect_at(self.scale(), natural, viewport)
    }

    /// Bounding rectangle the image would have at `scale`, pivot held fixed.
    pub fn image_rect_at(&self, scale: f64, natural: Size, viewport: &Viewport) -> Rect {
        let offset = self.center_offset_at(scale);
        let center = viewport.center();
        Rect::centered(
            Point::new(center.x + offset.x, center.y + offset.y),
            Size::new(natural.width * scale, natural.height * scale),
        )
    }

    /// Image-local point (relative to the image centre) drawn at `point`.
    pub fn viewport_to_local(&self, point: Point, natural: Size, viewport: &Viewport) -> Point {
        let center = self.image_rect(natural, viewport).center();
        let scale = self.scale();
        Point::new((point.x - center.x) / scale, (point.y - center.y) / scale)
    }

    /// Move the pivot to `origin` without changing where the image is drawn.
    pub fn repin(&mut self, origin: Point) {
        let k = 1.0 - self.scale();
        self.translate_x += (self.origin_x - origin.x) * k;
        self.translate_y += (self.origin_y - origin.y) * k;
        self.origin_x = origin.x;
        self.origin_y = origin.y;
    }

    /// Fold the pivot into the translation: same drawing, `origin == 0`.
    pub fn normalized(&self) -> ImageTransform {
        let mut out = *self;
        out.repin(Point::default());
        out
    }
}

/// Minimum scale at which an image of `natural` size covers the viewport.
pub fn cover_fit_scale(viewport: &Viewport, natural: Size) -> f64 {
    let scale_x = viewport.width() / natural.width;
    let scale_y = viewport.height() / natural.height;
    scale_x.max(scale_y)
}

/// True when `image` leaves no gap inside the crop window on any side.
pub fn covers_viewport(image: &Rect, viewport: &Viewport) -> bool {
    image.covers(&viewport.rect(), EDGE_TOLERANCE)
}

/// Shift `transform` the least amount needed for the image to cover the
/// viewport. Axes where the image is narrower than the viewport are centred.
pub fn clamp_translation(transform: &mut ImageTransform, natural: Size, viewport: &Viewport) {
    let image = transform.image_rect(natural, viewport);
    let bounds = viewport.rect();

    transform.translate_x += axis_correction(image.left, image.right, bounds.left, bounds.right);
    transform.translate_y += axis_correction(image.top, image.bottom, bounds.top, bounds.bottom);
}

fn axis_correction(lo: f64, hi: f64, bound_lo: f64, bound_hi: f64) -> f64 {
    if hi - lo < bound_hi - bound_lo {
        return (bound_lo + bound_hi) / 2.0 - (lo + hi) / 2.0;
    }
    if lo > bound_lo {
        bound_lo - lo
    } else if hi < bound_hi {
        bound_hi - hi
    } else {
        0.0
    }
}
