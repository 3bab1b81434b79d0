//! Applies gesture events to the image transform under the crop constraints.

use tracing::{debug, trace};

use super::state::{
    clamp_translation, cover_fit_scale, covers_viewport, ImageTransform, EDGE_TOLERANCE,
    INITIAL_ZOOM_NUDGE, MAX_SCALE,
};
use crate::geometry::{get_overlap, CropRect, Point, Rect, Size};
use crate::gesture::GestureListener;
use crate::viewport::Viewport;

/// Which axes of a pan were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanOutcome {
    pub x: bool,
    pub y: bool,
}

/// Owner of the [`ImageTransform`].
///
/// Every accepted mutation keeps the image covering the crop window and the
/// scale within `[origin_scale, MAX_SCALE]`. Rejected gestures leave the
/// transform untouched.
#[derive(Debug, Clone)]
pub struct TransformController {
    viewport: Viewport,
    natural: Option<Size>,
    transform: ImageTransform,
    /// Cover-fit scale; the minimum allowed.
    origin_scale: f64,
    /// Scale at the last gesture start; pinch ratios multiply this.
    baseline_scale: f64,
    has_bumped_initial_zoom: bool,
}

impl TransformController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            natural: None,
            transform: ImageTransform::default(),
            origin_scale: 1.0,
            baseline_scale: 1.0,
            has_bumped_initial_zoom: false,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn transform(&self) -> &ImageTransform {
        &self.transform
    }

    /// Natural size of the loaded image, if any.
    pub fn natural_size(&self) -> Option<Size> {
        self.natural
    }

    pub fn is_loaded(&self) -> bool {
        self.natural.is_some()
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale()
    }

    pub fn origin_scale(&self) -> f64 {
        self.origin_scale
    }

    /// Initialize for a freshly loaded image with cover-fit scale.
    ///
    /// Resets translation, pivot and the one-shot initial zoom nudge, so a
    /// controller can be reused across images. Empty sizes are ignored.
    pub fn on_image_loaded(&mut self, natural_width: u32, natural_height: u32) {
        let natural = Size::new(natural_width as f64, natural_height as f64);
        if natural.is_empty() {
            debug!(natural_width, natural_height, "ignoring empty image");
            return;
        }

        let scale = cover_fit_scale(&self.viewport, natural);
        self.natural = Some(natural);
        self.transform = ImageTransform::with_scale(scale);
        self.origin_scale = scale;
        self.baseline_scale = scale;
        self.has_bumped_initial_zoom = false;
        debug!(natural_width, natural_height, scale, "image loaded");
    }

    /// Current image bounding rectangle in viewport space.
    pub fn image_rect(&self) -> Rect {
        match self.natural {
            Some(natural) => self.transform.image_rect(natural, &self.viewport),
            None => Rect::ZERO,
        }
    }

    /// Re-pin the pivot under `midpoint` (viewport space).
    ///
    /// The image does not move on screen. The first call after each load
    /// also nudges the scale up by [`INITIAL_ZOOM_NUDGE`].
    pub fn gesture_start(&mut self, midpoint: Point) {
        let Some(natural) = self.natural else {
            return;
        };

        let pivot = self
            .transform
            .viewport_to_local(midpoint, natural, &self.viewport);
        self.transform.repin(pivot);

        if !self.has_bumped_initial_zoom {
            self.has_bumped_initial_zoom = true;
            let nudged = (self.origin_scale * INITIAL_ZOOM_NUDGE)
                .min(MAX_SCALE)
                .max(self.origin_scale);
            self.transform.set_scale(nudged);
            // A pivot outside the image can push an edge inward.
            if !covers_viewport(&self.image_rect(), &self.viewport) {
                clamp_translation(&mut self.transform, natural, &self.viewport);
            }
            debug!(scale = nudged, "initial zoom nudge");
        }

        self.baseline_scale = self.transform.scale();
    }

    /// Scale to `baseline * zoom_ratio` if every constraint holds.
    ///
    /// Returns `false` and leaves the transform unchanged otherwise.
    pub fn pinch(&mut self, zoom_ratio: f64) -> bool {
        let Some(natural) = self.natural else {
            return false;
        };

        let candidate = self.baseline_scale * zoom_ratio;
        if !candidate.is_finite() || candidate > MAX_SCALE || candidate < self.origin_scale {
            trace!(candidate, "pinch rejected: scale out of range");
            return false;
        }

        let rect = self
            .transform
            .image_rect_at(candidate, natural, &self.viewport);
        if !covers_viewport(&rect, &self.viewport) {
            trace!(candidate, "pinch rejected: would expose viewport");
            return false;
        }

        self.transform.set_scale(candidate);
        true
    }

    /// Translate by `(dx, dy)`, accepting each axis independently.
    pub fn pan(&mut self, dx: f64, dy: f64) -> PanOutcome {
        if self.natural.is_none() {
            return PanOutcome::default();
        }

        let bounds = self.viewport.rect();
        let rect = self.image_rect();
        let outcome = PanOutcome {
            x: rect.translate(dx, 0.0).covers_x(&bounds, EDGE_TOLERANCE),
            y: rect.translate(0.0, dy).covers_y(&bounds, EDGE_TOLERANCE),
        };

        if outcome.x {
            self.transform.translate_x += dx;
        }
        if outcome.y {
            self.transform.translate_y += dy;
        }
        if !(outcome.x && outcome.y) {
            trace!(dx, dy, ?outcome, "pan partially rejected");
        }
        outcome
    }

    /// Canonicalize the transform after a gesture session.
    ///
    /// Folds the pivot into the translation and closes any sub-tolerance gap
    /// left by accumulated floating point error.
    pub fn resnap(&mut self) {
        let Some(natural) = self.natural else {
            return;
        };
        self.transform = self.transform.normalized();
        if (self.transform.scale() - self.origin_scale).abs() <= EDGE_TOLERANCE {
            self.transform.set_scale(self.origin_scale);
        }
        clamp_translation(&mut self.transform, natural, &self.viewport);
    }

    /// Region of the source image under the crop window.
    ///
    /// Empty when nothing is loaded or the image does not overlap the window.
    pub fn crop_rect(&self) -> CropRect {
        let Some(natural) = self.natural else {
            return CropRect::EMPTY;
        };

        let image = self.image_rect();
        let overlap = get_overlap(&self.viewport.rect(), &image);
        if overlap.is_empty() {
            return CropRect::EMPTY;
        }

        let scale = self.transform.scale();
        CropRect::new(
            (overlap.left - image.left) / scale,
            (overlap.top - image.top) / scale,
            overlap.width() / scale,
            overlap.height() / scale,
        )
        .clamp_to(natural)
    }
}

impl GestureListener for TransformController {
    fn on_gesture_start(&mut self, midpoint: Point) {
        self.gesture_start(midpoint);
    }

    fn on_pinch(&mut self, zoom_ratio: f64) {
        self.pinch(zoom_ratio);
    }

    fn on_pan(&mut self, dx: f64, dy: f64) {
        self.pan(dx, dy);
    }

    fn on_gesture_end(&mut self) {
        self.resnap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(w: f64, h: f64, nw: u32, nh: u32) -> TransformController {
        let mut c = TransformController::new(Viewport::new(w, h, 1.0, false).unwrap());
        c.on_image_loaded(nw, nh);
        c
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_load_sets_cover_fit() {
        let c = controller(300.0, 300.0, 400, 300);
        assert_eq!(c.scale(), 1.0);
        assert_eq!(c.origin_scale(), 1.0);
        assert_eq!(c.image_rect(), Rect::new(-50.0, 0.0, 350.0, 300.0));
    }

    #[test]
    fn test_unloaded_ignores_gestures() {
        let mut c = TransformController::new(Viewport::new(300.0, 300.0, 1.0, false).unwrap());
        c.gesture_start(Point::new(10.0, 10.0));
        assert!(!c.pinch(1.2));
        assert_eq!(c.pan(5.0, 5.0), PanOutcome::default());
        assert_eq!(c.crop_rect(), CropRect::EMPTY);
        assert!(!c.is_loaded());
    }

    #[test]
    fn test_empty_image_ignored() {
        let mut c = TransformController::new(Viewport::new(300.0, 300.0, 1.0, false).unwrap());
        c.on_image_loaded(0, 100);
        assert!(!c.is_loaded());
    }

    #[test]
    fn test_first_gesture_start_nudges_once() {
        let mut c = controller(300.0, 300.0, 600, 600);
        assert_eq!(c.origin_scale(), 0.5);

        c.gesture_start(Point::new(150.0, 150.0));
        assert_close(c.scale(), 0.5 * 1.1);

        c.gesture_start(Point::new(150.0, 150.0));
        assert_close(c.scale(), 0.5 * 1.1);
    }

    #[test]
    fn test_nudge_resets_on_new_image() {
        let mut c = controller(300.0, 300.0, 600, 600);
        c.gesture_start(Point::new(150.0, 150.0));
        c.on_image_loaded(1200, 600);
        assert_eq!(c.scale(), 0.5);

        c.gesture_start(Point::new(150.0, 150.0));
        assert_close(c.scale(), 0.55);
    }

    #[test]
    fn test_nudge_capped_at_max_scale() {
        // Cover fit already at 1.5; 1.65 would exceed the hard maximum.
        let mut c = controller(300.0, 300.0, 200, 200);
        c.gesture_start(Point::new(150.0, 150.0));
        assert_close(c.scale(), MAX_SCALE);
    }

    #[test]
    fn test_gesture_start_does_not_move_image() {
        let mut c = controller(300.0, 300.0, 600, 600);
        c.gesture_start(Point::new(150.0, 150.0));
        c.pan(-20.0, 10.0);
        let before = c.image_rect();

        c.gesture_start(Point::new(40.0, 260.0));
        let after = c.image_rect();
        assert_close(before.left, after.left);
        assert_close(before.top, after.top);
        assert_close(before.right, after.right);
        assert_close(before.bottom, after.bottom);
    }

    #[test]
    fn test_pinch_within_limits() {
        let mut c = controller(300.0, 300.0, 600, 600);
        c.gesture_start(Point::new(150.0, 150.0));
        assert!(c.pinch(2.0));
        assert_close(c.scale(), 1.1);
    }

    #[test]
    fn test_pinch_rejects_above_max() {
        let mut c = controller(300.0, 300.0, 600, 600);
        c.gesture_start(Point::new(150.0, 150.0));
        assert!(!c.pinch(3.0));
        assert_close(c.scale(), 0.55);
    }

    #[test]
    fn test_pinch_rejects_below_origin_scale() {
        let mut c = controller(300.0, 300.0, 600, 600);
        c.gesture_start(Point::new(150.0, 150.0));
        assert!(!c.pinch(0.8));
        assert_close(c.scale(), 0.55);
        // Back to exactly the cover fit is allowed.
        assert!(c.pinch(1.0 / 1.1));
        assert_close(c.scale(), 0.5);
    }

    #[test]
    fn test_pinch_rejects_when_edge_would_show() {
        let mut c = controller(300.0, 300.0, 600, 600);
        c.gesture_start(Point::new(150.0, 150.0));
        assert!(c.pinch(2.0));
        // Push the image to its left limit, then zoom out around the far left.
        let shifted = c.pan(1000.0, 0.0);
        assert!(!shifted.x);
        let limit = -c.image_rect().left;
        assert!(c.pan(limit, 0.0).x);
        assert_close(c.image_rect().left, 0.0);

        c.gesture_start(Point::new(300.0, 150.0));
        // Shrinking around the right edge pulls the left edge inward.
        assert!(!c.pinch(0.9));
    }

    #[test]
    fn test_pan_axes_independent() {
        let mut c = controller(300.0, 300.0, 400, 300);
        // Horizontal slack of 50 on each side, no vertical slack.
        let outcome = c.pan(30.0, 10.0);
        assert_eq!(outcome, PanOutcome { x: true, y: false });
        assert_eq!(c.transform().translate_x, 30.0);
        assert_eq!(c.transform().translate_y, 0.0);

        let outcome = c.pan(30.0, 0.0);
        assert_eq!(outcome, PanOutcome { x: false, y: true });
        assert_eq!(c.transform().translate_x, 30.0);
    }

    #[test]
    fn test_crop_rect_at_cover_fit() {
        let c = controller(300.0, 300.0, 400, 300);
        let crop = c.crop_rect();
        assert_eq!(crop, CropRect::new(50.0, 0.0, 300.0, 300.0));
        assert_close(crop.width / crop.height, 1.0);
        assert!(crop.width <= 400.0 && crop.height <= 300.0);
    }

    #[test]
    fn test_crop_rect_after_zoom_and_pan() {
        let mut c = controller(300.0, 300.0, 600, 600);
        c.gesture_start(Point::new(150.0, 150.0));
        assert!(c.pinch(1.0 / 0.55));
        assert_close(c.scale(), 1.0);
        assert!(c.pan(100.0, -50.0) == PanOutcome { x: true, y: true });

        let crop = c.crop_rect();
        assert_close(crop.width, 300.0);
        assert_close(crop.height, 300.0);
        assert_close(crop.left, 50.0);
        assert_close(crop.top, 200.0);
    }

    #[test]
    fn test_resnap_preserves_drawing() {
        let mut c = controller(300.0, 300.0, 600, 600);
        c.gesture_start(Point::new(70.0, 200.0));
        assert!(c.pinch(1.5));
        let before = c.image_rect();

        c.resnap();
        let after = c.image_rect();
        assert_eq!(c.transform().origin_x, 0.0);
        assert_eq!(c.transform().origin_y, 0.0);
        assert_close(before.left, after.left);
        assert_close(before.bottom, after.bottom);
    }

    #[test]
    fn test_resnap_closes_tiny_gap() {
        let mut c = controller(300.0, 300.0, 400, 300);
        c.transform.translate_y = 1e-12;
        c.resnap();
        assert_eq!(c.image_rect().top, 0.0);
    }

    #[test]
    fn test_listener_routes_events() {
        let mut c = controller(300.0, 300.0, 600, 600);
        let listener: &mut dyn GestureListener = &mut c;
        listener.on_gesture_start(Point::new(150.0, 150.0));
        listener.on_pinch(2.0);
        listener.on_pan(10.0, 0.0);
        listener.on_gesture_end();

        assert_close(c.scale(), 1.1);
        assert_eq!(c.transform().origin_x, 0.0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
