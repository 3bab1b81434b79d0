//! Image transform state, gesture constraints and crop rasterization.
//!
//! # Pipeline
//!
//! 1. [`TransformController`] receives gesture events and mutates the
//!    [`ImageTransform`], rejecting anything that would uncover the crop window
//! 2. On confirm, [`TransformController::crop_rect`] maps the visible region
//!    back into source pixels
//! 3. [`rasterize`] draws that region into the output surface
//!
//! # Coordinate System
//!
//! - Viewport space: origin at the crop window's top-left corner
//! - Image-local space: origin at the image centre, unscaled
//! - Source space: origin at the image's top-left pixel, unscaled

mod controller;
mod crop;
mod state;

pub use controller::{PanOutcome, TransformController};
pub use crop::rasterize;
pub use state::{
    clamp_translation, cover_fit_scale, covers_viewport, ImageTransform, EDGE_TOLERANCE,
    INITIAL_ZOOM_NUDGE, MAX_SCALE,
};
