//! Crop viewport and the stage that hosts it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::rgba_len;
use crate::geometry::{Point, Rect, Size};

/// Largest bitmap area accepted for the output and the stage overlay
/// (the canvas area limit of mainstream browsers).
pub const MAX_BITMAP_PIXELS: u64 = 16384 * 16384;

/// Configuration errors, raised before any session state exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Circular crops need a square viewport.
    #[error("circular crop requires width == height, got {width}x{height}")]
    CircleNotSquare { width: f64, height: f64 },

    /// Viewport width or height is zero, negative, not finite or too large.
    #[error("invalid viewport dimensions: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    /// Output multiplier is zero, negative or not finite.
    #[error("invalid output scale: {0}")]
    InvalidOutputScale(f64),

    /// The output bitmap would have no pixels.
    #[error("output bitmap for {width}x{height} at scale {scale} is empty")]
    EmptyOutput { width: f64, height: f64, scale: f64 },

    /// The output bitmap exceeds [`MAX_BITMAP_PIXELS`].
    #[error("output bitmap {width}x{height} is too large")]
    OutputTooLarge { width: u32, height: u32 },

    /// Stage width or height is zero, negative, not finite or too large.
    #[error("invalid stage dimensions: {width}x{height}")]
    InvalidStage { width: f64, height: f64 },

    /// Unknown output encoding name.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// JPEG quality outside 1-100.
    #[error("invalid JPEG quality {0}, expected 1-100")]
    InvalidQuality(u8),
}

/// The fixed crop window the image is moved behind.
///
/// Immutable once built; [`Viewport::new`] is the only constructor and
/// enforces every invariant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    width: f64,
    height: f64,
    output_scale: f64,
    is_circular: bool,
}

impl Viewport {
    /// Validate and build a viewport.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::CircleNotSquare`] if `is_circular` and `width != height`
    /// - [`ConfigError::InvalidViewport`] for non-positive or non-finite sizes
    /// - [`ConfigError::InvalidOutputScale`] for a non-positive multiplier
    /// - [`ConfigError::EmptyOutput`] if the output bitmap rounds down to zero
    /// - [`ConfigError::OutputTooLarge`] if the output bitmap is over [`MAX_BITMAP_PIXELS`]
    pub fn new(
        width: f64,
        height: f64,
        output_scale: f64,
        is_circular: bool,
    ) -> Result<Self, ConfigError> {
        if is_circular && width != height {
            return Err(ConfigError::CircleNotSquare { width, height });
        }
        // The default stage is the viewport itself, so it must fit as a bitmap too.
        if Size::new(width, height).is_empty()
            || !bitmap_fits(width.floor() as u32, height.floor() as u32)
        {
            return Err(ConfigError::InvalidViewport { width, height });
        }
        if !(output_scale.is_finite() && output_scale > 0.0) {
            return Err(ConfigError::InvalidOutputScale(output_scale));
        }

        let viewport = Self {
            width,
            height,
            output_scale,
            is_circular,
        };
        let (out_w, out_h) = viewport.output_size();
        if out_w == 0 || out_h == 0 {
            return Err(ConfigError::EmptyOutput {
                width,
                height,
                scale: output_scale,
            });
        }
        if !bitmap_fits(out_w, out_h) {
            return Err(ConfigError::OutputTooLarge {
                width: out_w,
                height: out_h,
            });
        }

        Ok(viewport)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn output_scale(&self) -> f64 {
        self.output_scale
    }

    pub fn is_circular(&self) -> bool {
        self.is_circular
    }

    /// The crop window in viewport space: `[0, 0, width, height]`.
    pub fn rect(&self) -> Rect {
        Rect::from_xywh(0.0, 0.0, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Output bitmap dimensions. Fractions are truncated, as a canvas does.
    pub fn output_size(&self) -> (u32, u32) {
        let w = (self.width * self.output_scale).floor();
        let h = (self.height * self.output_scale).floor();
        (w.clamp(0.0, u32::MAX as f64) as u32, h.clamp(0.0, u32::MAX as f64) as u32)
    }
}

/// The full-screen area the widget is drawn into.
///
/// The crop viewport is centred in the stage. Touch input arrives in stage
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub width: f64,
    pub height: f64,
}

impl Stage {
    pub fn new(width: f64, height: f64) -> Result<Self, ConfigError> {
        let too_large = || {
            let w = width.floor().min(u32::MAX as f64) as u32;
            let h = height.floor().min(u32::MAX as f64) as u32;
            !bitmap_fits(w, h)
        };
        if Size::new(width, height).is_empty() || too_large() {
            return Err(ConfigError::InvalidStage { width, height });
        }
        Ok(Self { width, height })
    }

    /// A stage exactly the size of the viewport (no surrounding area).
    pub fn fitting(viewport: &Viewport) -> Self {
        Self {
            width: viewport.width(),
            height: viewport.height(),
        }
    }

    /// Top-left corner of the crop window in stage coordinates.
    pub fn viewport_offset(&self, viewport: &Viewport) -> Point {
        Point::new(
            (self.width - viewport.width()) / 2.0,
            (self.height - viewport.height()) / 2.0,
        )
    }

    /// Convert a stage point into viewport space.
    pub fn to_viewport(&self, viewport: &Viewport, point: Point) -> Point {
        let offset = self.viewport_offset(viewport);
        Point::new(point.x - offset.x, point.y - offset.y)
    }
}

/// Whether a `width` x `height` RGBA bitmap is within limits and addressable.
fn bitmap_fits(width: u32, height: u32) -> bool {
    width as u64 * height as u64 <= MAX_BITMAP_PIXELS && rgba_len(width, height).is_some()
}
