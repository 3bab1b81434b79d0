//! Cropper configuration.
//!
//! Field names follow the camelCase keys of the JavaScript options object, so
//! the WASM bindings can deserialize it directly.

use serde::{Deserialize, Serialize};

use crate::encode::{OutputFormat, DEFAULT_JPEG_QUALITY};
use crate::viewport::{ConfigError, Stage, Viewport};

fn default_output() -> f64 {
    1.0
}

fn default_format() -> String {
    "png".to_string()
}

fn default_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

/// Options for one crop session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropOptions {
    /// Crop window width in stage pixels.
    pub width: f64,
    /// Crop window height in stage pixels.
    pub height: f64,
    /// Output bitmap multiplier.
    #[serde(default = "default_output")]
    pub output: f64,
    /// Circular crop window. Requires `width == height`.
    #[serde(default)]
    pub circle: bool,
    /// Output encoding name: `png`, `jpeg` or `jpg`.
    #[serde(rename = "type", default = "default_format")]
    pub format: String,
    /// JPEG quality, 1-100. Ignored for PNG.
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_height: Option<f64>,
}

impl CropOptions {
    /// Options for a `width` x `height` window with every default applied.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            output: default_output(),
            circle: false,
            format: default_format(),
            quality: default_quality(),
            stage_width: None,
            stage_height: None,
        }
    }

    /// Build the crop viewport.
    pub fn viewport(&self) -> Result<Viewport, ConfigError> {
        Viewport::new(self.width, self.height, self.output, self.circle)
    }

    /// Build the stage, falling back to the viewport size for missing axes.
    pub fn stage(&self, viewport: &Viewport) -> Result<Stage, ConfigError> {
        Stage::new(
            self.stage_width.unwrap_or(viewport.width()),
            self.stage_height.unwrap_or(viewport.height()),
        )
    }

    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        OutputFormat::parse(&self.format, self.quality)
    }
}
