//! Output formats, surface encoding and data URIs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{encode_jpeg, encode_png};
use crate::decode::{encode_data_uri, DecodedImage};
use crate::viewport::ConfigError;

/// Quality browsers use for `toDataURL("image/jpeg")` when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Encoding of the confirmed crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Lossless PNG with alpha.
    #[default]
    Png,
    /// JPEG at the given quality (1-100). Alpha is flattened onto black.
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// Parse a format name (`png`, `jpeg`, `jpg`, optionally `image/`-prefixed).
    pub fn parse(name: &str, quality: u8) -> Result<Self, ConfigError> {
        let normalized = name.trim().to_ascii_lowercase();
        let bare = normalized.strip_prefix("image/").unwrap_or(&normalized);
        match bare {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => {
                if !(1..=100).contains(&quality) {
                    return Err(ConfigError::InvalidQuality(quality));
                }
                Ok(OutputFormat::Jpeg { quality })
            }
            _ => Err(ConfigError::UnsupportedFormat(name.to_string())),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Encode an RGBA surface in `format`.
pub fn encode_surface(surface: &DecodedImage, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Png => encode_png(&surface.pixels, surface.width, surface.height),
        OutputFormat::Jpeg { quality } => {
            encode_jpeg(&surface.pixels, surface.width, surface.height, quality)
        }
    }
}

/// Wrap encoded bytes in a `data:<mime>;base64,` URI.
pub fn to_data_uri(bytes: &[u8], format: OutputFormat) -> String {
    encode_data_uri(format.mime(), bytes)
}

/// Check an RGBA buffer against its dimensions.
pub(super) fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
