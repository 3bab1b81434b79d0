//! Core types for image loading.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Size;

/// Error types for image loading operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not an image format this build can read.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The image decoded to zero width or height.
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// The source string is not a `data:` URI.
    #[error("Not a data URI: {0}")]
    NotDataUri(String),

    /// Pixel buffer length disagrees with the dimensions.
    #[error("Pixel buffer holds {actual} bytes, expected {expected} for RGBA")]
    PixelDataMismatch { expected: usize, actual: usize },

    /// The image is too large to address in memory.
    #[error("Image dimensions {width}x{height} overflow the pixel buffer")]
    TooLarge { width: u32, height: u32 },

    /// The data URI payload is not base64-encoded.
    #[error("Data URI is not base64-encoded")]
    NotBase64Encoded,

    /// The base64 payload could not be decoded.
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A decoded image with RGBA pixel data.
///
/// Used both for loaded sources and for rendered surfaces (crop output,
/// cover overlay).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel, straight alpha).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Create a new DecodedImage with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A fully transparent image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        }
    }

    /// An image filled with a single colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a DecodedImage from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Natural size as floating point dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// Get the RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Check that the buffer is non-empty and exactly `width * height * 4` bytes.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.is_empty() {
            return Err(DecodeError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        let expected = rgba_len(self.width, self.height).ok_or(DecodeError::TooLarge {
            width: self.width,
            height: self.height,
        })?;
        if self.pixels.len() != expected {
            return Err(DecodeError::PixelDataMismatch {
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }
}

/// Byte length of a `width` x `height` RGBA buffer, `None` if it overflows `usize`.
pub fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)
}
