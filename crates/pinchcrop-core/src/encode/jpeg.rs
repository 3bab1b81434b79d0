//! JPEG encoding for crop output.
//!
//! JPEG has no alpha channel. Pixels are composited onto black first, which
//! is what a canvas produces for `toDataURL("image/jpeg")`.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::format::validate_rgba;
use super::EncodeError;

/// Encode RGBA pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Quality Guidelines
///
/// * 90-100: High quality (browser default: 92)
/// * 60-80: Medium quality, acceptable for sharing
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate_rgba(pixels, width, height)?;

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);
    let rgb = flatten_onto_black(pixels);

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

/// Drop alpha by compositing straight-alpha RGBA over opaque black.
fn flatten_onto_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as u32;
        for &channel in &px[..3] {
            rgb.push(((channel as u32 * alpha + 127) / 255) as u8);
        }
    }
    rgb
}


// ============================================================================
// Property-Based Tests
// ============================================================================
