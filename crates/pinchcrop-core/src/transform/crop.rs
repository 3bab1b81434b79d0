//! Crop rasterization.
//!
//! Draws a source-space [`CropRect`] into an output surface of fixed size,
//! the way a canvas `drawImage(img, sx, sy, sw, sh, 0, 0, dw, dh)` call does.
//!
//! # Algorithm
//!
//! Inverse mapping: every output pixel centre is mapped back into the crop
//! rectangle and the source is sampled with bilinear interpolation:
//!
//! ```text
//! src_x = crop.left + (dst_x + 0.5) * crop.width / out_width - 0.5
//! src_y = crop.top + (dst_y + 0.5) * crop.height / out_height - 0.5
//! ```
//!
//! Samples outside the source are clamped to the nearest edge pixel.

use crate::decode::DecodedImage;
use crate::geometry::CropRect;

/// Rasterize `crop` from `source` into a `out_width` x `out_height` surface.
///
/// The surface always has the requested size. A degenerate crop rectangle
/// (or an empty or inconsistent source buffer) yields a fully transparent
/// surface.
///
/// # Example
///
/// ```ignore
/// let source = DecodedImage::filled(400, 300, [200, 10, 10, 255]);
/// let surface = rasterize(&source, &CropRect::new(50.0, 0.0, 300.0, 300.0), 600, 600);
/// assert_eq!((surface.width, surface.height), (600, 600));
/// ```
pub fn rasterize(
    source: &DecodedImage,
    crop: &CropRect,
    out_width: u32,
    out_height: u32,
) -> DecodedImage {
    let mut output = DecodedImage::transparent(out_width, out_height);
    if crop.is_degenerate() || source.validate().is_err() || output.is_empty() {
        return output;
    }

    let step_x = crop.width / out_width as f64;
    let step_y = crop.height / out_height as f64;

    for dst_y in 0..out_height {
        let src_y = crop.top + (dst_y as f64 + 0.5) * step_y - 0.5;
        let row_start = dst_y as usize * out_width as usize * 4;

        for dst_x in 0..out_width {
            let src_x = crop.left + (dst_x as f64 + 0.5) * step_x - 0.5;
            let pixel = sample_bilinear(source, src_x, src_y);

            let dst_idx = row_start + dst_x as usize * 4;
            output.pixels[dst_idx..dst_idx + 4].copy_from_slice(&pixel);
        }
    }

    output
}

/// Get a pixel as [f64; 4] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &DecodedImage, px: usize, py: usize) -> [f64; 4] {
    let idx = (py * image.width as usize + px) * 4;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
        image.pixels[idx + 3] as f64,
    ]
}

/// Sample a pixel using bilinear interpolation with clamp-to-edge.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 4] {
    let max_x = (image.width - 1) as f64;
    let max_y = (image.height - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 4];
    for (i, out) in result.iter_mut().enumerate() {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        *out = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: output size never depends on the crop rectangle.
        #[test]
        fn prop_output_size_fixed(
            (sw, sh) in (1u32..=40, 1u32..=40),
            (left, top, w, h) in (-10.0f64..50.0, -10.0f64..50.0, 0.0f64..50.0, 0.0f64..50.0),
            (ow, oh) in (1u32..=32, 1u32..=32),
        ) {
            let img = DecodedImage::filled(sw, sh, [1, 2, 3, 255]);
            let result = rasterize(&img, &CropRect::new(left, top, w, h), ow, oh);
            prop_assert_eq!(result.width, ow);
            prop_assert_eq!(result.height, oh);
            prop_assert_eq!(result.pixels.len(), (ow * oh * 4) as usize);
        }

        /// Property: rasterizing is deterministic.
        #[test]
        fn prop_deterministic(
            (left, top, w, h) in (0.0f64..10.0, 0.0f64..10.0, 1.0f64..10.0, 1.0f64..10.0),
        ) {
            let mut img = DecodedImage::filled(20, 20, [0, 0, 0, 255]);
            for (i, v) in img.pixels.iter_mut().enumerate() {
                *v = (i % 251) as u8;
            }
            let crop = CropRect::new(left, top, w, h);
            prop_assert_eq!(rasterize(&img, &crop, 12, 9).pixels, rasterize(&img, &crop, 12, 9).pixels);
        }
    }
}
