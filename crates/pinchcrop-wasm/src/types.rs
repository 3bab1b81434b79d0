//! WASM-compatible wrapper types.
//!
//! This module provides JavaScript-friendly types that wrap the core PinchCrop
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use pinchcrop_core::decode::DecodedImage;
use pinchcrop_core::geometry::CropRect;
use pinchcrop_core::gesture::TouchPoint;
use wasm_bindgen::prelude::*;

/// An RGBA surface wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create a new JsDecodedImage from dimensions and RGBA pixel data
    /// (4 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array. This copies the buffer.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }
}

/// Source-pixel crop rectangle exposed to JavaScript.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsCropRect {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

#[wasm_bindgen]
impl JsCropRect {
    #[wasm_bindgen(getter)]
    pub fn left(&self) -> f64 {
        self.left
    }

    #[wasm_bindgen(getter)]
    pub fn top(&self) -> f64 {
        self.top
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl From<CropRect> for JsCropRect {
    fn from(rect: CropRect) -> Self {
        Self {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Convert a browser `TouchList` into core touch points (client coordinates).
pub(crate) fn touch_points(list: &web_sys::TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|touch| {
            TouchPoint::new(
                touch.identifier(),
                touch.client_x() as f64,
                touch.client_y() as f64,
            )
        })
        .collect()
}
