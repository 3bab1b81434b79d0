//! PinchCrop WASM - WebAssembly bindings for PinchCrop
//!
//! This crate exposes the pinchcrop-core crop session to JavaScript as the
//! `PinchCropper` class, rendering the widget with plain DOM nodes.
//!
//! # Module Structure
//!
//! - `cropper` - The `PinchCropper` class and its DOM-backed session host
//! - `dom` - Widget construction, canvas painting and CSS transforms
//! - `types` - WASM-compatible wrapper types and touch list conversion
//!
//! # Usage
//!
//! ```typescript
//! import init, { PinchCropper } from '@pinchcrop/wasm';
//!
//! await init();
//!
//! const cropper = new PinchCropper(
//!   { width: 300, height: 300, type: 'jpeg' },
//!   (dataUri, canvas) => preview.src = dataUri,
//!   () => console.log('cancelled'),
//! );
//! cropper.loadImage(new Uint8Array(await file.arrayBuffer()));
//! ```

use wasm_bindgen::prelude::*;

mod cropper;
mod dom;
mod types;

pub use cropper::PinchCropper;
pub use types::{JsCropRect, JsDecodedImage};

/// Module start hook. The cropper keeps no global state, so there is nothing
/// to set up before the first `PinchCropper` is constructed.
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
