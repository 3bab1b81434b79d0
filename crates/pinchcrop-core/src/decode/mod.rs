//! Image source loading.
//!
//! This module provides functionality for:
//! - Decoding PNG and JPEG sources into RGBA pixels
//! - Applying EXIF orientation so the natural size matches the browser's
//! - Reading base64 `data:` URI sources
//!
//! All operations are synchronous and single-threaded.
//!
//! # Examples
//!
//! ```ignore
//! use pinchcrop_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod data_uri;
mod source;
mod types;

pub use data_uri::{decode_data_uri, encode_data_uri, parse_data_uri, DataUri};
pub use source::{decode_image, sniff_mime_type};
pub use types::{rgba_len, DecodeError, DecodedImage, Orientation};
