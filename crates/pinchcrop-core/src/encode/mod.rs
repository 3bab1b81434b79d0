//! Crop output encoding.
//!
//! This module provides functionality for:
//! - Encoding RGBA surfaces as PNG (default) or JPEG
//! - Wrapping encoded bytes in `data:` URIs for embedding
//!
//! # Examples
//!
//! ```ignore
//! use pinchcrop_core::encode::{encode_surface, to_data_uri, OutputFormat};
//!
//! let bytes = encode_surface(&surface, OutputFormat::Png).unwrap();
//! let uri = to_data_uri(&bytes, OutputFormat::Png);
//! ```

mod format;
mod jpeg;
mod png;

pub use format::{encode_surface, to_data_uri, EncodeError, OutputFormat, DEFAULT_JPEG_QUALITY};
pub use jpeg::encode_jpeg;
pub use png::encode_png;
