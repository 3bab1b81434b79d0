//! PinchCrop Core - touch-driven photo cropping
//!
//! This crate provides the platform-independent parts of PinchCrop: gesture
//! classification, the constrained image transform, crop rasterization,
//! image loading and output encoding, and the crop session lifecycle that
//! ties them together.

pub mod cover;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod gesture;
pub mod options;
pub mod session;
pub mod transform;
pub mod viewport;

pub use cover::render_cover;
pub use decode::{decode_data_uri, decode_image, DecodeError, DecodedImage};
pub use encode::{encode_surface, to_data_uri, EncodeError, OutputFormat};
pub use geometry::{get_overlap, CropRect, Point, Rect, Size};
pub use gesture::{Disposition, GestureListener, GestureTracker, TouchPoint};
pub use options::CropOptions;
pub use session::{CropHost, CropOutput, CropSession, SessionError, SessionSlot};
pub use transform::{rasterize, ImageTransform, TransformController, MAX_SCALE};
pub use viewport::{ConfigError, Stage, Viewport};

#[cfg(test)]
mod tests {
    use super::*;

    struct Discard;

    impl CropHost for Discard {
        fn confirm(&mut self, _output: CropOutput) {}
        fn cancel(&mut self) {}
    }

    #[test]
    fn test_reexports_compose() {
        let mut session = CropSession::new(&CropOptions::new(40.0, 40.0), Discard).unwrap();
        session
            .load_decoded(DecodedImage::filled(80, 40, [5, 6, 7, 255]))
            .unwrap();
        assert_eq!(session.crop_rect(), CropRect::new(20.0, 0.0, 40.0, 40.0));
        assert!(session.confirm().is_ok());
    }

    #[test]
    fn test_max_scale() {
        assert_eq!(MAX_SCALE, 1.6);
    }
}
