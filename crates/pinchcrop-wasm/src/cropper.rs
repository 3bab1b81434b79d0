//! The `PinchCropper` JavaScript class.
//!
//! Owns one [`CropSession`] whose host is the widget's DOM plus the user's
//! callbacks. Touch handlers are expected to be attached by the caller:
//!
//! ```typescript
//! const cropper = new PinchCropper({ width: 300, height: 300, circle: true },
//!   (dataUri, canvas) => upload(dataUri),
//!   () => console.log('cancelled'));
//! cropper.loadImage(new Uint8Array(await file.arrayBuffer()));
//! el.addEventListener('touchmove', (e) => cropper.handleTouchMove(e), { passive: false });
//! ```

use js_sys::Function;
use pinchcrop_core::cover::render_cover;
use pinchcrop_core::decode::{encode_data_uri, sniff_mime_type};
use pinchcrop_core::gesture::{Disposition, TouchPoint};
use pinchcrop_core::options::CropOptions;
use pinchcrop_core::session::{CropHost, CropOutput, CropSession, SessionError};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, HtmlImageElement, TouchEvent};

use crate::dom::{self, WidgetDom};
use crate::types::{touch_points, JsCropRect, JsDecodedImage};

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Bridges session callbacks to the DOM and the user's JS functions.
struct DomHost {
    root: HtmlElement,
    on_confirm: Function,
    on_cancel: Function,
    on_before_confirm: Option<Function>,
}

impl DomHost {
    fn report(result: Result<JsValue, JsValue>) {
        if let Err(err) = result {
            web_sys::console::error_2(&JsValue::from_str("pinchcrop callback failed:"), &err);
        }
    }
}

impl CropHost for DomHost {
    fn before_confirm(&mut self) {
        if let Some(callback) = &self.on_before_confirm {
            Self::report(callback.call0(&JsValue::NULL));
        }
    }

    fn confirm(&mut self, output: CropOutput) {
        let canvas = match dom::surface_canvas(&output.surface) {
            Ok(canvas) => JsValue::from(canvas),
            Err(err) => {
                web_sys::console::error_2(&JsValue::from_str("pinchcrop: canvas failed:"), &err);
                JsValue::NULL
            }
        };
        Self::report(self.on_confirm.call2(
            &JsValue::NULL,
            &JsValue::from_str(&output.data_uri),
            &canvas,
        ));
    }

    fn cancel(&mut self) {
        Self::report(self.on_cancel.call0(&JsValue::NULL));
    }

    fn confirm_failed(&mut self, error: &SessionError) {
        web_sys::console::error_1(&JsValue::from_str(&format!(
            "pinchcrop: confirm failed: {error}"
        )));
    }

    fn detach(&mut self) {
        self.root.remove();
    }

    fn visibility_changed(&mut self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        if let Err(err) = self.root.style().set_property("display", display) {
            web_sys::console::error_1(&err);
        }
    }
}

/// Full-screen touch cropper.
#[wasm_bindgen]
pub struct PinchCropper {
    session: CropSession<DomHost>,
    image: HtmlImageElement,
}

#[wasm_bindgen]
impl PinchCropper {
    /// Validate `options`, build the widget and show it.
    ///
    /// `options` uses the keys `width`, `height`, `output`, `circle`, `type`,
    /// `quality`, `stageWidth` and `stageHeight`. The stage defaults to the
    /// window's inner size.
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: JsValue,
        on_confirm: Function,
        on_cancel: Function,
        on_before_confirm: Option<Function>,
    ) -> Result<PinchCropper, JsValue> {
        let mut options: CropOptions = serde_wasm_bindgen::from_value(options)?;
        if let Some((width, height)) = dom::window_size() {
            options.stage_width.get_or_insert(width);
            options.stage_height.get_or_insert(height);
        }

        // Fail on bad configuration before touching the DOM.
        let viewport = options.viewport().map_err(to_js)?;
        let stage = options.stage(&viewport).map_err(to_js)?;
        options.output_format().map_err(to_js)?;

        let WidgetDom { root, image, cover } = dom::build(stage.width, stage.height)?;
        dom::paint(&cover, &render_cover(&stage, &viewport))?;

        let host = DomHost {
            root: root.clone(),
            on_confirm,
            on_cancel,
            on_before_confirm,
        };
        let session = match CropSession::new(&options, host) {
            Ok(session) => session,
            Err(err) => {
                root.remove();
                return Err(to_js(err));
            }
        };

        Ok(PinchCropper { session, image })
    }

    /// Load encoded image bytes (PNG or JPEG).
    #[wasm_bindgen(js_name = loadImage)]
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let mime = sniff_mime_type(bytes).unwrap_or("application/octet-stream");
        if let Err(err) = self.session.load(bytes) {
            return Err(self.load_failed(err));
        }
        self.image.set_src(&encode_data_uri(mime, bytes));
        self.render()
    }

    /// Load a base64 `data:` URI.
    #[wasm_bindgen(js_name = loadDataUri)]
    pub fn load_data_uri(&mut self, uri: &str) -> Result<(), JsValue> {
        if let Err(err) = self.session.load_data_uri(uri) {
            return Err(self.load_failed(err));
        }
        self.image.set_src(uri);
        self.render()
    }

    #[wasm_bindgen(js_name = handleTouchStart)]
    pub fn handle_touch_start(&mut self, event: &TouchEvent) -> Result<(), JsValue> {
        let touches = touch_points(&event.touches());
        let disposition = self.session.touch_start(&touches);
        self.finish_event(event, disposition)
    }

    #[wasm_bindgen(js_name = handleTouchMove)]
    pub fn handle_touch_move(&mut self, event: &TouchEvent) -> Result<(), JsValue> {
        let touches = touch_points(&event.touches());
        let disposition = self.session.touch_move(&touches);
        self.finish_event(event, disposition)
    }

    #[wasm_bindgen(js_name = handleTouchEnd)]
    pub fn handle_touch_end(&mut self, event: &TouchEvent) -> Result<(), JsValue> {
        let touches = touch_points(&event.touches());
        let disposition = self.session.touch_end(&touches);
        self.finish_event(event, disposition)
    }

    #[wasm_bindgen(js_name = handleTouchCancel)]
    pub fn handle_touch_cancel(&mut self, event: &TouchEvent) -> Result<(), JsValue> {
        let disposition = self.session.touch_cancel();
        self.finish_event(event, disposition)
    }

    /// Feed raw stage-space touches, for hosts that use pointer events.
    ///
    /// `xy` holds one `x, y` pair per id. Returns whether the native event
    /// should be `preventDefault`ed.
    #[wasm_bindgen(js_name = handleTouches)]
    pub fn handle_touches(&mut self, phase: &str, ids: &[i32], xy: &[f64]) -> Result<bool, JsValue> {
        let touches = touches_from_arrays(ids, xy).map_err(|msg| JsValue::from_str(&msg))?;
        let disposition = match phase {
            "start" => self.session.touch_start(&touches),
            "move" => self.session.touch_move(&touches),
            "end" => self.session.touch_end(&touches),
            "cancel" => self.session.touch_cancel(),
            other => return Err(JsValue::from_str(&format!("unknown touch phase: {other}"))),
        };
        self.render()?;
        Ok(disposition == Disposition::PreventDefault)
    }

    /// Crop, encode and deliver the result to `onConfirm`.
    pub fn confirm(&mut self) -> Result<(), JsValue> {
        self.session.confirm().map_err(to_js)
    }

    /// Hide the widget and call `onCancel`.
    pub fn cancel(&mut self) -> Result<(), JsValue> {
        self.session.cancel().map_err(to_js)
    }

    /// Show the widget again after a confirm or cancel.
    pub fn show(&mut self) {
        self.session.set_visible(true);
    }

    /// Remove the widget from the page. Returns `false` if already destroyed.
    pub fn destroy(&mut self) -> bool {
        self.session.destroy()
    }

    /// The source region currently under the crop window.
    #[wasm_bindgen(js_name = cropRect)]
    pub fn crop_rect(&self) -> JsCropRect {
        self.session.crop_rect().into()
    }

    pub fn scale(&self) -> f64 {
        self.session.scale()
    }

    /// Render the current crop without confirming.
    pub fn preview(&self) -> Option<JsDecodedImage> {
        let source = self.session.source()?;
        let (width, height) = self.session.viewport().output_size();
        let surface =
            pinchcrop_core::rasterize(source, &self.session.crop_rect(), width, height);
        Some(JsDecodedImage::from_decoded(surface))
    }
}

/// Pair touch ids with flattened `x, y` coordinates.
fn touches_from_arrays(ids: &[i32], xy: &[f64]) -> Result<Vec<TouchPoint>, String> {
    if xy.len() != ids.len() * 2 {
        return Err(format!(
            "expected {} coordinates for {} touches, got {}",
            ids.len() * 2,
            ids.len(),
            xy.len()
        ));
    }
    Ok(ids
        .iter()
        .zip(xy.chunks_exact(2))
        .map(|(&id, p)| TouchPoint::new(id, p[0], p[1]))
        .collect())
}

impl PinchCropper {
    fn load_failed(&mut self, err: SessionError) -> JsValue {
        let message = to_js(&err);
        web_sys::console::warn_2(&JsValue::from_str("pinchcrop: image load failed:"), &message);
        if let Err(style_err) = self.image.style().set_property("visibility", "hidden") {
            web_sys::console::error_1(&style_err);
        }
        message
    }

    fn finish_event(&mut self, event: &TouchEvent, disposition: Disposition) -> Result<(), JsValue> {
        if disposition == Disposition::PreventDefault {
            event.prevent_default();
        }
        self.render()
    }

    /// Apply the controller's transform to the image element.
    fn render(&self) -> Result<(), JsValue> {
        if self.session.is_destroyed() || !self.session.is_loaded() {
            return Ok(());
        }
        let controller = self.session.controller();
        let offset = self
            .session
            .stage()
            .viewport_offset(self.session.viewport());
        let matrix = dom::image_matrix(&controller.image_rect(), controller.scale(), offset);

        let style = self.image.style();
        style.set_property("transform", &matrix)?;
        style.set_property("visibility", "visible")
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn options(width: f64, height: f64, circle: bool) -> JsValue {
        let options = CropOptions {
            circle,
            stage_width: Some(400.0),
            stage_height: Some(400.0),
            ..CropOptions::new(width, height)
        };
        serde_wasm_bindgen::to_value(&options).unwrap()
    }

    fn noop() -> Function {
        Function::new_no_args("")
    }

    #[wasm_bindgen_test]
    fn test_circle_requires_square() {
        let result = PinchCropper::new(options(200.0, 300.0, true), noop(), noop(), None);
        assert!(result.is_err());
    }

    #[wasm_bindgen_test]
    fn test_load_and_crop_rect() {
        let mut cropper =
            PinchCropper::new(options(300.0, 300.0, false), noop(), noop(), None).unwrap();
        let png = pinchcrop_core::encode::encode_png(&[200u8; 400 * 300 * 4], 400, 300).unwrap();
        cropper.load_image(&png).unwrap();

        let rect = cropper.crop_rect();
        assert_eq!(rect.left(), 50.0);
        assert_eq!(rect.width(), 300.0);
        assert_eq!(cropper.scale(), 1.0);
    }

    #[wasm_bindgen_test]
    fn test_bad_bytes_rejected() {
        let mut cropper =
            PinchCropper::new(options(100.0, 100.0, false), noop(), noop(), None).unwrap();
        assert!(cropper.load_image(&[0, 1, 2, 3]).is_err());
        assert!(cropper.confirm().is_err());
    }

    #[wasm_bindgen_test]
    fn test_destroy_twice() {
        let mut cropper =
            PinchCropper::new(options(100.0, 100.0, false), noop(), noop(), None).unwrap();
        assert!(cropper.destroy());
        assert!(!cropper.destroy());
    }
}
