//! DOM construction and painting for the cropper widget.
//!
//! Layout: a fixed full-stage root `div` holding the source `img` (moved with a
//! CSS matrix) and the cover `canvas` on top of it.

use pinchcrop_core::decode::DecodedImage;
use pinchcrop_core::geometry::{Point, Rect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlImageElement, ImageData,
};

/// The widget's DOM nodes.
pub(crate) struct WidgetDom {
    pub root: HtmlElement,
    pub image: HtmlImageElement,
    pub cover: HtmlCanvasElement,
}

pub(crate) fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))
}

/// Inner size of the browser window, used as the default stage.
pub(crate) fn window_size() -> Option<(f64, f64)> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some((width, height))
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, JsValue> {
    document
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("<{tag}> has an unexpected type")))
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = element.style();
    for (name, value) in styles {
        style.set_property(name, value)?;
    }
    Ok(())
}

/// Build the widget under `document.body`.
pub(crate) fn build(stage_width: f64, stage_height: f64) -> Result<WidgetDom, JsValue> {
    let document = document()?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let root: HtmlElement = create(&document, "div")?;
    let width = format!("{stage_width}px");
    let height = format!("{stage_height}px");
    set_styles(
        &root,
        &[
            ("position", "fixed"),
            ("left", "0"),
            ("top", "0"),
            ("width", &width),
            ("height", &height),
            ("overflow", "hidden"),
            ("background", "#000"),
            ("touch-action", "none"),
            ("z-index", "1000"),
        ],
    )?;

    let image: HtmlImageElement = create(&document, "img")?;
    set_styles(
        &image,
        &[
            ("position", "absolute"),
            ("left", "0"),
            ("top", "0"),
            ("max-width", "none"),
            ("transform-origin", "0 0"),
            ("visibility", "hidden"),
        ],
    )?;

    let cover: HtmlCanvasElement = create(&document, "canvas")?;
    cover.set_width(stage_width.floor() as u32);
    cover.set_height(stage_height.floor() as u32);
    set_styles(
        &cover,
        &[
            ("position", "absolute"),
            ("left", "0"),
            ("top", "0"),
            ("pointer-events", "none"),
        ],
    )?;

    root.append_child(&image)?;
    root.append_child(&cover)?;
    body.append_child(&root)?;

    Ok(WidgetDom { root, image, cover })
}

/// Copy an RGBA surface into a canvas of the same size.
pub(crate) fn paint(canvas: &HtmlCanvasElement, surface: &DecodedImage) -> Result<(), JsValue> {
    canvas.set_width(surface.width);
    canvas.set_height(surface.height);
    if surface.is_empty() {
        return Ok(());
    }

    let context = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let data = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(surface.pixels.as_slice()),
        surface.width,
        surface.height,
    )?;
    context.put_image_data(&data, 0.0, 0.0)
}

/// A new canvas holding `surface`.
pub(crate) fn surface_canvas(surface: &DecodedImage) -> Result<HtmlCanvasElement, JsValue> {
    let canvas: HtmlCanvasElement = create(&document()?, "canvas")?;
    paint(&canvas, surface)?;
    Ok(canvas)
}

/// CSS transform placing an unscaled, top-left anchored image at `image_rect`
/// (viewport space), with the viewport's top-left at `offset` on the stage.
pub(crate) fn image_matrix(image_rect: &Rect, scale: f64, offset: Point) -> String {
    let tx = offset.x + image_rect.left;
    let ty = offset.y + image_rect.top;
    format!("matrix({scale}, 0, 0, {scale}, {tx}, {ty})")
}
