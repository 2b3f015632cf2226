use glam::Vec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn html_element_by_id(document: &web::Document, id: &str) -> Option<web::HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
}

#[inline]
pub fn add_click_listener(element: &web::EventTarget, mut handler: impl FnMut() + 'static) {
    let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
    _ = element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Inner window size in CSS pixels.
pub fn viewport_size() -> Vec2 {
    let Some(w) = web::window() else {
        return Vec2::ONE;
    };
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0) as f32;
    Vec2::new(dim(w.inner_width()), dim(w.inner_height()))
}

/// Match the canvas backing store to the window so one unit is one CSS pixel.
pub fn sync_canvas_to_viewport(canvas: &web::HtmlCanvasElement) -> Vec2 {
    let size = viewport_size();
    canvas.set_width((size.x as u32).max(1));
    canvas.set_height((size.y as u32).max(1));
    size
}
