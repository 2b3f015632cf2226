use crate::constants::*;
use crate::dom;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tunnel_core::EffectHandle;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Window wheel → camera scroll. Only wired when the tunnel exists.
pub fn wire_wheel(handle: EffectHandle) {
    let Some(window) = web::window() else { return };
    let closure = Closure::wrap(Box::new(move |ev: web::WheelEvent| {
        handle.scroll(ev.delta_y() as f32);
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// First click or wheel on the window unlocks audio, then both listeners go.
pub fn wire_first_gesture(handle: EffectHandle) {
    let Some(window) = web::window() else { return };
    let registered: Rc<RefCell<Option<js_sys::Function>>> = Rc::new(RefCell::new(None));
    let registered_cb = registered.clone();
    let window_cb = window.clone();
    let closure = Closure::wrap(Box::new(move || {
        handle.gesture();
        if let Some(func) = registered_cb.borrow_mut().take() {
            for ev in GESTURE_EVENTS {
                _ = window_cb.remove_event_listener_with_callback(ev, &func);
            }
            log::info!("[gesture] first gesture seen; listeners removed");
        }
    }) as Box<dyn FnMut()>);
    let func: js_sys::Function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
    for ev in GESTURE_EVENTS {
        _ = window.add_event_listener_with_callback(ev, &func);
    }
    *registered.borrow_mut() = Some(func);
    closure.forget();
}

/// Collapse control click. Returns the control's `data-target`, if any.
pub fn wire_collapse_button(document: &web::Document, handle: EffectHandle) -> Option<String> {
    let Some(button) = dom::html_element_by_id(document, COLLAPSE_BUTTON_ID) else {
        log::info!("[effects] no #{COLLAPSE_BUTTON_ID}; collapse only via collapse()");
        return None;
    };
    dom::add_click_listener(&button, move || handle.collapse());
    button.dataset().get(COLLAPSE_TARGET_KEY)
}

/// Raise `dirty` on window resize; the frame loop picks it up.
pub fn wire_resize(dirty: Rc<Cell<bool>>) {
    let Some(window) = web::window() else { return };
    let closure = Closure::wrap(Box::new(move || dirty.set(true)) as Box<dyn FnMut()>);
    _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    closure.forget();
}
