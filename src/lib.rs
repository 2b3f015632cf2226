#![cfg(target_arch = "wasm32")]
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use tunnel_core::{EffectCoordinator, EffectHandle, TunnelConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod effects;
mod events;
mod frame;
mod render;
mod scene;
mod style;

use audio::WebAudioBackend;
use effects::BodyEffects;
use render::CanvasSurface;
use scene::TunnelScene;

thread_local! {
    static HANDLE: RefCell<Option<EffectHandle>> = const { RefCell::new(None) };
}

fn with_handle(f: impl FnOnce(&EffectHandle)) {
    HANDLE.with(|h| match h.borrow().as_ref() {
        Some(handle) => f(handle),
        None => log::warn!("[effects] trigger before init"),
    });
}

/// Flash the glitch effect (shake + hue shift) for 500ms.
#[wasm_bindgen(js_name = fireGlitch)]
pub fn fire_glitch() {
    with_handle(|h| h.fire_glitch());
}

/// Blow the vortex outward for 800ms.
#[wasm_bindgen(js_name = fireNova)]
pub fn fire_nova() {
    with_handle(|h| h.fire_nova());
}

/// Fade out audio, collapse the page and navigate away.
#[wasm_bindgen]
pub fn collapse() {
    with_handle(|h| h.collapse());
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("tunnel-web starting");

    static STARTED: AtomicBool = AtomicBool::new(false);
    if !STARTED.swap(true, Ordering::SeqCst) {
        if let Err(e) = init() {
            log::error!("init error: {:?}", e);
        }
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let mut config = TunnelConfig::default();
    config.seed = (js_sys::Math::random() * u32::MAX as f64) as u64;

    let scene = TunnelScene::from_document(&document);
    if scene.is_none() {
        log::warn!("[scene] missing #{}; depth camera idle", constants::TUNNEL_CONTAINER_ID);
    }

    let surface = match document
        .get_element_by_id(constants::VORTEX_CANVAS_ID)
        .and_then(|el| el.dyn_into::<web::HtmlCanvasElement>().ok())
    {
        Some(canvas) => {
            let size = dom::sync_canvas_to_viewport(&canvas);
            match CanvasSurface::new(canvas, size) {
                Ok(s) => Some(s),
                Err(e) => {
                    log::warn!("[vortex] {e}; particle field disabled");
                    None
                }
            }
        }
        None => {
            log::warn!("[vortex] missing #{}; particle field disabled", constants::VORTEX_CANVAS_ID);
            None
        }
    };

    let handle = EffectHandle::new();
    if let Some(target) = events::wire_collapse_button(&document, handle.clone()) {
        config.collapse.target = target;
    }

    let sections = scene.as_ref().map(|s| s.sections()).unwrap_or_default();
    let viewport = surface.as_ref().map(|s| tunnel_core::Surface::size(s));
    let coord = EffectCoordinator::with_handle(config, sections, viewport, handle, WebAudioBackend::acquire);
    let handle = coord.handle();

    if scene.is_some() {
        events::wire_wheel(handle.clone());
    }
    events::wire_first_gesture(handle.clone());
    let resized = Rc::new(Cell::new(false));
    events::wire_resize(resized.clone());
    HANDLE.with(|h| *h.borrow_mut() = Some(handle));

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        coord,
        scene,
        surface,
        body: document.body().map(BodyEffects::new),
        resized,
        origin: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
