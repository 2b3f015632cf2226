use crate::audio::WebAudioBackend;
use crate::dom;
use crate::effects::BodyEffects;
use crate::render::CanvasSurface;
use crate::scene::TunnelScene;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tunnel_core::EffectCoordinator;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub coord: EffectCoordinator<WebAudioBackend>,
    pub scene: Option<TunnelScene>,
    pub surface: Option<CanvasSurface>,
    pub body: Option<BodyEffects>,
    pub resized: Rc<Cell<bool>>,
    pub origin: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        if self.resized.replace(false) {
            if let Some(surface) = self.surface.as_mut() {
                let size = dom::sync_canvas_to_viewport(surface.canvas());
                surface.resize(size);
                self.coord.resize(size);
            }
        }

        let report = self.coord.tick(self.origin.elapsed());

        if let Some(scene) = self.scene.as_mut() {
            scene.apply(report.depth, self.coord.visuals());
        }
        if let Some(surface) = self.surface.as_mut() {
            self.coord.render_field(surface);
        }
        if let Some(body) = self.body.as_mut() {
            body.apply(&report);
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
