use glam::Vec2;
use tunnel_core::{Rgba, Surface};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Canvas2D target for the vortex trails.
pub struct CanvasSurface {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
    size: Vec2,
    stroke: Option<Rgba>,
    width: f32,
}

impl CanvasSurface {
    pub fn new(canvas: web::HtmlCanvasElement, size: Vec2) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(Self {
            canvas,
            ctx,
            size,
            stroke: None,
            width: 0.0,
        })
    }

    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    /// Resizing the backing store resets context state.
    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
        self.stroke = None;
        self.width = 0.0;
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    #[allow(deprecated)]
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        self.ctx.set_fill_style(&JsValue::from_str(&color.css()));
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    #[allow(deprecated)]
    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        if self.stroke != Some(color) {
            self.ctx.set_stroke_style(&JsValue::from_str(&color.css()));
            self.stroke = Some(color);
        }
        if self.width != width {
            self.ctx.set_line_width(width as f64);
            self.width = width;
        }
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }
}
