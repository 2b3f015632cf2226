use glam::Vec2;

/// Straight (non-premultiplied) RGBA color, components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba(...)` string for Canvas2D style setters.
    pub fn css(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("rgba({}, {}, {}, {})", c(self.r), c(self.g), c(self.b), self.a)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Minimal immediate-mode 2D drawing target the vortex renders into.
pub trait Surface {
    fn size(&self) -> Vec2;
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba);
    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);
}
