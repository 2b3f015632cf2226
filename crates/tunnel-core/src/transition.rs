//! Easing for the collapse transition.

use crate::constants::COLLAPSE_MS;
use std::time::Duration;

/// CSS-style `cubic-bezier(x1, y1, x2, y2)` timing function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

pub const COLLAPSE_EASE: CubicBezier = CubicBezier::new(0.8, 0.0, 0.2, 1.0);

impl CubicBezier {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn sample(a1: f32, a2: f32, s: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a1 + 3.0 * inv * s * s * a2 + s * s * s
    }

    fn slope(a1: f32, a2: f32, s: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * a1 + 6.0 * inv * s * (a2 - a1) + 3.0 * s * s * (1.0 - a2)
    }

    /// Solve for the curve parameter whose x equals `x`.
    fn solve_s(&self, x: f32) -> f32 {
        let mut s = x;
        for _ in 0..8 {
            let err = Self::sample(self.x1, self.x2, s) - x;
            if err.abs() < 1e-5 {
                return s;
            }
            let d = Self::slope(self.x1, self.x2, s);
            if d.abs() < 1e-6 {
                break;
            }
            s -= err / d;
        }
        // Newton stalled on a flat section; fall back to bisection.
        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        s = x;
        for _ in 0..32 {
            let v = Self::sample(self.x1, self.x2, s);
            if (v - x).abs() < 1e-5 {
                break;
            }
            if v < x {
                lo = s;
            } else {
                hi = s;
            }
            s = 0.5 * (lo + hi);
        }
        s
    }

    /// Eased output for linear progress `t`, clamped to `[0, 1]`.
    pub fn ease(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        Self::sample(self.y1, self.y2, self.solve_s(t)).clamp(0.0, 1.0)
    }
}

/// Eased collapse progress `elapsed` after the collapse began.
pub fn collapse_progress(elapsed: Duration) -> f32 {
    let t = elapsed.as_secs_f32() / Duration::from_millis(COLLAPSE_MS).as_secs_f32();
    COLLAPSE_EASE.ease(t)
}
