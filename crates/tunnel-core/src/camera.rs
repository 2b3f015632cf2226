//! Scroll-driven depth camera.
//!
//! Wheel input moves a clamped target depth; each frame the camera position
//! eases toward it with a first-order low-pass, which never quite arrives.
//! The camera also owns the distance-triggered random event roll and the
//! depth → section visibility mapping.

use crate::constants::*;
use crate::effects::EffectEvent;
use glam::Vec2;
use rand::prelude::*;

/// Depth state of the camera. `target_z` is always within `[0, max_z]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollState {
    pub z_pos: f32,
    pub target_z: f32,
    pub max_z: f32,
    pub last_trigger_z: f32,
}

impl ScrollState {
    pub fn new(max_z: f32) -> Self {
        Self {
            z_pos: 0.0,
            target_z: 0.0,
            max_z,
            last_trigger_z: 0.0,
        }
    }
}

/// A static element placed at a fixed depth offset (negative = further away).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Section {
    pub depth: f32,
}

/// Per-frame visual parameters for one section.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SectionVisual {
    pub view_z: f32,
    pub opacity: f32,
    pub offset: Vec2,
}

pub struct ScrollCamera {
    state: ScrollState,
    scroll_gain: f32,
    rng: StdRng,
}

impl ScrollCamera {
    pub fn new(max_z: f32, scroll_gain: f32, seed: u64) -> Self {
        Self {
            state: ScrollState::new(max_z),
            scroll_gain,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn depth(&self) -> f32 {
        self.state.z_pos
    }

    /// Apply a raw wheel delta to the target depth and clamp it.
    pub fn apply_scroll(&mut self, raw_delta: f32) {
        if !raw_delta.is_finite() {
            log::warn!("[camera] ignoring non-finite scroll delta");
            return;
        }
        let s = &mut self.state;
        s.target_z = (s.target_z + raw_delta * self.scroll_gain).clamp(0.0, s.max_z);
    }

    /// Advance one frame: ease toward the target and roll for a random event
    /// whenever the camera has travelled far enough since the last roll.
    pub fn step(&mut self, out_events: &mut Vec<EffectEvent>) {
        let s = &mut self.state;
        s.z_pos = smooth_toward(s.z_pos, s.target_z);
        if (s.z_pos - s.last_trigger_z).abs() > TRIGGER_DISTANCE {
            s.last_trigger_z = s.z_pos;
            let r: f32 = self.rng.gen();
            if let Some(ev) = roll_effect(r) {
                log::debug!("[camera] depth {:.0} rolled {:?}", s.z_pos, ev);
                out_events.push(ev);
            }
        }
    }

    pub fn invert_mode(&self) -> bool {
        is_invert_depth(self.state.z_pos)
    }

    /// Span of the jitter window for the current depth.
    pub fn jitter_span(&self) -> f32 {
        if self.state.z_pos > JITTER_DEEP_DEPTH {
            JITTER_DEEP
        } else {
            JITTER_SHALLOW
        }
    }

    /// Compute visibility and jitter for every section, replacing `out`.
    pub fn render_sections(&mut self, sections: &[Section], out: &mut Vec<SectionVisual>) {
        out.clear();
        let span = self.jitter_span();
        for sec in sections {
            let view_z = sec.depth + self.state.z_pos;
            let opacity = opacity_for_view_z(view_z);
            let mut offset = Vec2::ZERO;
            if opacity > JITTER_MIN_OPACITY && self.rng.gen::<f32>() < JITTER_CHANCE {
                offset = Vec2::new(
                    (self.rng.gen::<f32>() - 0.5) * span,
                    (self.rng.gen::<f32>() - 0.5) * span,
                );
            }
            out.push(SectionVisual {
                view_z,
                opacity,
                offset,
            });
        }
    }
}

/// One exponential smoothing step. Never overshoots `target`.
#[inline]
pub fn smooth_toward(current: f32, target: f32) -> f32 {
    current + (target - current) * DEPTH_SMOOTHING
}

/// Map a uniform draw in `[0, 1)` to the event it selects, if any.
#[inline]
pub fn roll_effect(r: f32) -> Option<EffectEvent> {
    if r < GLITCH_THRESHOLD {
        Some(EffectEvent::Glitch)
    } else if r < NOVA_THRESHOLD {
        Some(EffectEvent::Nova)
    } else {
        None
    }
}

#[inline]
pub fn is_invert_depth(z: f32) -> bool {
    z > INVERT_MIN_DEPTH && z < INVERT_MAX_DEPTH
}

/// Piecewise-linear opacity of a section at view depth `view_z`.
pub fn opacity_for_view_z(view_z: f32) -> f32 {
    let o = if view_z < FADE_IN_START {
        0.0
    } else if view_z < 0.0 {
        map_range(view_z, FADE_IN_START, 0.0, 0.0, 1.0)
    } else if view_z < FULL_OPACITY_END {
        1.0
    } else {
        // Keeps falling past FADE_OUT_END; the clamp pins it at zero.
        map_range(view_z, FULL_OPACITY_END, FADE_OUT_END, 1.0, 0.0)
    };
    o.clamp(0.0, 1.0)
}

#[inline]
fn map_range(value: f32, low1: f32, high1: f32, low2: f32, high2: f32) -> f32 {
    low2 + (high2 - low2) * (value - low1) / (high1 - low1)
}

/// Zero-padded depth counter, e.g. `00042`.
pub fn depth_readout(z: f32) -> String {
    format!("{:05}", z.round().max(0.0) as u32)
}
