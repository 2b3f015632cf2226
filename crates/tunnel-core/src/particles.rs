//! Vortex particle field.
//!
//! A fixed pool of particles orbiting the viewport center. In normal mode each
//! particle feels a weak pull toward the center plus a stronger perpendicular
//! swirl; while a burst is active the pull flips into a large outward impulse.
//! Particles are recycled in place, so the pool never reallocates after
//! construction.

use crate::constants::*;
use crate::surface::{Rgba, Surface};
use glam::Vec2;
use rand::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleColor {
    Cyan,
    Ash,
}

impl ParticleColor {
    pub fn rgba(self) -> Rgba {
        match self {
            ParticleColor::Cyan => Rgba::new(0.0, 1.0, 1.0, 1.0),
            ParticleColor::Ash => Rgba::new(0x55 as f32 / 255.0, 0x55 as f32 / 255.0, 0x55 as f32 / 255.0, 1.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub prev: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub color: ParticleColor,
}

impl Particle {
    pub fn spawn<R: Rng + ?Sized>(viewport: Vec2, rng: &mut R) -> Self {
        let mut p = Self {
            pos: Vec2::ZERO,
            prev: Vec2::ZERO,
            vel: Vec2::ZERO,
            life: 0.0,
            color: ParticleColor::Cyan,
        };
        p.respawn(viewport, rng);
        p
    }

    /// Re-randomize in place.
    pub fn respawn<R: Rng + ?Sized>(&mut self, viewport: Vec2, rng: &mut R) {
        self.pos = Vec2::new(rng.gen::<f32>() * viewport.x, rng.gen::<f32>() * viewport.y);
        self.prev = self.pos;
        self.vel = Vec2::new((rng.gen::<f32>() - 0.5) * 2.0, (rng.gen::<f32>() - 0.5) * 2.0);
        self.life = rng.gen::<f32>() * LIFE_SPAN + LIFE_MIN;
        self.color = if rng.gen::<f32>() > 0.5 {
            ParticleColor::Cyan
        } else {
            ParticleColor::Ash
        };
    }

    /// One integration step. Returns `true` when the particle must respawn.
    ///
    /// The absorb test uses the distance measured before moving.
    pub fn advance(&mut self, center: Vec2, burst: bool, viewport_width: f32) -> bool {
        self.prev = self.pos;
        let to_center = center - self.pos;
        let dist = to_center.length();
        let angle = to_center.y.atan2(to_center.x);
        let (sin, cos) = angle.sin_cos();

        if burst {
            self.vel -= Vec2::new(cos, sin) * BURST_IMPULSE;
        } else {
            self.vel += Vec2::new(cos, sin) * ATTRACTION;
            self.vel += Vec2::new(-sin, cos) * SWIRL;
        }
        self.vel *= VELOCITY_DAMPING;
        self.pos += self.vel;
        self.life -= 1.0;

        dist < ABSORB_RADIUS || self.life < 0.0 || (self.pos.x - center.x).abs() > viewport_width
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    viewport: Vec2,
    center: Vec2,
    burst: bool,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(count: usize, viewport: Vec2, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let particles = (0..count).map(|_| Particle::spawn(viewport, &mut rng)).collect();
        log::debug!("[vortex] {} particles in {}x{}", count, viewport.x, viewport.y);
        Self {
            particles,
            viewport,
            center: viewport * 0.5,
            burst: false,
            rng,
        }
    }

    /// Track a new viewport; live particles keep their positions.
    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.center = viewport * 0.5;
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn trigger_burst(&mut self) {
        self.burst = true;
    }

    pub fn end_burst(&mut self) {
        self.burst = false;
    }

    pub fn is_bursting(&self) -> bool {
        self.burst
    }

    pub fn update(&mut self) {
        let (center, burst, vp) = (self.center, self.burst, self.viewport);
        for p in self.particles.iter_mut() {
            if p.advance(center, burst, vp.x) {
                p.respawn(vp, &mut self.rng);
            }
        }
    }

    /// Fade the previous frame, then stroke each particle's last move.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.fill_rect(Vec2::ZERO, surface.size(), Rgba::new(0.0, 0.0, 0.0, TRAIL_FADE_ALPHA));
        for p in &self.particles {
            surface.line(p.prev, p.pos, p.color.rgba(), 1.0);
        }
    }
}
