//! Composition root for one tunnel session.
//!
//! The coordinator builds the camera, particle field and synthesis engine
//! once and runs them from a single `tick` per frame. Front-ends talk to it
//! only through an [`EffectHandle`]; timed follow-ups (burst end, glitch
//! clear, audio reap, navigation) go through a [`TaskTable`].

use crate::audio::{AudioBackend, SynthesisEngine, Theme, GLITCH_BLIP, NOVA_THUMP};
use crate::camera::{ScrollCamera, Section, SectionVisual};
use crate::config::TunnelConfig;
use crate::constants::{BURST_MS, COLLAPSE_MS, GLITCH_MS, REAP_DELAY_MS};
use crate::effects::{Command, EffectEvent, EffectHandle};
use crate::error::AudioError;
use crate::particles::ParticleField;
use crate::schedule::{TaskKey, TaskTable};
use crate::surface::Surface;
use crate::transition::collapse_progress;
use glam::Vec2;
use std::time::Duration;

/// What the front-end needs to present one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub depth: f32,
    pub invert: bool,
    pub glitch: bool,
    pub bursting: bool,
    /// Eased collapse progress once the collapse has begun.
    pub collapse_progress: Option<f32>,
    /// Set on the single frame where the collapse navigation fires.
    pub navigate: Option<String>,
}

pub struct EffectCoordinator<B: AudioBackend> {
    config: TunnelConfig,
    camera: ScrollCamera,
    field: Option<ParticleField>,
    audio: SynthesisEngine<B>,
    tasks: TaskTable<TaskKey>,
    handle: EffectHandle,
    sections: Vec<Section>,
    visuals: Vec<SectionVisual>,
    events: Vec<EffectEvent>,
    glitch: bool,
    audio_started: bool,
    collapse_started: Option<Duration>,
    pending_theme: Option<Theme>,
}

impl<B: AudioBackend> EffectCoordinator<B> {
    /// `viewport` is `None` when there is no vortex surface; the field is
    /// then skipped and everything else runs as usual.
    pub fn new(
        config: TunnelConfig,
        sections: Vec<Section>,
        viewport: Option<Vec2>,
        acquire: impl FnOnce() -> Result<B, AudioError> + 'static,
    ) -> Self {
        Self::with_handle(config, sections, viewport, EffectHandle::new(), acquire)
    }

    /// Like [`new`](Self::new), reading commands from an existing handle
    /// that input wiring was given before the session was built.
    pub fn with_handle(
        config: TunnelConfig,
        sections: Vec<Section>,
        viewport: Option<Vec2>,
        handle: EffectHandle,
        acquire: impl FnOnce() -> Result<B, AudioError> + 'static,
    ) -> Self {
        let seed = config.seed;
        let camera = ScrollCamera::new(config.camera.max_depth, config.camera.scroll_gain, seed);
        let field = viewport.map(|vp| ParticleField::new(config.particles.count, vp, seed ^ 0x9E37_79B9_7F4A_7C15));
        let audio = SynthesisEngine::new(acquire, config.audio.master_level, seed.wrapping_add(1));
        log::info!(
            "[effects] {} sections, vortex {}, seed {}",
            sections.len(),
            if field.is_some() { "on" } else { "off" },
            seed
        );
        Self {
            config,
            camera,
            field,
            audio,
            tasks: TaskTable::new(),
            handle,
            visuals: Vec::with_capacity(sections.len()),
            sections,
            events: Vec::new(),
            glitch: false,
            audio_started: false,
            collapse_started: None,
            pending_theme: None,
        }
    }

    pub fn handle(&self) -> EffectHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &TunnelConfig {
        &self.config
    }

    pub fn camera(&self) -> &ScrollCamera {
        &self.camera
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn audio(&self) -> &SynthesisEngine<B> {
        &self.audio
    }

    pub fn tasks(&self) -> &TaskTable<TaskKey> {
        &self.tasks
    }

    pub fn visuals(&self) -> &[SectionVisual] {
        &self.visuals
    }

    pub fn is_glitching(&self) -> bool {
        self.glitch
    }

    pub fn is_collapsing(&self) -> bool {
        self.collapse_started.is_some()
    }

    pub fn resize(&mut self, viewport: Vec2) {
        if let Some(field) = self.field.as_mut() {
            field.resize(viewport);
        }
    }

    pub fn render_field<S: Surface + ?Sized>(&self, surface: &mut S) {
        if let Some(field) = &self.field {
            field.render(surface);
        }
    }

    /// Advance one frame. `now` is measured from any fixed origin.
    pub fn tick(&mut self, now: Duration) -> FrameReport {
        for command in self.handle.drain() {
            self.apply(command, now);
        }

        let mut navigate = None;
        for task in self.tasks.drain_due(now) {
            match task {
                TaskKey::BurstEnd => {
                    if let Some(field) = self.field.as_mut() {
                        field.end_burst();
                    }
                }
                TaskKey::GlitchEnd => self.glitch = false,
                TaskKey::AudioReap => {
                    self.audio.reap();
                    if let Some(theme) = self.pending_theme.take() {
                        self.start_audio(theme);
                    }
                }
                TaskKey::Navigate => {
                    log::info!("[effects] navigating to {}", self.config.collapse.target);
                    navigate = Some(self.config.collapse.target.clone());
                }
            }
        }

        self.camera.step(&mut self.events);
        for event in std::mem::take(&mut self.events) {
            self.dispatch(event, now);
        }

        if let Some(field) = self.field.as_mut() {
            field.update();
        }
        self.camera.render_sections(&self.sections, &mut self.visuals);
        self.audio.collect_finished();

        FrameReport {
            depth: self.camera.depth(),
            invert: self.camera.invert_mode(),
            glitch: self.glitch,
            bursting: self.field.as_ref().is_some_and(|f| f.is_bursting()),
            collapse_progress: self.collapse_started.map(|t0| collapse_progress(now.saturating_sub(t0))),
            navigate,
        }
    }

    fn apply(&mut self, command: Command, now: Duration) {
        match command {
            Command::Scroll(delta) => self.camera.apply_scroll(delta),
            Command::Gesture => self.on_gesture(),
            Command::Effect(event) => self.events.push(event),
            Command::Collapse => self.collapse(now),
            Command::ToggleTheme => self.switch_theme(self.config.audio.theme.other(), now),
        }
    }

    fn dispatch(&mut self, event: EffectEvent, now: Duration) {
        match event {
            EffectEvent::Glitch => {
                self.glitch = true;
                self.tasks.schedule(TaskKey::GlitchEnd, now + Duration::from_millis(GLITCH_MS));
                self.audio.play_transient(GLITCH_BLIP);
            }
            EffectEvent::Nova => {
                if let Some(field) = self.field.as_mut() {
                    field.trigger_burst();
                }
                self.tasks.schedule(TaskKey::BurstEnd, now + Duration::from_millis(BURST_MS));
                self.audio.play_transient(NOVA_THUMP);
            }
        }
    }

    fn on_gesture(&mut self) {
        if self.audio_started {
            return;
        }
        self.audio_started = true;
        if self.config.audio.muted {
            log::info!("[gesture] audio muted by config");
            return;
        }
        self.start_audio(self.config.audio.theme);
    }

    fn start_audio(&mut self, theme: Theme) {
        self.audio.start(theme);
        if let Some(volume) = self.config.audio.wind_volume {
            self.audio.create_noise(volume);
        }
    }

    /// Fade out the current theme and bring up `theme` after the reap.
    pub fn switch_theme(&mut self, theme: Theme, now: Duration) {
        if self.collapse_started.is_some() {
            return;
        }
        self.config.audio.theme = theme;
        if self.audio.stop() {
            self.tasks.schedule(TaskKey::AudioReap, now + Duration::from_millis(REAP_DELAY_MS));
            self.pending_theme = Some(theme);
        } else if self.tasks.is_pending(TaskKey::AudioReap) {
            self.pending_theme = Some(theme);
        } else if self.audio_started && !self.config.audio.muted {
            self.start_audio(theme);
        }
        log::info!("[audio] switching to theme '{theme}'");
    }

    fn collapse(&mut self, now: Duration) {
        if self.collapse_started.is_some() {
            return;
        }
        log::info!("[effects] collapse begun");
        self.collapse_started = Some(now);
        // Nothing may restart audio from here on.
        self.audio_started = true;
        self.pending_theme = None;
        if self.audio.stop() {
            self.tasks.schedule(TaskKey::AudioReap, now + Duration::from_millis(REAP_DELAY_MS));
        }
        self.tasks.schedule(TaskKey::Navigate, now + Duration::from_millis(COLLAPSE_MS));
    }
}
