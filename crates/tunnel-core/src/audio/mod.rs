//! Procedural drone synthesis over an abstract node-graph backend.
//!
//! The engine owns a master fade bus and the node groups of the theme that is
//! currently sounding. Starting fades the bus in; stopping fades it out and
//! moves the groups to a fading set that the owner reaps once the ramp has
//! finished (see [`REAP_DELAY_MS`](crate::constants::REAP_DELAY_MS)).
//!
//! Backend failures never reach callers: the engine logs them and skips the
//! affected voice. A backend that cannot be acquired disables audio for the
//! lifetime of the engine.

pub mod backend;
pub mod envelope;
pub mod soft;
pub mod themes;

pub use backend::{AudioBackend, BackendState, Waveform};
pub use envelope::{Automation, Ramp};
pub use soft::{SoftBackend, SoftNode};
pub use themes::{OscSpec, Theme, Transient, CHOICE_VOICES, GLITCH_BLIP, MAIN_VOICES, NOVA_THUMP};

use crate::constants::*;
use crate::error::AudioError;
use rand::prelude::*;
use smallvec::SmallVec;

/// The nodes making up one voice: sources to start/stop and every node to
/// disconnect on teardown.
#[derive(Clone, Debug)]
pub struct NodeGroup<N> {
    pub sources: SmallVec<[N; 2]>,
    pub nodes: SmallVec<[N; 6]>,
}

impl<N> Default for NodeGroup<N> {
    fn default() -> Self {
        Self {
            sources: SmallVec::new(),
            nodes: SmallVec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    /// Faded out, groups awaiting reap.
    Stopping,
}

type Acquire<B> = Box<dyn FnOnce() -> Result<B, AudioError>>;

enum BackendSlot<B: AudioBackend> {
    Pending(Acquire<B>),
    Ready { backend: B, master: B::Node },
    Unavailable,
}

pub struct SynthesisEngine<B: AudioBackend> {
    slot: BackendSlot<B>,
    state: PlaybackState,
    theme: Theme,
    master_level: f32,
    active: Vec<NodeGroup<B::Node>>,
    fading: Vec<NodeGroup<B::Node>>,
    transients: Vec<(NodeGroup<B::Node>, f64)>,
    rng: StdRng,
}

impl<B: AudioBackend> SynthesisEngine<B> {
    /// `acquire` runs on the first `start` only.
    pub fn new(
        acquire: impl FnOnce() -> Result<B, AudioError> + 'static,
        master_level: f32,
        seed: u64,
    ) -> Self {
        Self {
            slot: BackendSlot::Pending(Box::new(acquire)),
            state: PlaybackState::Idle,
            theme: Theme::Main,
            master_level: master_level.clamp(0.0, 1.0),
            active: Vec::new(),
            fading: Vec::new(),
            transients: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn active_groups(&self) -> &[NodeGroup<B::Node>] {
        &self.active
    }

    pub fn fading_groups(&self) -> &[NodeGroup<B::Node>] {
        &self.fading
    }

    pub fn transient_count(&self) -> usize {
        self.transients.len()
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.slot, BackendSlot::Unavailable)
    }

    pub fn backend(&self) -> Option<&B> {
        match &self.slot {
            BackendSlot::Ready { backend, .. } => Some(backend),
            _ => None,
        }
    }

    /// Current master bus level, if a backend is up.
    pub fn master_gain(&self) -> Option<f32> {
        match &self.slot {
            BackendSlot::Ready { backend, master } => Some(backend.gain_value(master)),
            _ => None,
        }
    }

    fn ensure_backend(&mut self) -> bool {
        match std::mem::replace(&mut self.slot, BackendSlot::Unavailable) {
            BackendSlot::Pending(acquire) => {
                let ready = acquire().and_then(|mut backend| {
                    let master = backend.create_gain(0.0)?;
                    let dest = backend.destination();
                    backend.connect(&master, &dest)?;
                    Ok((backend, master))
                });
                match ready {
                    Ok((backend, master)) => {
                        log::info!("[audio] backend acquired at {} Hz", backend.sample_rate());
                        self.slot = BackendSlot::Ready { backend, master };
                    }
                    Err(e) => log::warn!("[audio] {e}; continuing silently"),
                }
            }
            other => self.slot = other,
        }
        matches!(self.slot, BackendSlot::Ready { .. })
    }

    /// Fade in `theme`. No-op while already playing.
    pub fn start(&mut self, theme: Theme) {
        if self.is_playing() || !self.ensure_backend() {
            return;
        }
        // Restarted before the reap ran: release the old graph right away.
        if self.state == PlaybackState::Stopping {
            self.reap();
        }
        let BackendSlot::Ready { backend, master } = &mut self.slot else {
            return;
        };
        if backend.state() == BackendState::Suspended {
            backend.resume();
        }
        let now = backend.current_time();
        for spec in theme.voices() {
            let mut group = NodeGroup::default();
            match build_voice(backend, master, spec, now, &mut group) {
                Ok(()) => self.active.push(group),
                Err(e) => {
                    log::warn!("[audio] skipping {:.2} Hz voice: {e}", spec.freq);
                    teardown(backend, &group, now);
                }
            }
        }
        backend.cancel_ramps(master, now);
        backend.ramp_gain(master, Ramp::new(0.0, self.master_level, now, FADE_IN_SEC));
        self.theme = theme;
        self.state = PlaybackState::Playing;
        log::info!("[audio] theme '{}' started with {} voices", theme, self.active.len());
    }

    /// Fade the master bus out. Returns `true` if a reap is now owed.
    pub fn stop(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        let BackendSlot::Ready { backend, master } = &mut self.slot else {
            return false;
        };
        let now = backend.current_time();
        let current = backend.gain_value(master);
        backend.cancel_ramps(master, now);
        backend.ramp_gain(master, Ramp::new(current, 0.0, now, FADE_OUT_SEC));
        self.fading.append(&mut self.active);
        self.state = PlaybackState::Stopping;
        log::info!("[audio] fading out {} voices", self.fading.len());
        true
    }

    /// Stop and disconnect every group left over from the last `stop`.
    pub fn reap(&mut self) {
        if self.fading.is_empty() {
            if self.state == PlaybackState::Stopping {
                self.state = PlaybackState::Idle;
            }
            return;
        }
        if let BackendSlot::Ready { backend, .. } = &mut self.slot {
            let now = backend.current_time();
            for group in &self.fading {
                teardown(backend, group, now);
            }
        }
        log::debug!("[audio] reaped {} voices", self.fading.len());
        self.fading.clear();
        if self.state == PlaybackState::Stopping {
            self.state = PlaybackState::Idle;
        }
    }

    /// Add a looping low-passed noise bed at `volume`. Only while playing.
    pub fn create_noise(&mut self, volume: f32) -> bool {
        if !self.is_playing() {
            return false;
        }
        let BackendSlot::Ready { backend, master } = &mut self.slot else {
            return false;
        };
        let len = (backend.sample_rate() * NOISE_BUFFER_SEC) as usize;
        let samples: Vec<f32> = (0..len).map(|_| self.rng.gen::<f32>() * 2.0 - 1.0).collect();
        let now = backend.current_time();
        let mut group = NodeGroup::default();
        match build_noise(backend, master, samples, volume, now, &mut group) {
            Ok(()) => {
                self.active.push(group);
                log::info!("[audio] wind layer at {volume}");
                true
            }
            Err(e) => {
                log::warn!("[audio] wind layer failed: {e}");
                teardown(backend, &group, now);
                false
            }
        }
    }

    /// Play a one-shot tone through the master bus. Only while playing.
    pub fn play_transient(&mut self, tone: Transient) -> bool {
        if !self.is_playing() {
            return false;
        }
        let BackendSlot::Ready { backend, master } = &mut self.slot else {
            return false;
        };
        let t0 = backend.current_time() + TRANSIENT_LEAD_SEC;
        let mut group = NodeGroup::default();
        match build_transient(backend, master, tone, t0, &mut group) {
            Ok(end) => {
                self.transients.push((group, end));
                true
            }
            Err(e) => {
                log::warn!("[audio] transient failed: {e}");
                teardown(backend, &group, t0);
                false
            }
        }
    }

    /// Disconnect transients whose release has passed on the backend clock.
    pub fn collect_finished(&mut self) {
        let BackendSlot::Ready { backend, .. } = &mut self.slot else {
            return;
        };
        let now = backend.current_time();
        self.transients.retain(|(group, end)| {
            if *end <= now {
                teardown(backend, group, now);
                false
            } else {
                true
            }
        });
    }
}

fn build_voice<B: AudioBackend>(
    backend: &mut B,
    master: &B::Node,
    spec: &OscSpec,
    now: f64,
    group: &mut NodeGroup<B::Node>,
) -> Result<(), AudioError> {
    let osc = backend.create_oscillator(spec.waveform, spec.freq)?;
    group.sources.push(osc.clone());
    group.nodes.push(osc.clone());
    let gain = backend.create_gain(spec.volume)?;
    group.nodes.push(gain.clone());
    let pan = backend.create_stereo_panner(spec.pan)?;
    group.nodes.push(pan.clone());

    backend.connect(&osc, &gain)?;
    backend.connect(&gain, &pan)?;
    backend.connect(&pan, master)?;

    if let Some(lfo) = spec.lfo.filter(|l| l.freq > 0.0) {
        let mod_osc = backend.create_oscillator(Waveform::Sine, lfo.freq)?;
        group.sources.push(mod_osc.clone());
        group.nodes.push(mod_osc.clone());
        let depth = backend.create_gain(lfo.depth)?;
        group.nodes.push(depth.clone());
        backend.connect(&mod_osc, &depth)?;
        backend.connect_to_gain(&depth, &gain)?;
    }
    for src in &group.sources {
        backend.start(src, now);
    }
    Ok(())
}

fn build_noise<B: AudioBackend>(
    backend: &mut B,
    master: &B::Node,
    samples: Vec<f32>,
    volume: f32,
    now: f64,
    group: &mut NodeGroup<B::Node>,
) -> Result<(), AudioError> {
    let src = backend.create_noise_source(samples)?;
    group.sources.push(src.clone());
    group.nodes.push(src.clone());
    let filter = backend.create_lowpass(NOISE_CUTOFF_HZ)?;
    group.nodes.push(filter.clone());
    let gain = backend.create_gain(volume)?;
    group.nodes.push(gain.clone());

    backend.connect(&src, &filter)?;
    backend.connect(&filter, &gain)?;
    backend.connect(&gain, master)?;
    backend.start(&src, now);
    Ok(())
}

/// Returns the time at which the tone has fully released.
fn build_transient<B: AudioBackend>(
    backend: &mut B,
    master: &B::Node,
    tone: Transient,
    t0: f64,
    group: &mut NodeGroup<B::Node>,
) -> Result<f64, AudioError> {
    let osc = backend.create_oscillator(tone.waveform, tone.freq)?;
    group.sources.push(osc.clone());
    group.nodes.push(osc.clone());
    let env = backend.create_gain(0.0)?;
    group.nodes.push(env.clone());
    backend.connect(&osc, &env)?;
    backend.connect(&env, master)?;

    let attack = TRANSIENT_ATTACK_SEC.min(tone.duration);
    let end = t0 + tone.duration;
    backend.ramp_gain(&env, Ramp::new(0.0, tone.peak, t0, attack));
    backend.ramp_gain(&env, Ramp::new(tone.peak, 0.0, t0 + attack, tone.duration - attack));
    backend.start(&osc, t0);
    backend.stop(&osc, end);
    Ok(end)
}

fn teardown<B: AudioBackend>(backend: &mut B, group: &NodeGroup<B::Node>, now: f64) {
    for src in &group.sources {
        backend.stop(src, now);
    }
    for node in &group.nodes {
        backend.disconnect(node);
    }
}
