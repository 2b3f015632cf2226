//! Sample-accurate software implementation of [`AudioBackend`].
//!
//! The graph lives behind an `Arc<Mutex<..>>` so the same backend can be
//! driven from the frame loop (building and automating nodes) and rendered
//! from an audio callback thread. Rendering pulls from the destination node,
//! evaluating each node at most once per frame.

use super::backend::{AudioBackend, BackendState, Waveform};
use super::envelope::{Automation, Ramp};
use crate::error::AudioError;
use fnv::FnvHashMap;
use smallvec::SmallVec;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoftNode(u32);

const DESTINATION: SoftNode = SoftNode(0);

enum Kind {
    Destination,
    Oscillator {
        waveform: Waveform,
        freq: f32,
        phase: f32,
        window: Window,
    },
    Gain(Automation),
    Panner(f32),
    Lowpass {
        alpha: f32,
        y: [f32; 2],
    },
    Buffer {
        samples: Vec<f32>,
        cursor: usize,
        window: Window,
    },
}

/// Start/stop times of a scheduled source.
#[derive(Clone, Copy, Default)]
struct Window {
    start: Option<f64>,
    stop: Option<f64>,
}

impl Window {
    fn sounding(&self, t: f64) -> bool {
        matches!(self.start, Some(s) if s <= t) && self.stop.map_or(true, |e| t < e)
    }
}

struct Slot {
    kind: Kind,
    inputs: SmallVec<[u32; 4]>,
    /// Nodes summed into this gain node's parameter.
    modulators: SmallVec<[u32; 2]>,
    stamp: u64,
    out: [f32; 2],
}

struct SoftGraph {
    sample_rate: f32,
    frame: u64,
    running: bool,
    next_id: u32,
    nodes: FnvHashMap<u32, Slot>,
}

impl SoftGraph {
    fn now(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    fn insert(&mut self, kind: Kind) -> SoftNode {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            Slot {
                kind,
                inputs: SmallVec::new(),
                modulators: SmallVec::new(),
                stamp: 0,
                out: [0.0; 2],
            },
        );
        SoftNode(id)
    }

    fn eval(&mut self, id: u32, stamp: u64, t: f64) -> [f32; 2] {
        let (inputs, modulators) = match self.nodes.get_mut(&id) {
            Some(slot) if slot.stamp == stamp => return slot.out,
            Some(slot) => {
                // Mark first so a cycle reads silence instead of recursing.
                slot.stamp = stamp;
                slot.out = [0.0; 2];
                (slot.inputs.clone(), slot.modulators.clone())
            }
            None => return [0.0; 2],
        };

        let mut sum = [0.0f32; 2];
        for i in inputs {
            let v = self.eval(i, stamp, t);
            sum[0] += v[0];
            sum[1] += v[1];
        }
        let mut modulation = 0.0f32;
        for m in modulators {
            let v = self.eval(m, stamp, t);
            modulation += 0.5 * (v[0] + v[1]);
        }

        let sr = self.sample_rate;
        let Some(slot) = self.nodes.get_mut(&id) else {
            return [0.0; 2];
        };
        let out = match &mut slot.kind {
            Kind::Destination => sum,
            Kind::Oscillator {
                waveform,
                freq,
                phase,
                window,
            } => {
                if window.sounding(t) {
                    let s = shape(*waveform, *phase);
                    *phase = (*phase + *freq / sr).fract();
                    [s, s]
                } else {
                    [0.0; 2]
                }
            }
            Kind::Gain(auto) => {
                let g = auto.value_at(t) + modulation;
                [sum[0] * g, sum[1] * g]
            }
            Kind::Panner(pan) => {
                let mono = 0.5 * (sum[0] + sum[1]);
                let x = (pan.clamp(-1.0, 1.0) + 1.0) * 0.5;
                [mono * (x * FRAC_PI_2).cos(), mono * (x * FRAC_PI_2).sin()]
            }
            Kind::Lowpass { alpha, y } => {
                y[0] += *alpha * (sum[0] - y[0]);
                y[1] += *alpha * (sum[1] - y[1]);
                *y
            }
            Kind::Buffer {
                samples,
                cursor,
                window,
            } => {
                if window.sounding(t) && !samples.is_empty() {
                    let s = samples[*cursor];
                    *cursor = (*cursor + 1) % samples.len();
                    [s, s]
                } else {
                    [0.0; 2]
                }
            }
        };
        slot.out = out;
        out
    }
}

fn shape(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (phase * TAU).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Saw => 2.0 * phase - 1.0,
        Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
    }
}

/// Cloneable handle; clones share one graph and one clock.
#[derive(Clone)]
pub struct SoftBackend {
    graph: Arc<Mutex<SoftGraph>>,
}

impl SoftBackend {
    pub fn new(sample_rate: f32) -> Self {
        let mut graph = SoftGraph {
            sample_rate: sample_rate.max(1.0),
            frame: 0,
            running: true,
            next_id: 0,
            nodes: FnvHashMap::default(),
        };
        graph.insert(Kind::Destination);
        Self {
            graph: Arc::new(Mutex::new(graph)),
        }
    }

    /// A backend that renders silence until `resume` is called.
    pub fn new_suspended(sample_rate: f32) -> Self {
        let backend = Self::new(sample_rate);
        backend.lock().running = false;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, SoftGraph> {
        self.graph.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Nodes currently in the graph, destination excluded.
    pub fn live_nodes(&self) -> usize {
        self.lock().nodes.len() - 1
    }

    /// Render interleaved frames into `out`, advancing the clock.
    ///
    /// Channels beyond the second get the mono mix. Suspended backends write
    /// silence and keep their clock still.
    pub fn render(&self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let mut g = self.lock();
        if !g.running {
            out.fill(0.0);
            return;
        }
        for frame in out.chunks_mut(channels) {
            let t = g.now();
            g.frame += 1;
            let stamp = g.frame;
            let [l, r] = g.eval(DESTINATION.0, stamp, t);
            let (l, r) = (l.clamp(-1.0, 1.0), r.clamp(-1.0, 1.0));
            for (c, sample) in frame.iter_mut().enumerate() {
                *sample = match (c, channels) {
                    (_, 1) => 0.5 * (l + r),
                    (0, _) => l,
                    (1, _) => r,
                    _ => 0.5 * (l + r),
                };
            }
        }
    }

    fn with_slot(&self, node: &SoftNode, f: impl FnOnce(&mut Slot)) {
        if let Some(slot) = self.lock().nodes.get_mut(&node.0) {
            f(slot);
        }
    }

    fn with_window(&self, node: &SoftNode, f: impl FnOnce(&mut Window)) {
        self.with_slot(node, |slot| match &mut slot.kind {
            Kind::Oscillator { window, .. } | Kind::Buffer { window, .. } => f(window),
            _ => {}
        });
    }
}

impl AudioBackend for SoftBackend {
    type Node = SoftNode;

    fn state(&self) -> BackendState {
        if self.lock().running {
            BackendState::Running
        } else {
            BackendState::Suspended
        }
    }

    fn resume(&mut self) {
        self.lock().running = true;
    }

    fn current_time(&self) -> f64 {
        self.lock().now()
    }

    fn sample_rate(&self) -> f32 {
        self.lock().sample_rate
    }

    fn destination(&self) -> SoftNode {
        DESTINATION
    }

    fn create_oscillator(&mut self, waveform: Waveform, freq: f32) -> Result<SoftNode, AudioError> {
        if !(freq.is_finite() && freq >= 0.0) {
            return Err(AudioError::node("oscillator", format!("bad frequency {freq}")));
        }
        Ok(self.lock().insert(Kind::Oscillator {
            waveform,
            freq,
            phase: 0.0,
            window: Window::default(),
        }))
    }

    fn create_gain(&mut self, value: f32) -> Result<SoftNode, AudioError> {
        Ok(self.lock().insert(Kind::Gain(Automation::new(value))))
    }

    fn create_stereo_panner(&mut self, pan: f32) -> Result<SoftNode, AudioError> {
        Ok(self.lock().insert(Kind::Panner(pan)))
    }

    fn create_lowpass(&mut self, cutoff_hz: f32) -> Result<SoftNode, AudioError> {
        let mut g = self.lock();
        let alpha = 1.0 - (-TAU * cutoff_hz / g.sample_rate).exp();
        Ok(g.insert(Kind::Lowpass {
            alpha: alpha.clamp(0.0, 1.0),
            y: [0.0; 2],
        }))
    }

    fn create_noise_source(&mut self, samples: Vec<f32>) -> Result<SoftNode, AudioError> {
        if samples.is_empty() {
            return Err(AudioError::node("buffer source", "empty buffer"));
        }
        Ok(self.lock().insert(Kind::Buffer {
            samples,
            cursor: 0,
            window: Window::default(),
        }))
    }

    fn connect(&mut self, from: &SoftNode, to: &SoftNode) -> Result<(), AudioError> {
        let mut g = self.lock();
        if !g.nodes.contains_key(&from.0) {
            return Err(AudioError::Connect(format!("unknown source node {}", from.0)));
        }
        match g.nodes.get_mut(&to.0) {
            Some(slot) => {
                if !slot.inputs.contains(&from.0) {
                    slot.inputs.push(from.0);
                }
                Ok(())
            }
            None => Err(AudioError::Connect(format!("unknown target node {}", to.0))),
        }
    }

    fn connect_to_gain(&mut self, from: &SoftNode, gain: &SoftNode) -> Result<(), AudioError> {
        let mut g = self.lock();
        if !g.nodes.contains_key(&from.0) {
            return Err(AudioError::Connect(format!("unknown modulator node {}", from.0)));
        }
        match g.nodes.get_mut(&gain.0) {
            Some(slot) if matches!(slot.kind, Kind::Gain(_)) => {
                if !slot.modulators.contains(&from.0) {
                    slot.modulators.push(from.0);
                }
                Ok(())
            }
            _ => Err(AudioError::Connect(format!("node {} has no gain parameter", gain.0))),
        }
    }

    fn start(&mut self, source: &SoftNode, when: f64) {
        self.with_window(source, |w| {
            if w.start.is_none() {
                w.start = Some(when);
            }
        });
    }

    fn stop(&mut self, source: &SoftNode, when: f64) {
        self.with_window(source, |w| w.stop = Some(when));
    }

    /// Removes the node and every edge touching it.
    fn disconnect(&mut self, node: &SoftNode) {
        if *node == DESTINATION {
            return;
        }
        let mut g = self.lock();
        if g.nodes.remove(&node.0).is_none() {
            return;
        }
        for slot in g.nodes.values_mut() {
            slot.inputs.retain(|i| *i != node.0);
            slot.modulators.retain(|i| *i != node.0);
        }
    }

    fn gain_value(&self, gain: &SoftNode) -> f32 {
        let g = self.lock();
        let t = g.now();
        match g.nodes.get(&gain.0).map(|s| &s.kind) {
            Some(Kind::Gain(auto)) => auto.value_at(t),
            _ => 0.0,
        }
    }

    fn cancel_ramps(&mut self, gain: &SoftNode, from: f64) {
        self.with_slot(gain, |slot| {
            if let Kind::Gain(auto) = &mut slot.kind {
                auto.cancel_from(from);
            }
        });
    }

    fn ramp_gain(&mut self, gain: &SoftNode, ramp: Ramp) {
        self.with_slot(gain, |slot| {
            if let Kind::Gain(auto) = &mut slot.kind {
                auto.push(ramp);
            }
        });
    }
}
