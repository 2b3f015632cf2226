use super::envelope::Ramp;
use crate::error::AudioError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Saw,
    Triangle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendState {
    Running,
    Suspended,
}

/// The node-graph primitives the synthesis engine is built on.
///
/// Mirrors the WebAudio model: nodes are created detached, wired with
/// `connect`, and gain parameters carry time-stamped linear ramps evaluated
/// on the backend's own clock. `Node` is a cheap handle.
pub trait AudioBackend {
    type Node: Clone;

    fn state(&self) -> BackendState;
    fn resume(&mut self);
    /// Seconds on the backend clock.
    fn current_time(&self) -> f64;
    fn sample_rate(&self) -> f32;
    fn destination(&self) -> Self::Node;

    fn create_oscillator(&mut self, waveform: Waveform, freq: f32) -> Result<Self::Node, AudioError>;
    fn create_gain(&mut self, value: f32) -> Result<Self::Node, AudioError>;
    fn create_stereo_panner(&mut self, pan: f32) -> Result<Self::Node, AudioError>;
    fn create_lowpass(&mut self, cutoff_hz: f32) -> Result<Self::Node, AudioError>;
    /// Looping mono buffer source.
    fn create_noise_source(&mut self, samples: Vec<f32>) -> Result<Self::Node, AudioError>;

    fn connect(&mut self, from: &Self::Node, to: &Self::Node) -> Result<(), AudioError>;
    /// Route `from` into the gain parameter of `gain` (amplitude modulation).
    fn connect_to_gain(&mut self, from: &Self::Node, gain: &Self::Node) -> Result<(), AudioError>;

    fn start(&mut self, source: &Self::Node, when: f64);
    fn stop(&mut self, source: &Self::Node, when: f64);
    fn disconnect(&mut self, node: &Self::Node);

    /// Current value of a gain node's parameter.
    fn gain_value(&self, gain: &Self::Node) -> f32;
    /// Drop every scheduled change at or after `from`, holding the value there.
    fn cancel_ramps(&mut self, gain: &Self::Node, from: f64);
    fn ramp_gain(&mut self, gain: &Self::Node, ramp: Ramp);
}
