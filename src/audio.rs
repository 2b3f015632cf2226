use tunnel_core::audio::{AudioBackend, BackendState, Ramp, Waveform};
use tunnel_core::AudioError;
use web_sys as web;

/// Handle to any node the engine creates on a WebAudio context.
#[derive(Clone)]
pub enum WebNode {
    Destination(web::AudioDestinationNode),
    Oscillator(web::OscillatorNode),
    Gain(web::GainNode),
    Panner(web::StereoPannerNode),
    Filter(web::BiquadFilterNode),
    Buffer(web::AudioBufferSourceNode),
}

impl WebNode {
    fn audio_node(&self) -> &web::AudioNode {
        match self {
            WebNode::Destination(n) => n.as_ref(),
            WebNode::Oscillator(n) => n.as_ref(),
            WebNode::Gain(n) => n.as_ref(),
            WebNode::Panner(n) => n.as_ref(),
            WebNode::Filter(n) => n.as_ref(),
            WebNode::Buffer(n) => n.as_ref(),
        }
    }

    fn scheduled(&self) -> Option<&web::AudioScheduledSourceNode> {
        match self {
            WebNode::Oscillator(n) => Some(n.as_ref()),
            WebNode::Buffer(n) => Some(n.as_ref()),
            _ => None,
        }
    }

    fn gain_param(&self) -> Option<web::AudioParam> {
        match self {
            WebNode::Gain(g) => Some(g.gain()),
            _ => None,
        }
    }
}

pub struct WebAudioBackend {
    ctx: web::AudioContext,
}

impl WebAudioBackend {
    /// Create the context. Browsers hand it out suspended until a gesture.
    pub fn acquire() -> Result<Self, AudioError> {
        let ctx = web::AudioContext::new().map_err(|e| AudioError::Unavailable(format!("{:?}", e)))?;
        Ok(Self { ctx })
    }
}

fn oscillator_type(waveform: Waveform) -> web::OscillatorType {
    match waveform {
        Waveform::Sine => web::OscillatorType::Sine,
        Waveform::Square => web::OscillatorType::Square,
        Waveform::Saw => web::OscillatorType::Sawtooth,
        Waveform::Triangle => web::OscillatorType::Triangle,
    }
}

impl AudioBackend for WebAudioBackend {
    type Node = WebNode;

    fn state(&self) -> BackendState {
        match self.ctx.state() {
            web::AudioContextState::Running => BackendState::Running,
            _ => BackendState::Suspended,
        }
    }

    fn resume(&mut self) {
        _ = self.ctx.resume();
    }

    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate()
    }

    fn destination(&self) -> WebNode {
        WebNode::Destination(self.ctx.destination())
    }

    fn create_oscillator(&mut self, waveform: Waveform, freq: f32) -> Result<WebNode, AudioError> {
        let osc = self
            .ctx
            .create_oscillator()
            .map_err(|e| AudioError::node("oscillator", format!("{:?}", e)))?;
        osc.set_type(oscillator_type(waveform));
        osc.frequency().set_value(freq);
        Ok(WebNode::Oscillator(osc))
    }

    fn create_gain(&mut self, value: f32) -> Result<WebNode, AudioError> {
        let g = self
            .ctx
            .create_gain()
            .map_err(|e| AudioError::node("gain", format!("{:?}", e)))?;
        g.gain().set_value(value);
        Ok(WebNode::Gain(g))
    }

    fn create_stereo_panner(&mut self, pan: f32) -> Result<WebNode, AudioError> {
        let p = self
            .ctx
            .create_stereo_panner()
            .map_err(|e| AudioError::node("stereo panner", format!("{:?}", e)))?;
        p.pan().set_value(pan);
        Ok(WebNode::Panner(p))
    }

    fn create_lowpass(&mut self, cutoff_hz: f32) -> Result<WebNode, AudioError> {
        let f = self
            .ctx
            .create_biquad_filter()
            .map_err(|e| AudioError::node("biquad filter", format!("{:?}", e)))?;
        f.set_type(web::BiquadFilterType::Lowpass);
        f.frequency().set_value(cutoff_hz);
        Ok(WebNode::Filter(f))
    }

    fn create_noise_source(&mut self, mut samples: Vec<f32>) -> Result<WebNode, AudioError> {
        let buffer = self
            .ctx
            .create_buffer(1, samples.len() as u32, self.ctx.sample_rate())
            .map_err(|e| AudioError::node("audio buffer", format!("{:?}", e)))?;
        buffer
            .copy_to_channel(&mut samples, 0)
            .map_err(|e| AudioError::node("audio buffer", format!("{:?}", e)))?;
        let src = self
            .ctx
            .create_buffer_source()
            .map_err(|e| AudioError::node("buffer source", format!("{:?}", e)))?;
        src.set_buffer(Some(&buffer));
        src.set_loop(true);
        Ok(WebNode::Buffer(src))
    }

    fn connect(&mut self, from: &WebNode, to: &WebNode) -> Result<(), AudioError> {
        from.audio_node()
            .connect_with_audio_node(to.audio_node())
            .map(|_| ())
            .map_err(|e| AudioError::Connect(format!("{:?}", e)))
    }

    fn connect_to_gain(&mut self, from: &WebNode, gain: &WebNode) -> Result<(), AudioError> {
        let param = gain
            .gain_param()
            .ok_or_else(|| AudioError::Connect("target is not a gain node".into()))?;
        from.audio_node()
            .connect_with_audio_param(&param)
            .map_err(|e| AudioError::Connect(format!("{:?}", e)))
    }

    fn start(&mut self, source: &WebNode, when: f64) {
        if let Some(s) = source.scheduled() {
            _ = s.start_with_when(when);
        }
    }

    fn stop(&mut self, source: &WebNode, when: f64) {
        if let Some(s) = source.scheduled() {
            _ = s.stop_with_when(when);
        }
    }

    fn disconnect(&mut self, node: &WebNode) {
        _ = node.audio_node().disconnect();
    }

    fn gain_value(&self, gain: &WebNode) -> f32 {
        gain.gain_param().map(|p| p.value()).unwrap_or(0.0)
    }

    fn cancel_ramps(&mut self, gain: &WebNode, from: f64) {
        if let Some(p) = gain.gain_param() {
            // Cancelling a ramp mid-flight snaps back to the prior event; pin
            // the value reached so far instead.
            let held = p.value();
            _ = p.cancel_scheduled_values(from);
            _ = p.set_value_at_time(held, from);
        }
    }

    fn ramp_gain(&mut self, gain: &WebNode, ramp: Ramp) {
        if let Some(p) = gain.gain_param() {
            _ = p.set_value_at_time(ramp.from, ramp.start);
            _ = p.linear_ramp_to_value_at_time(ramp.to, ramp.end());
        }
    }
}
