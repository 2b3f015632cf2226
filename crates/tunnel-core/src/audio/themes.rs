use super::backend::Waveform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lfo {
    pub freq: f32,
    pub depth: f32,
}

/// One drone voice: oscillator → gain → stereo pan, with optional tremolo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscSpec {
    pub freq: f32,
    pub waveform: Waveform,
    pub volume: f32,
    pub pan: f32,
    pub lfo: Option<Lfo>,
}

const fn voice(freq: f32, waveform: Waveform, volume: f32, pan: f32, lfo: Option<Lfo>) -> OscSpec {
    OscSpec {
        freq,
        waveform,
        volume,
        pan,
        lfo,
    }
}

const fn lfo(freq: f32, depth: f32) -> Option<Lfo> {
    Some(Lfo { freq, depth })
}

// C1 root with octave, C3 and a minor-third / fifth shimmer above.
pub const MAIN_VOICES: [OscSpec; 5] = [
    voice(32.70, Waveform::Triangle, 0.15, 0.0, lfo(0.1, 0.02)),
    voice(65.41, Waveform::Sine, 0.10, 0.0, lfo(0.05, 0.02)),
    voice(130.81, Waveform::Sine, 0.05, 0.3, lfo(0.2, 0.03)),
    voice(155.56, Waveform::Sine, 0.04, -0.3, lfo(0.15, 0.03)),
    voice(196.00, Waveform::Sine, 0.04, 0.2, lfo(0.1, 0.03)),
];

// A1 drone with a beating semitone pair.
pub const CHOICE_VOICES: [OscSpec; 4] = [
    voice(55.00, Waveform::Sine, 0.2, 0.0, None),
    voice(110.00, Waveform::Triangle, 0.05, -0.2, None),
    voice(116.54, Waveform::Sine, 0.02, 0.3, lfo(8.0, 0.01)),
    voice(164.81, Waveform::Sine, 0.02, -0.3, lfo(5.0, 0.01)),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Main,
    Choice,
}

impl Theme {
    pub fn voices(self) -> &'static [OscSpec] {
        match self {
            Theme::Main => &MAIN_VOICES,
            Theme::Choice => &CHOICE_VOICES,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Theme::Main => Theme::Choice,
            Theme::Choice => Theme::Main,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Main => "main",
            Theme::Choice => "choice",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(Theme::Main),
            "choice" => Ok(Theme::Choice),
            other => Err(format!("unknown theme '{other}' (expected main or choice)")),
        }
    }
}

/// A one-shot tone layered over the drone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transient {
    pub freq: f32,
    pub waveform: Waveform,
    pub peak: f32,
    /// Total length in seconds, attack included.
    pub duration: f64,
}

pub const NOVA_THUMP: Transient = Transient {
    freq: 48.0,
    waveform: Waveform::Sine,
    peak: 0.35,
    duration: 0.6,
};

pub const GLITCH_BLIP: Transient = Transient {
    freq: 1318.5,
    waveform: Waveform::Square,
    peak: 0.04,
    duration: 0.09,
};
