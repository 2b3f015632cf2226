//! Runtime configuration shared by the front-ends.
//!
//! Every section carries `#[serde(default)]`, so a TOML file only needs the
//! keys it wants to override:
//!
//! ```toml
//! seed = 7
//!
//! [particles]
//! count = 600
//!
//! [audio]
//! theme = "choice"
//! wind_volume = 0.05
//! ```

use crate::audio::Theme;
use crate::constants::{DEFAULT_PARTICLE_COUNT, MASTER_LEVEL, MAX_DEPTH, SCROLL_GAIN};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    /// Base seed for every random stream (camera, particles, noise buffers).
    pub seed: u64,
    pub camera: CameraConfig,
    pub particles: ParticleConfig,
    pub audio: AudioConfig,
    pub collapse: CollapseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub max_depth: f32,
    pub scroll_gain: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub theme: Theme,
    pub master_level: f32,
    /// Level of the optional low-passed noise layer; `None` disables it.
    pub wind_volume: Option<f32>,
    pub muted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    /// Where the shell navigates once the collapse transition completes.
    pub target: String,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            camera: CameraConfig::default(),
            particles: ParticleConfig::default(),
            audio: AudioConfig::default(),
            collapse: CollapseConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            scroll_gain: SCROLL_GAIN,
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_PARTICLE_COUNT,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Main,
            master_level: MASTER_LEVEL,
            wind_volume: None,
            muted: false,
        }
    }
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            target: "contact.html".to_string(),
        }
    }
}

impl TunnelConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let cfg: TunnelConfig = toml::from_str(src)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.camera.max_depth.is_finite() && self.camera.max_depth > 0.0) {
            return Err(ConfigError::Invalid {
                field: "camera.max_depth",
                expected: "a positive number",
            });
        }
        if !(self.camera.scroll_gain.is_finite() && self.camera.scroll_gain > 0.0) {
            return Err(ConfigError::Invalid {
                field: "camera.scroll_gain",
                expected: "a positive number",
            });
        }
        if !(1..=20_000).contains(&self.particles.count) {
            return Err(ConfigError::Invalid {
                field: "particles.count",
                expected: "between 1 and 20000",
            });
        }
        if !(0.0..=1.0).contains(&self.audio.master_level) {
            return Err(ConfigError::Invalid {
                field: "audio.master_level",
                expected: "within [0, 1]",
            });
        }
        if let Some(v) = self.audio.wind_volume {
            if !(0.0..=1.0).contains(&v) {
                return Err(ConfigError::Invalid {
                    field: "audio.wind_volume",
                    expected: "within [0, 1]",
                });
            }
        }
        Ok(())
    }
}
