pub mod audio;
pub mod camera;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod effects;
pub mod error;
pub mod particles;
pub mod schedule;
pub mod surface;
pub mod transition;

pub use audio::{AudioBackend, SoftBackend, SynthesisEngine, Theme};
pub use camera::{depth_readout, ScrollCamera, Section, SectionVisual};
pub use config::TunnelConfig;
pub use coordinator::{EffectCoordinator, FrameReport};
pub use effects::{Command, EffectEvent, EffectHandle};
pub use error::{AudioError, ConfigError};
pub use particles::{Particle, ParticleColor, ParticleField};
pub use surface::{Rgba, Surface};
