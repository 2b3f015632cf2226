use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tunnel_core::{Theme, TunnelConfig};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Scroll-driven depth tunnel with a particle vortex and drone audio")]
pub struct Args {
    /// Path to a config TOML; missing keys use defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for camera events, particles and noise (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of vortex particles (overrides config)
    #[arg(long)]
    pub particles: Option<usize>,

    /// Drone theme to start with: main or choice (overrides config)
    #[arg(long)]
    pub theme: Option<Theme>,

    /// Add the low-passed noise layer at this volume (overrides config)
    #[arg(long)]
    pub wind: Option<f32>,

    /// Never start audio
    #[arg(long, default_value_t = false)]
    pub mute: bool,
}

impl Args {
    /// Config file first, then command-line overrides, then validation.
    pub fn load_config(&self) -> anyhow::Result<TunnelConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                TunnelConfig::from_toml_str(&text)
                    .with_context(|| format!("loading config {}", path.display()))?
            }
            None => TunnelConfig::default(),
        };
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(count) = self.particles {
            cfg.particles.count = count;
        }
        if let Some(theme) = self.theme {
            cfg.audio.theme = theme;
        }
        if let Some(volume) = self.wind {
            cfg.audio.wind_volume = Some(volume);
        }
        if self.mute {
            cfg.audio.muted = true;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
