use thiserror::Error;

/// Failures surfaced by an [`AudioBackend`](crate::audio::AudioBackend).
///
/// The synthesis engine never propagates these to its callers; they are
/// logged and the affected operation degrades to a no-op.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio backend unavailable: {0}")]
    Unavailable(String),
    #[error("failed to create {kind} node: {reason}")]
    NodeCreation { kind: &'static str, reason: String },
    #[error("failed to connect audio nodes: {0}")]
    Connect(String),
}

impl AudioError {
    pub fn node(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::NodeCreation {
            kind,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config value `{field}` must be {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },
}
