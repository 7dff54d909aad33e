//! Session settings.

use config::{Config, Environment, File, FileFormat};
use pp_engine::EngineConfig;
use serde::Deserialize;
use std::path::Path;

use crate::ControllerError;

/// Prefix for environment overrides, e.g. `POLYPCM_ENGINE__SAMPLE_RATE=44100`.
pub const ENV_PREFIX: &str = "POLYPCM";

/// Everything a session needs besides the catalog and score.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub engine: EngineConfig,
    /// Upper bound on offline renders, in seconds.
    pub render_seconds: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { engine: EngineConfig::default(), render_seconds: 300 }
    }
}

impl SessionConfig {
    /// Load from an optional file, then apply environment overrides.
    /// Missing keys keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ControllerError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let session: Self = config.try_deserialize()?;
        session.validate()?;
        Ok(session)
    }

    /// Parse settings text.
    pub fn parse(text: &str, format: FileFormat) -> Result<Self, ControllerError> {
        let session: Self = Config::builder()
            .add_source(File::from_str(text, format))
            .build()?
            .try_deserialize()?;
        session.validate()?;
        Ok(session)
    }

    pub fn validate(&self) -> Result<(), ControllerError> {
        Ok(self.engine.validate()?)
    }

    /// Longest offline render, in frames.
    pub fn render_frames(&self) -> usize {
        self.engine.sample_rate as usize * self.render_seconds as usize
    }
}
