//! Engine configuration.

use crate::voice_pool::MAX_VOICES;

/// Fixed settings chosen when the engine is built.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Output rate in Hz.
    pub sample_rate: u32,
    /// Frames per rendered buffer.
    pub block_size: usize,
    /// Voice pool capacity.
    pub max_voices: usize,
    /// Authoring units per second of output.
    pub beats_per_second: f64,
    /// Pending control commands the queue can hold.
    pub control_capacity: usize,
}

/// A setting that would leave the engine unable to make progress.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("sample_rate must be positive")]
    ZeroSampleRate,
    #[error("block_size must be at least 1")]
    ZeroBlockSize,
    #[error("max_voices must be at least 1")]
    ZeroVoices,
    #[error("control_capacity must be at least 1")]
    ZeroControlCapacity,
    #[error("beats_per_second must be positive and finite, got {0}")]
    BeatsPerSecond(f64),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            block_size: 256,
            max_voices: MAX_VOICES,
            beats_per_second: 8.0,
            control_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Interleaved stereo samples per buffer.
    pub fn buffer_len(&self) -> usize {
        self.block_size * 2
    }

    /// Reject settings under which the transport never advances or the
    /// timeline never reaches its end.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.max_voices == 0 {
            return Err(ConfigError::ZeroVoices);
        }
        if self.control_capacity == 0 {
            return Err(ConfigError::ZeroControlCapacity);
        }
        if !(self.beats_per_second.is_finite() && self.beats_per_second > 0.0) {
            return Err(ConfigError::BeatsPerSecond(self.beats_per_second));
        }
        Ok(())
    }
}
