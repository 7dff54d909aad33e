//! The output seam between the engine's render loop and a sink.

use pp_engine::StereoFrame;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("cannot configure output device: {0}")]
    DeviceInit(String),
    #[error("cannot build output stream: {0}")]
    StreamCreate(String),
    #[error("output stream failed: {0}")]
    Playback(String),
    #[error("no output device found")]
    NoDevice,
}

/// A sink for rendered stereo frames.
///
/// Outputs are opened on the thread that drives them and need not be `Send`.
pub trait AudioOutput {
    /// Rate the sink actually runs at, which may differ from the one asked for.
    fn sample_rate(&self) -> u32;

    /// Queue `frames`, blocking until the sink has taken all of them.
    fn write(&mut self, frames: &[StereoFrame]);

    fn start(&mut self) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError>;
}
