//! Sample provider traits.
//!
//! Decoding recordings from disk lives outside this crate; loaders only
//! see an opened [`AudioSource`].

use core::fmt::Display;

/// Read-only access to an opened recording.
pub trait AudioSource {
    /// Rate the recording was made at, in Hz.
    fn sample_rate(&self) -> u32;

    /// Number of frames in the source.
    fn frames(&self) -> usize;

    /// Read the first channel of `frame` as f32 in [-1, 1].
    fn read_f32(&self, frame: usize) -> f32;
}

/// Opens recordings by path.
pub trait SampleProvider {
    type Source: AudioSource;
    type Error: Display;

    /// Open the recording at `path`.
    fn open(&self, path: &str) -> Result<Self::Source, Self::Error>;
}
