//! Sample data types.

use alloc::string::ToString;
use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::audio_traits::{AudioSource, SampleProvider};
use crate::error::LoadError;

slotmap::new_key_type! {
    /// Key for referencing samples in the catalog's sample bank.
    pub struct SampleKey;
}

/// Storage for every loaded sample, addressed by [`SampleKey`].
pub type SampleBank = slotmap::SlotMap<SampleKey, SampleAsset>;

/// Highest representable pitch (MIDI note number).
pub const MAX_PITCH: i32 = 127;

/// An immutable mono recording plus the pitch range it covers.
///
/// Once constructed the frame data never changes, so any number of voices
/// may read it concurrently without synchronization.
#[derive(Clone, Debug)]
pub struct SampleAsset {
    /// Sample name (truncated to capacity)
    pub name: ArrayString<48>,
    /// Mono amplitude frames in [-1, 1]
    data: Vec<f32>,
    /// Rate the recording was made at, in Hz
    pub sample_rate: u32,
    /// Pitch at which playback rate is exactly 1.0
    pub root_pitch: i32,
    /// Highest pitch this sample should serve
    pub highest_pitch: i32,
}

impl SampleAsset {
    /// Create a sample from already-decoded frames.
    pub fn new(name: &str, data: Vec<f32>, sample_rate: u32, root_pitch: i32, highest_pitch: i32) -> Self {
        let mut asset = Self {
            name: ArrayString::new(),
            data,
            sample_rate,
            root_pitch,
            highest_pitch,
        };
        push_truncated(&mut asset.name, name);
        asset
    }

    /// Pull every mono frame out of an opened audio source.
    pub fn from_source(
        name: &str,
        source: &impl AudioSource,
        root_pitch: i32,
        highest_pitch: i32,
    ) -> Result<Self, LoadError> {
        let frames = source.frames();
        if frames == 0 {
            return Err(LoadError::Empty(name.to_string()));
        }
        let data = (0..frames).map(|i| source.read_f32(i)).collect();
        Ok(Self::new(name, data, source.sample_rate(), root_pitch, highest_pitch))
    }

    /// Open `path` through a provider and load it.
    pub fn load<P: SampleProvider>(
        provider: &P,
        path: &str,
        root_pitch: i32,
        highest_pitch: i32,
    ) -> Result<Self, LoadError> {
        let source = provider.open(path).map_err(|e| LoadError::Provider {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_source(path, &source, root_pitch, highest_pitch)
    }

    /// Length of the sample in frames.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sample has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw frame data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Frame at `index`, or silence when out of range.
    pub fn frame(&self, index: usize) -> f32 {
        self.data.get(index).copied().unwrap_or(0.0)
    }

    /// Frame at the floor of a fractional position.
    pub fn nearest(&self, position: f64) -> f32 {
        if position < 0.0 {
            return 0.0;
        }
        self.frame(libm::floor(position) as usize)
    }

    /// Linearly interpolated frame at a fractional position.
    pub fn interpolated(&self, position: f64) -> f32 {
        linear_interpolate(&self.data, position)
    }
}

/// Blend between `data[floor(position)]` and the following frame.
///
/// When the following frame does not exist the floor frame is returned
/// unchanged, so integer positions always map to the stored value. Out of
/// range positions read as silence.
pub fn linear_interpolate(data: &[f32], position: f64) -> f32 {
    if position < 0.0 {
        return 0.0;
    }
    let floored = libm::floor(position);
    let index = floored as usize;
    let Some(&current) = data.get(index) else {
        return 0.0;
    };
    match data.get(index + 1) {
        Some(&next) => {
            let fraction = (position - floored) as f32;
            current + fraction * (next - current)
        }
        None => current,
    }
}

pub(crate) fn push_truncated<const N: usize>(dst: &mut ArrayString<N>, src: &str) {
    for ch in src.chars() {
        if dst.try_push(ch).is_err() {
            break;
        }
    }
}
