//! Voice: one sounding note reading from a shared sample.

use pp_ir::{Catalog, Resolved, SampleAsset, SampleKey, VoiceParams};

use crate::envelope::Envelope;
use crate::frame::StereoFrame;
use crate::frequency::playback_rate;

/// Fixed divisor applied to every sample value before gain.
pub const ATTENUATION: f32 = 2.0;

/// Tag carried by voices started from the control channel.
pub type VoiceTag = u32;

/// A single voice producing audio from a sample.
///
/// The voice never owns sample data; it holds a key into the catalog's
/// bank and reads through it on every step.
#[derive(Clone, Debug, Default)]
pub struct Voice {
    /// Which sample this voice plays.
    sample: Option<SampleKey>,
    /// Sample length in frames, captured at trigger.
    len: usize,
    /// Fractional read position in frames.
    position: f64,
    /// Frames advanced per output frame.
    rate: f64,
    envelope: Envelope,
    amplitude: f32,
    pan: f32,
    gains: (f32, f32),
    interpolate: bool,
    active: bool,
    /// Control-channel tag, if started by a live note-on.
    tag: Option<VoiceTag>,
    /// Trigger order, used to pick steal victims.
    seq: u64,
}

impl Voice {
    /// Create a free voice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a sample through `catalog` and start playing it.
    ///
    /// Returns false and leaves the voice free if nothing resolves.
    pub fn trigger(&mut self, catalog: &Catalog, params: &VoiceParams, sample_rate: u32) -> bool {
        let Some(resolved) = catalog.resolve(params.patch, params.note) else {
            self.active = false;
            return false;
        };
        let Some(sample) = catalog.sample(resolved.sample) else {
            self.active = false;
            return false;
        };
        self.start(resolved, sample, params, sample_rate);
        true
    }

    /// Start playing an already-resolved sample.
    pub fn start(&mut self, resolved: Resolved, sample: &SampleAsset, params: &VoiceParams, sample_rate: u32) {
        self.sample = Some(resolved.sample);
        self.len = sample.len();
        self.position = 0.0;
        self.rate = playback_rate(resolved.pitch, sample.root_pitch);
        self.envelope = Envelope::new(params.attack_time, params.release_time, sample_rate);
        self.amplitude = params.amplitude;
        self.set_pan(params.pan);
        self.interpolate = params.interpolate;
        self.active = true;
        self.tag = None;
    }

    /// Render one frame from `catalog`'s copy of the sample.
    pub fn step(&mut self, catalog: &Catalog) -> StereoFrame {
        if !self.active {
            return StereoFrame::silence();
        }
        match self.sample.and_then(|key| catalog.sample(key)) {
            Some(sample) => self.step_with_source(sample),
            None => {
                self.active = false;
                StereoFrame::silence()
            }
        }
    }

    /// Render one frame, reading from `sample`.
    ///
    /// The voice frees itself once the read position passes the end of the
    /// sample or the envelope finishes, whichever happens first. A release
    /// longer than the remaining sample is cut off at the sample end.
    pub fn step_with_source(&mut self, sample: &SampleAsset) -> StereoFrame {
        if !self.active {
            return StereoFrame::silence();
        }
        let len = self.len.min(sample.len()) as f64;
        if self.position >= len {
            self.rate = 0.0;
        }

        let mut out = 0.0;
        if self.rate > 0.0 {
            let s = if self.interpolate {
                sample.interpolated(self.position)
            } else {
                sample.nearest(self.position)
            };
            out = s / ATTENUATION * self.envelope.tick() * self.amplitude;
        }
        self.position += self.rate;

        if self.position >= len || self.envelope.is_done() {
            self.active = false;
        }
        StereoFrame { left: out * self.gains.0, right: out * self.gains.1 }
    }

    /// Begin the release phase. Repeated calls have no further effect.
    pub fn release(&mut self) {
        self.envelope.release();
    }

    /// Free the voice immediately.
    pub fn kill(&mut self) {
        self.active = false;
    }

    pub fn is_free(&self) -> bool {
        !self.active
    }

    pub fn is_releasing(&self) -> bool {
        self.envelope.is_releasing()
    }

    /// Set the stereo position (-1 left, 1 right).
    pub fn set_pan(&mut self, pan: f32) {
        self.pan = pan.clamp(-1.0, 1.0);
        self.gains = pan_gains(self.pan);
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude;
    }

    pub fn sample(&self) -> Option<SampleKey> {
        self.sample
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn tag(&self) -> Option<VoiceTag> {
        self.tag
    }

    pub(crate) fn set_tag(&mut self, tag: Option<VoiceTag>) {
        self.tag = tag;
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn set_seq(&mut self, seq: u64) {
        self.seq = seq;
    }
}

/// Constant-power pan law: left = cos(θ), right = sin(θ), θ = (pan + 1)·π/4.
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let theta = (pan + 1.0) * core::f32::consts::FRAC_PI_4;
    (libm::cosf(theta), libm::sinf(theta))
}
