//! Attack/sustain/release amplitude envelope.
//!
//! Linear ramps, evaluated once per output frame. The envelope rises from
//! 0 to 1 over the attack time, holds at 1 until released, then falls to 0
//! from wherever it was over the release time.

/// Envelope phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopePhase {
    #[default]
    Attack,
    Sustain,
    Release,
    /// Terminal; the voice may be freed.
    Done,
}

/// Runtime state for one voice's envelope.
#[derive(Clone, Debug, Default)]
pub struct Envelope {
    phase: EnvelopePhase,
    value: f32,
    attack_frames: u32,
    release_frames: u32,
    /// Frames elapsed in the current ramp.
    elapsed: u32,
    /// Level the release ramp started from.
    release_level: f32,
}

impl Envelope {
    /// Start a new envelope in the attack phase.
    pub fn new(attack_time: f32, release_time: f32, sample_rate: u32) -> Self {
        Self {
            phase: EnvelopePhase::Attack,
            value: 0.0,
            attack_frames: seconds_to_frames(attack_time, sample_rate),
            release_frames: seconds_to_frames(release_time, sample_rate),
            elapsed: 0,
            release_level: 0.0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> EnvelopePhase {
        self.phase
    }

    /// Current output value, in [0, 1].
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_done(&self) -> bool {
        self.phase == EnvelopePhase::Done
    }

    pub fn is_releasing(&self) -> bool {
        matches!(self.phase, EnvelopePhase::Release | EnvelopePhase::Done)
    }

    /// Enter the release phase from the current level.
    ///
    /// Has no effect once releasing or done.
    pub fn release(&mut self) {
        if self.is_releasing() {
            return;
        }
        self.phase = EnvelopePhase::Release;
        self.release_level = self.value;
        self.elapsed = 0;
    }

    /// Advance one frame and return the new value.
    pub fn tick(&mut self) -> f32 {
        match self.phase {
            EnvelopePhase::Attack => {
                self.elapsed += 1;
                if self.elapsed >= self.attack_frames {
                    self.value = 1.0;
                    self.phase = EnvelopePhase::Sustain;
                } else {
                    self.value = self.elapsed as f32 / self.attack_frames as f32;
                }
            }
            EnvelopePhase::Sustain => {}
            EnvelopePhase::Release => {
                self.elapsed += 1;
                if self.elapsed >= self.release_frames {
                    self.value = 0.0;
                    self.phase = EnvelopePhase::Done;
                } else {
                    let remaining = 1.0 - self.elapsed as f32 / self.release_frames as f32;
                    self.value = self.release_level * remaining;
                }
            }
            EnvelopePhase::Done => {}
        }
        self.value
    }
}

/// Length of a ramp in frames, never less than one.
fn seconds_to_frames(seconds: f32, sample_rate: u32) -> u32 {
    (libm::roundf(seconds * sample_rate as f32) as u32).max(1)
}
