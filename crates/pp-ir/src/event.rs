//! Timeline event types.

use crate::musical_time::BeatTime;
use crate::patch::{HitId, PatchId};

/// Track index in an authored score.
pub type TrackId = u8;

/// What a trigger asks a patch to play.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Note {
    /// A melodic pitch (MIDI note number, fractional for detuning)
    Pitch(f32),
    /// A percussion kit hit
    Hit(HitId),
}

/// Everything a voice needs to start playing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceParams {
    /// Patch to resolve the sample from
    pub patch: PatchId,
    /// Pitch or hit
    pub note: Note,
    /// Linear gain (0-20)
    pub amplitude: f32,
    /// Attack time in seconds (0.001-3.0)
    pub attack_time: f32,
    /// Release time in seconds (0.001-10.0)
    pub release_time: f32,
    /// Stereo position (-1 = left, 1 = right)
    pub pan: f32,
    /// Linear interpolation between frames
    pub interpolate: bool,
}

impl VoiceParams {
    /// Default attack time in seconds.
    pub const DEFAULT_ATTACK: f32 = 0.001;
    /// Default release time in seconds.
    pub const DEFAULT_RELEASE: f32 = 0.1;

    /// Parameters for `note` on `patch` with default gains and envelope.
    pub fn new(patch: PatchId, note: Note) -> Self {
        Self {
            patch,
            note,
            amplitude: 1.0,
            attack_time: Self::DEFAULT_ATTACK,
            release_time: Self::DEFAULT_RELEASE,
            pan: 0.0,
            interpolate: false,
        }
    }
}

/// A scheduled voice trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineEvent {
    /// Track the event was authored on
    pub track: TrackId,
    /// When the event should fire
    pub start: BeatTime,
    /// Authored length. Only moves the cursor; playback ignores it.
    pub duration: BeatTime,
    /// What to play
    pub params: VoiceParams,
}

impl TimelineEvent {
    /// Create a new event.
    pub fn new(track: TrackId, start: BeatTime, duration: BeatTime, params: VoiceParams) -> Self {
        Self { track, start, duration, params }
    }
}
