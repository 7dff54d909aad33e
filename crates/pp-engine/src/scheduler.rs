//! Score authoring.
//!
//! A [`ScoreBuilder`] walks per-track cursors forward while appending
//! [`TimelineEvent`]s. Attributes such as the current patch, transpose and
//! volume live in an explicit [`AuthoringContext`] that the caller mutates
//! between emissions. Nothing here runs on the audio thread.

use alloc::vec::Vec;
use pp_ir::{BeatTime, Catalog, CatalogError, Note, PatchId, TimelineEvent, TrackId, VoiceParams};

use crate::event_queue::EventQueue;

/// Gain applied on top of `volume * strength`.
pub const GAIN_STAGING: f32 = 1.375;

/// Release time used by `reset` and by every percussion hit.
pub const SHORT_RELEASE: f32 = 0.001;

/// Semitones added to every authored melodic pitch, so note 48 sounds as 60.
pub const NOTE_OFFSET: f32 = 12.0;

/// Attributes applied to every event emitted until changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AuthoringContext {
    pub track: TrackId,
    /// Melodic patch used by `note` and `chord_note`.
    pub patch: PatchId,
    /// Kit used by `percussion_hit`; the catalog's first kit when unset.
    pub kit: Option<PatchId>,
    /// Semitones added to every melodic pitch, on top of [`NOTE_OFFSET`].
    pub transpose: f32,
    /// Fine offset added to every melodic pitch, in semitones.
    pub tuning: f32,
    pub volume: f32,
    /// Per-phrase accent, multiplied with `volume`.
    pub strength: f32,
    pub interpolate: bool,
    pub attack_time: f32,
    pub release_time: f32,
    pub pan: f32,
}

impl Default for AuthoringContext {
    fn default() -> Self {
        Self {
            track: 0,
            patch: PatchId(0),
            kit: None,
            transpose: 0.0,
            tuning: 0.0,
            volume: 1.0,
            strength: 1.0,
            interpolate: false,
            attack_time: VoiceParams::DEFAULT_ATTACK,
            release_time: 0.0,
            pan: 0.0,
        }
    }
}

impl AuthoringContext {
    /// Restore interpolation, volume, transpose, tuning and release time.
    ///
    /// Track, patch, strength and pan are left alone.
    pub fn reset(&mut self) {
        self.interpolate = true;
        self.volume = 1.0;
        self.transpose = 0.0;
        self.tuning = 0.0;
        self.release_time = SHORT_RELEASE;
    }

    /// Linear gain for the next event.
    pub fn amplitude(&self) -> f32 {
        self.volume * self.strength * GAIN_STAGING
    }

    fn params(&self, patch: PatchId, note: Note) -> VoiceParams {
        VoiceParams {
            patch,
            note,
            amplitude: self.amplitude(),
            attack_time: self.attack_time,
            release_time: self.release_time,
            pan: self.pan,
            interpolate: self.interpolate,
        }
    }
}

/// Appends timeline events against per-track cursors.
pub struct ScoreBuilder<'a> {
    catalog: &'a Catalog,
    context: AuthoringContext,
    cursors: Vec<BeatTime>,
    events: Vec<TimelineEvent>,
}

impl<'a> ScoreBuilder<'a> {
    /// Start an empty score against `catalog`.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            context: AuthoringContext::default(),
            cursors: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn context(&self) -> &AuthoringContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut AuthoringContext {
        &mut self.context
    }

    /// Switch the track subsequent events are appended to.
    pub fn set_track(&mut self, track: TrackId) -> &mut Self {
        self.context.track = track;
        self
    }

    /// Select the melodic patch.
    pub fn set_patch(&mut self, patch: PatchId) -> Result<&mut Self, CatalogError> {
        if self.catalog.patch(patch).is_none() {
            return Err(CatalogError::UnknownPatch(patch));
        }
        self.context.patch = patch;
        Ok(self)
    }

    /// Select the percussion kit.
    pub fn set_kit(&mut self, kit: PatchId) -> Result<&mut Self, CatalogError> {
        self.catalog.kit(kit)?;
        self.context.kit = Some(kit);
        Ok(self)
    }

    pub fn set_transpose(&mut self, semitones: f32) -> &mut Self {
        self.context.transpose = semitones;
        self
    }

    pub fn set_tuning(&mut self, semitones: f32) -> &mut Self {
        self.context.tuning = semitones;
        self
    }

    pub fn set_volume(&mut self, volume: f32) -> &mut Self {
        self.context.volume = volume;
        self
    }

    pub fn set_strength(&mut self, strength: f32) -> &mut Self {
        self.context.strength = strength;
        self
    }

    pub fn set_interpolate(&mut self, interpolate: bool) -> &mut Self {
        self.context.interpolate = interpolate;
        self
    }

    pub fn set_attack_time(&mut self, seconds: f32) -> &mut Self {
        self.context.attack_time = seconds;
        self
    }

    pub fn set_release_time(&mut self, seconds: f32) -> &mut Self {
        self.context.release_time = seconds;
        self
    }

    pub fn set_pan(&mut self, pan: f32) -> &mut Self {
        self.context.pan = pan;
        self
    }

    /// See [`AuthoringContext::reset`].
    pub fn reset(&mut self) -> &mut Self {
        self.context.reset();
        self
    }

    /// Cursor of `track`.
    pub fn cursor(&self, track: TrackId) -> BeatTime {
        self.cursors.get(track as usize).copied().unwrap_or_default()
    }

    fn cursor_mut(&mut self) -> &mut BeatTime {
        let track = self.context.track as usize;
        if self.cursors.len() <= track {
            self.cursors.resize(track + 1, BeatTime::zero());
        }
        &mut self.cursors[track]
    }

    fn emit(&mut self, params: VoiceParams, duration: BeatTime, advance: BeatTime) {
        let track = self.context.track;
        let cursor = self.cursor_mut();
        let start = *cursor;
        *cursor += advance;
        self.events.push(TimelineEvent::new(track, start, duration, params));
    }

    /// Append a note at the cursor and advance by `length + gap`.
    ///
    /// The dispatched pitch is `pitch + NOTE_OFFSET + transpose + tuning`.
    pub fn note(&mut self, pitch: f32, length: BeatTime, gap: BeatTime) -> &mut Self {
        let pitch = pitch + NOTE_OFFSET + self.context.transpose + self.context.tuning;
        let params = self.context.params(self.context.patch, Note::Pitch(pitch));
        self.emit(params, length, length + gap);
        self
    }

    /// Like `note`, but advance by `gap` only, so a following chord note
    /// with zero gap starts at the same position.
    pub fn chord_note(&mut self, pitch: f32, length: BeatTime, gap: BeatTime) -> &mut Self {
        self.note(pitch, length, gap - length)
    }

    /// Advance the cursor by `length` without emitting anything.
    pub fn rest(&mut self, length: BeatTime) -> &mut Self {
        *self.cursor_mut() += length;
        self
    }

    /// Append a hit from the current kit and advance by `gap`.
    ///
    /// `length` is recorded on the event but never shortens the sample.
    /// Hits always interpolate and use the short release.
    pub fn percussion_hit(&mut self, name: &str, gap: BeatTime, length: BeatTime) -> Result<&mut Self, CatalogError> {
        let kit = self
            .context
            .kit
            .or_else(|| self.catalog.first_kit())
            .ok_or(CatalogError::NoPercussionKit)?;
        let hit = self.catalog.hit_id(kit, name)?;

        let mut params = self.context.params(kit, Note::Hit(hit));
        params.interpolate = true;
        params.release_time = SHORT_RELEASE;
        self.emit(params, length, gap);
        Ok(self)
    }

    /// Events authored so far, in authoring order.
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Merge every track into one time-ordered list.
    ///
    /// Events starting together keep their authoring order.
    pub fn into_events(mut self) -> Vec<TimelineEvent> {
        self.events.sort_by_key(|e| e.start);
        self.events
    }

    /// Finish authoring and hand the events to the engine's queue.
    pub fn build(self) -> EventQueue {
        EventQueue::from_events(self.events)
    }
}
