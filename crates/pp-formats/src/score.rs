//! Score files.
//!
//! A score is a list of tracks, each a list of authoring operations run in
//! order against a fresh context:
//!
//! ```yaml
//! tracks:
//!   - id: 0
//!     ops:
//!       - { op: patch, name: piano }
//!       - { op: release, value: 1.0 }
//!       - { op: note, pitch: 45, length: 8 }
//!       - { op: chord, pitch: 57 }
//!       - { op: chord, pitch: 60, gap: 16 }
//!   - id: 1
//!     ops:
//!       - { op: hit, name: KICK, gap: 4 }
//! ```
//!
//! Lengths and gaps are in beats.

use config::{Config, File, FileFormat};
use pp_engine::params::{AMPLITUDE, ATTACK_TIME, PAN, RELEASE_TIME};
use pp_engine::{AuthoringContext, EventQueue, ScoreBuilder};
use pp_ir::{BeatTime, Catalog, TimelineEvent, TrackId};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::FormatError;

/// A whole score.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ScoreFile {
    #[serde(default)]
    pub tracks: Vec<TrackScore>,
}

/// One track's operations.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TrackScore {
    pub id: TrackId,
    #[serde(default)]
    pub ops: Vec<ScoreOp>,
}

/// A single authoring operation.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScoreOp {
    /// Select the melodic patch by name.
    Patch { name: String },
    /// Select the percussion kit by name.
    Kit { name: String },
    Note {
        pitch: f32,
        #[serde(default = "default_note_length")]
        length: f64,
        #[serde(default)]
        gap: f64,
    },
    /// A note that advances the cursor by `gap` only.
    Chord {
        pitch: f32,
        #[serde(default = "default_chord_length")]
        length: f64,
        #[serde(default)]
        gap: f64,
    },
    Rest { length: f64 },
    Hit {
        name: String,
        #[serde(default)]
        gap: f64,
        #[serde(default = "default_hit_length")]
        length: f64,
    },
    Volume { value: f32 },
    Strength { value: f32 },
    Transpose { value: f32 },
    Tuning { value: f32 },
    Interpolate { value: bool },
    Release { value: f32 },
    Attack { value: f32 },
    Pan { value: f32 },
    Reset,
}

fn default_note_length() -> f64 {
    1.0
}

fn default_chord_length() -> f64 {
    16.0
}

fn default_hit_length() -> f64 {
    64.0
}

fn beats(value: f64) -> BeatTime {
    BeatTime::from_beats_f64(value)
}

impl ScoreFile {
    /// Run every track's operations and collect the resulting events,
    /// ordered by start time.
    pub fn events(&self, catalog: &Catalog) -> Result<Vec<TimelineEvent>, FormatError> {
        let mut builder = ScoreBuilder::new(catalog);

        for track in &self.tracks {
            *builder.context_mut() = AuthoringContext::default();
            builder.set_track(track.id);
            for op in &track.ops {
                apply(&mut builder, catalog, op)?;
            }
        }

        let events = builder.into_events();
        info!(tracks = self.tracks.len(), events = events.len(), "score built");
        Ok(events)
    }

    /// Build the engine's event queue.
    pub fn build(&self, catalog: &Catalog) -> Result<EventQueue, FormatError> {
        Ok(EventQueue::from_events(self.events(catalog)?))
    }
}

fn apply(builder: &mut ScoreBuilder<'_>, catalog: &Catalog, op: &ScoreOp) -> Result<(), FormatError> {
    match op {
        ScoreOp::Patch { name } => {
            let id = catalog.find_patch(name).ok_or_else(|| FormatError::UnknownPatch(name.clone()))?;
            builder.set_patch(id)?;
        }
        ScoreOp::Kit { name } => {
            let id = catalog.find_patch(name).ok_or_else(|| FormatError::UnknownPatch(name.clone()))?;
            builder.set_kit(id)?;
        }
        ScoreOp::Note { pitch, length, gap } => {
            builder.note(*pitch, beats(*length), beats(*gap));
        }
        ScoreOp::Chord { pitch, length, gap } => {
            builder.chord_note(*pitch, beats(*length), beats(*gap));
        }
        ScoreOp::Rest { length } => {
            builder.rest(beats(*length));
        }
        ScoreOp::Hit { name, gap, length } => {
            builder.percussion_hit(name, beats(*gap), beats(*length))?;
        }
        ScoreOp::Volume { value } => {
            builder.set_volume(AMPLITUDE.clamp(*value));
        }
        ScoreOp::Strength { value } => {
            builder.set_strength(AMPLITUDE.clamp(*value));
        }
        ScoreOp::Transpose { value } => {
            builder.set_transpose(*value);
        }
        ScoreOp::Tuning { value } => {
            builder.set_tuning(*value);
        }
        ScoreOp::Interpolate { value } => {
            builder.set_interpolate(*value);
        }
        ScoreOp::Release { value } => {
            builder.set_release_time(RELEASE_TIME.clamp(*value));
        }
        ScoreOp::Attack { value } => {
            builder.set_attack_time(ATTACK_TIME.clamp(*value));
        }
        ScoreOp::Pan { value } => {
            builder.set_pan(PAN.clamp(*value));
        }
        ScoreOp::Reset => {
            builder.reset();
        }
    }
    Ok(())
}

/// Parse score text in any format the config crate understands.
pub fn parse_score(text: &str, format: FileFormat) -> Result<ScoreFile, FormatError> {
    Ok(Config::builder()
        .add_source(File::from_str(text, format))
        .build()?
        .try_deserialize()?)
}

/// Read a score file from disk.
pub fn load_score(path: &Path) -> Result<ScoreFile, FormatError> {
    let score: ScoreFile = Config::builder()
        .add_source(File::from(path))
        .build()?
        .try_deserialize()?;
    info!(score = %path.display(), tracks = score.tracks.len(), "loaded score");
    Ok(score)
}
