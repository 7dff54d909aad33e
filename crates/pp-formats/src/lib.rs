//! File formats for the polypcm sampler.
//!
//! Decodes WAV recordings into sample assets, builds a catalog from a
//! YAML manifest, and turns YAML score files into a timeline.

mod error;
mod manifest;
mod score;
mod wav_format;

pub use error::FormatError;
pub use manifest::{load_catalog, parse_manifest, CatalogManifest, HitEntry, InstrumentEntry, KitEntry};
pub use score::{load_score, parse_score, ScoreFile, ScoreOp, TrackScore};
pub use wav_format::{parse_wav, WavFile, WavProvider};
