//! Core catalog and timeline types for the polypcm sampler.
//!
//! This crate defines the data shared by everything else: immutable
//! sample assets, the patches that index them, and the timeline events
//! the scheduler produces. Loaders emit these types and the playback
//! engine consumes them.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod audio_traits;
mod catalog;
mod error;
mod event;
mod musical_time;
mod patch;
mod sample;

pub use audio_traits::{AudioSource, SampleProvider};
pub use catalog::{Catalog, Resolved, KIT_REFERENCE_PITCH};
pub use error::{CatalogError, LoadError};
pub use event::{Note, TimelineEvent, TrackId, VoiceParams};
pub use musical_time::{BeatTime, SUB_BEAT_UNIT};
pub use patch::{Hit, HitId, MultiSampleInstrument, Patch, PatchId, PercussionKit};
pub use sample::{linear_interpolate, SampleAsset, SampleBank, SampleKey, MAX_PITCH};
