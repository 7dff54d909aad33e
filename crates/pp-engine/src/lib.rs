//! Real-time voice engine for the polypcm sampler.
//!
//! Turns a scheduled timeline and live control commands into an
//! interleaved stereo stream, one fixed-size buffer at a time.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod config;
mod control;
mod engine;
mod envelope;
mod event_queue;
mod frame;
mod frequency;
pub mod params;
pub mod scheduler;
mod transport;
mod voice;
mod voice_pool;

pub use config::{ConfigError, EngineConfig};
pub use control::{control_channel, ControlCommand, ControlReceiver, ControlSender};
pub use engine::Engine;
pub use envelope::{Envelope, EnvelopePhase};
pub use event_queue::EventQueue;
pub use frame::StereoFrame;
pub use frequency::playback_rate;
pub use scheduler::{AuthoringContext, ScoreBuilder, NOTE_OFFSET};
pub use transport::Transport;
pub use voice::{pan_gains, Voice, VoiceTag, ATTENUATION};
pub use voice_pool::{VoiceId, VoicePool, MAX_VOICES};
