//! Beat-based time representation.
//!
//! `BeatTime` is the coordinate used by track cursors and timeline events.
//! Positions are stored as whole sub-beats so that authoring in thirds,
//! quarters or any other small subdivision never accumulates drift.

use core::ops::{Add, AddAssign, Sub};

/// Subdivisions per beat. LCM(1..16) = 720720, divisible by
/// any subdivision from 1 to 16.
pub const SUB_BEAT_UNIT: i64 = 720_720;

/// A position (or signed distance) in musical time.
///
/// Cursors may step backwards, so the value is signed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BeatTime {
    sub_beats: i64,
}

impl BeatTime {
    /// The zero position (timeline start).
    pub const fn zero() -> Self {
        Self { sub_beats: 0 }
    }

    /// Create a time at an exact beat boundary.
    pub const fn from_beats(beats: i64) -> Self {
        Self { sub_beats: beats * SUB_BEAT_UNIT }
    }

    /// Create a time from raw sub-beats.
    pub const fn from_sub_beats(sub_beats: i64) -> Self {
        Self { sub_beats }
    }

    /// Create a time from fractional beats, rounded to the nearest sub-beat.
    pub fn from_beats_f64(beats: f64) -> Self {
        Self { sub_beats: libm::round(beats * SUB_BEAT_UNIT as f64) as i64 }
    }

    /// Raw sub-beat count.
    pub const fn sub_beats(self) -> i64 {
        self.sub_beats
    }

    /// Position in fractional beats.
    pub fn as_beats_f64(self) -> f64 {
        self.sub_beats as f64 / SUB_BEAT_UNIT as f64
    }

    /// Whole beats, rounded toward negative infinity.
    pub fn beat(self) -> i64 {
        self.sub_beats.div_euclid(SUB_BEAT_UNIT)
    }

    /// First output frame at or after this position.
    ///
    /// Negative positions map to frame 0.
    pub fn to_frame(self, sample_rate: u32, beats_per_second: f64) -> u64 {
        if self.sub_beats <= 0 || beats_per_second <= 0.0 {
            return 0;
        }
        let seconds = self.as_beats_f64() / beats_per_second;
        libm::ceil(seconds * sample_rate as f64) as u64
    }

    /// Position reached after `frame` output frames.
    pub fn from_frame(frame: u64, sample_rate: u32, beats_per_second: f64) -> Self {
        if sample_rate == 0 {
            return Self::zero();
        }
        let beats = frame as f64 * beats_per_second / sample_rate as f64;
        Self { sub_beats: libm::floor(beats * SUB_BEAT_UNIT as f64) as i64 }
    }
}

impl Add for BeatTime {
    type Output = BeatTime;

    fn add(self, rhs: BeatTime) -> BeatTime {
        BeatTime { sub_beats: self.sub_beats + rhs.sub_beats }
    }
}

impl AddAssign for BeatTime {
    fn add_assign(&mut self, rhs: BeatTime) {
        self.sub_beats += rhs.sub_beats;
    }
}

impl Sub for BeatTime {
    type Output = BeatTime;

    fn sub(self, rhs: BeatTime) -> BeatTime {
        BeatTime { sub_beats: self.sub_beats - rhs.sub_beats }
    }
}
