//! Transport: the engine's frame clock.

use pp_ir::BeatTime;

/// Monotonic frame counter, advanced once per rendered buffer.
#[derive(Clone, Debug)]
pub struct Transport {
    frame: u64,
    sample_rate: u32,
    beats_per_second: f64,
    playing: bool,
}

impl Transport {
    pub fn new(sample_rate: u32, beats_per_second: f64) -> Self {
        Self { frame: 0, sample_rate, beats_per_second, playing: false }
    }

    /// Frames rendered since the start.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Current position in musical time.
    pub fn now(&self) -> BeatTime {
        BeatTime::from_frame(self.frame, self.sample_rate, self.beats_per_second)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn beats_per_second(&self) -> f64 {
        self.beats_per_second
    }

    pub fn advance(&mut self, frames: u64) {
        self.frame += frames;
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Return to frame zero.
    pub fn rewind(&mut self) {
        self.frame = 0;
    }
}
