//! In-memory output, for headless runs and tests.

use pp_engine::StereoFrame;
use std::sync::{Arc, Mutex};

use crate::traits::{AudioError, AudioOutput};

/// Collects every written frame while started.
#[derive(Clone, Debug)]
pub struct MemoryOutput {
    sample_rate: u32,
    running: bool,
    frames: Arc<Mutex<Vec<StereoFrame>>>,
}

impl MemoryOutput {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate, running: false, frames: Arc::default() }
    }

    /// Shared handle to the captured frames.
    pub fn frames(&self) -> Arc<Mutex<Vec<StereoFrame>>> {
        self.frames.clone()
    }

    /// Number of frames captured so far.
    pub fn len(&self) -> usize {
        self.frames.lock().map_or(0, |f| f.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AudioOutput for MemoryOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, frames: &[StereoFrame]) {
        if !self.running {
            return;
        }
        if let Ok(mut captured) = self.frames.lock() {
            captured.extend_from_slice(frames);
        }
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running = false;
        Ok(())
    }
}
