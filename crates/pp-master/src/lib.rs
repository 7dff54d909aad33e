//! Headless controller for the polypcm sampler.
//!
//! Loads a catalog and a score, then either plays them through an audio
//! output on a dedicated thread or renders them offline. Shared by the CLI
//! and the integration tests.

mod error;
mod session;
mod wav;

use pp_audio::{AudioError, AudioOutput, CpalOutput};
use pp_engine::{ControlSender, Engine};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{error, info};

// Re-export common types so callers don't need pp-ir/pp-engine directly.
pub use error::ControllerError;
pub use pp_engine::{EngineConfig, EventQueue, StereoFrame};
pub use pp_formats::FormatError;
pub use pp_ir::{BeatTime, Catalog};
pub use session::{SessionConfig, ENV_PREFIX};

pub use wav::{frames_to_wav, write_wav};

/// Owns a catalog and a timeline and manages their playback.
pub struct Controller {
    catalog: Arc<Catalog>,
    events: EventQueue,
    config: SessionConfig,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    current_frame: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
    sample_rate: u32,
    control: Option<ControlSender>,
    thread: Option<JoinHandle<()>>,
}

/// What the audio thread reports once its output is open.
struct Started {
    sample_rate: u32,
    control: Option<ControlSender>,
}

impl Controller {
    /// Fails if the engine settings could never finish a render.
    pub fn new(catalog: Catalog, events: EventQueue, config: SessionConfig) -> Result<Self, ControllerError> {
        config.validate()?;
        Ok(Self { catalog: Arc::new(catalog), events, config, playback: None })
    }

    /// Load a catalog manifest and a score file.
    pub fn load(manifest: &Path, score: &Path, config: SessionConfig) -> Result<Self, ControllerError> {
        let catalog = pp_formats::load_catalog(manifest)?;
        let events = pp_formats::load_score(score)?.build(&catalog)?;
        Self::new(catalog, events, config)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // --- Real-time playback ---

    /// Play through the default audio device.
    pub fn play(&mut self) -> Result<(), ControllerError> {
        self.play_with(|rate| {
            let (mut output, consumer) = CpalOutput::new(rate)?;
            output.build_stream(consumer)?;
            Ok(output)
        })
    }

    /// Play through an output opened by `open` on the audio thread.
    ///
    /// `open` receives the configured sample rate; the engine runs at
    /// whatever rate the returned output reports. Blocks until the output
    /// is open or has failed.
    pub fn play_with<O, F>(&mut self, open: F) -> Result<(), ControllerError>
    where
        O: AudioOutput + 'static,
        F: FnOnce(u32) -> Result<O, AudioError> + Send + 'static,
    {
        self.stop();

        let catalog = self.catalog.clone();
        let events = self.events.clone();
        let config = self.config.engine;
        let stop_signal = Arc::new(AtomicBool::new(false));
        let current_frame = Arc::new(AtomicU64::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::channel();

        let stop = stop_signal.clone();
        let frame = current_frame.clone();
        let done = finished.clone();

        let thread = std::thread::spawn(move || {
            let output = match open(config.sample_rate) {
                Ok(output) => output,
                Err(e) => {
                    error!(%e, "failed to open audio output");
                    done.store(true, Ordering::Relaxed);
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            audio_thread(output, catalog, events, config, ready_tx, stop, frame, done);
        });

        match ready_rx.recv() {
            Ok(Ok(started)) => {
                info!(sample_rate = started.sample_rate, events = self.events.len(), "playback started");
                self.playback = Some(PlaybackHandle {
                    stop_signal,
                    current_frame,
                    finished,
                    sample_rate: started.sample_rate,
                    control: started.control,
                    thread: Some(thread),
                });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e.into())
            }
            Err(_) => {
                let _ = thread.join();
                Err(AudioError::Playback("audio thread exited before starting".into()).into())
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                let _ = handle.join();
            }
            info!("playback stopped");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    pub fn is_finished(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| p.finished.load(Ordering::Relaxed))
    }

    /// Current playback position, while playing.
    pub fn position(&self) -> Option<BeatTime> {
        let pb = self.playback.as_ref()?;
        if pb.finished.load(Ordering::Relaxed) {
            return None;
        }
        let frame = pb.current_frame.load(Ordering::Relaxed);
        Some(BeatTime::from_frame(frame, pb.sample_rate, self.config.engine.beats_per_second))
    }

    /// Live control channel of the running engine.
    pub fn control(&mut self) -> Option<&mut ControlSender> {
        self.playback.as_mut()?.control.as_mut()
    }

    // --- Offline rendering ---

    /// Render until the timeline and every voice have finished, or
    /// `max_frames` frames have been produced.
    pub fn render_frames(&self, max_frames: usize) -> Vec<StereoFrame> {
        let config = self.config.engine;
        let mut engine = Engine::new(self.catalog.clone(), self.events.clone(), config);
        engine.play();

        let mut buffer = vec![0.0f32; config.buffer_len()];
        let mut frames = Vec::new();
        while !engine.is_finished() && frames.len() < max_frames {
            engine.process(&mut buffer);
            let take = (max_frames - frames.len()).min(config.block_size);
            frames.extend(
                buffer
                    .chunks_exact(2)
                    .take(take)
                    .map(|s| StereoFrame { left: s[0], right: s[1] }),
            );
        }
        frames
    }

    /// Render to 16-bit stereo WAV bytes, capped at `render_seconds`.
    pub fn render_to_wav(&self) -> Result<Vec<u8>, ControllerError> {
        let frames = self.render_capped();
        Ok(wav::frames_to_wav(&frames, self.config.engine.sample_rate)?)
    }

    /// Render like [`render_to_wav`](Self::render_to_wav), streaming the
    /// file into `w`. Returns the number of frames written.
    pub fn write_wav(&self, w: &mut impl Write) -> Result<usize, ControllerError> {
        let frames = self.render_capped();
        wav::write_wav(w, &frames, self.config.engine.sample_rate)?;
        Ok(frames.len())
    }

    fn render_capped(&self) -> Vec<StereoFrame> {
        let frames = self.render_frames(self.config.render_frames());
        info!(
            frames = frames.len(),
            seconds = frames.len() as f64 / self.config.engine.sample_rate as f64,
            "rendered"
        );
        frames
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[allow(clippy::too_many_arguments)]
fn audio_thread<O: AudioOutput>(
    mut output: O,
    catalog: Arc<Catalog>,
    events: EventQueue,
    mut config: EngineConfig,
    ready: mpsc::Sender<Result<Started, AudioError>>,
    stop_signal: Arc<AtomicBool>,
    current_frame: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
) {
    config.sample_rate = output.sample_rate();
    if config.sample_rate == 0 {
        error!("audio output reported a zero sample rate");
        finished.store(true, Ordering::Relaxed);
        let _ = ready.send(Err(AudioError::DeviceInit("output reported a zero sample rate".into())));
        return;
    }
    let mut engine = Engine::new(catalog, events, config);
    let control = engine.take_control();
    engine.play();

    if let Err(e) = output.start() {
        error!(%e, "failed to start audio output");
        finished.store(true, Ordering::Relaxed);
        let _ = ready.send(Err(e));
        return;
    }
    let _ = ready.send(Ok(Started { sample_rate: config.sample_rate, control }));

    let mut buffer = vec![0.0f32; config.buffer_len()];
    let mut block = vec![StereoFrame::silence(); config.block_size];

    while !engine.is_finished() && !stop_signal.load(Ordering::Relaxed) {
        engine.process(&mut buffer);
        for (frame, pair) in block.iter_mut().zip(buffer.chunks_exact(2)) {
            *frame = StereoFrame { left: pair[0], right: pair[1] };
        }
        output.write(&block);
        current_frame.store(engine.frame(), Ordering::Relaxed);
    }

    // Flush the device buffer with silence before stopping.
    if !stop_signal.load(Ordering::Relaxed) {
        let tail = vec![StereoFrame::silence(); (config.sample_rate / 10) as usize];
        output.write(&tail);
    }
    if let Err(e) = output.stop() {
        error!(%e, "failed to stop audio output");
    }

    finished.store(true, Ordering::Relaxed);
}
