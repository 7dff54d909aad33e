//! Main playback engine.

use alloc::sync::Arc;
use pp_ir::{BeatTime, Catalog, VoiceParams};

use crate::config::EngineConfig;
use crate::control::{control_channel, ControlCommand, ControlReceiver, ControlSender};
use crate::event_queue::EventQueue;
use crate::transport::Transport;
use crate::voice_pool::{VoiceId, VoicePool};

/// The real-time engine.
///
/// Each call to [`Engine::process`] renders one interleaved stereo buffer:
/// pending control commands are applied, every event whose start time has
/// been reached is triggered, live voices are stepped and summed, and the
/// transport moves forward by the buffer length.
pub struct Engine {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    events: EventQueue,
    voices: VoicePool,
    transport: Transport,
    control: ControlReceiver,
    sender: Option<ControlSender>,
}

impl Engine {
    /// Create an engine for a catalog and a scheduled timeline.
    pub fn new(catalog: Arc<Catalog>, events: EventQueue, config: EngineConfig) -> Self {
        let (sender, control) = control_channel(config.control_capacity);
        Self {
            catalog,
            events,
            voices: VoicePool::new(config.max_voices),
            transport: Transport::new(config.sample_rate, config.beats_per_second),
            control,
            sender: Some(sender),
            config,
        }
    }

    /// Take the producer half of the control channel. Only the first call
    /// returns it.
    pub fn take_control(&mut self) -> Option<ControlSender> {
        self.sender.take()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Start playback.
    pub fn play(&mut self) {
        self.transport.play();
    }

    /// Hard stop: every voice is cut immediately, with no fade.
    pub fn stop(&mut self) {
        self.transport.stop();
        self.voices.kill_all();
    }

    /// Stop and return to the start of the timeline.
    pub fn rewind(&mut self) {
        self.stop();
        self.transport.rewind();
        self.events.reset_cursor();
    }

    /// Is playback active?
    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Current playback position.
    pub fn position(&self) -> BeatTime {
        self.transport.now()
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.transport.frame()
    }

    /// Number of sounding voices.
    pub fn active_voices(&self) -> usize {
        self.voices.active_count()
    }

    /// True once the timeline is exhausted and every voice has ended.
    pub fn is_finished(&self) -> bool {
        self.events.is_exhausted() && self.voices.active_count() == 0
    }

    /// Trigger a voice directly, outside the timeline.
    pub fn trigger(&mut self, params: &VoiceParams) -> Option<VoiceId> {
        self.voices.trigger(&self.catalog, params, self.config.sample_rate, None)
    }

    /// Render one interleaved stereo buffer, filling all of `out`.
    pub fn process(&mut self, out: &mut [f32]) {
        #[cfg(feature = "alloc_check")]
        assert_no_alloc::assert_no_alloc(|| self.process_block(out));
        #[cfg(not(feature = "alloc_check"))]
        self.process_block(out);
    }

    fn process_block(&mut self, out: &mut [f32]) {
        if !self.transport.is_playing() {
            out.fill(0.0);
            return;
        }

        self.apply_control();
        self.dispatch_due();

        let catalog = &*self.catalog;
        let mut chunks = out.chunks_exact_mut(2);
        for chunk in &mut chunks {
            self.voices.mix_frame(catalog).write_to(chunk);
        }
        chunks.into_remainder().fill(0.0);

        self.transport.advance((out.len() / 2) as u64);
    }

    /// Apply every pending control command.
    fn apply_control(&mut self) {
        let sample_rate = self.config.sample_rate;
        while let Some(command) = self.control.try_recv() {
            match command {
                ControlCommand::NoteOn { id, params } => {
                    self.voices.trigger(&self.catalog, &params, sample_rate, Some(id));
                }
                ControlCommand::NoteOff { id } => self.voices.release_tagged(id),
                ControlCommand::SetPan { id, pan } => self.voices.set_pan(id, pan),
                ControlCommand::SetAmplitude { id, amplitude } => self.voices.set_amplitude(id, amplitude),
                ControlCommand::ReleaseAll => self.voices.release_all(),
            }
        }
    }

    /// Trigger every event whose start time has been reached.
    fn dispatch_due(&mut self) {
        let sample_rate = self.config.sample_rate;
        let range = self.events.drain_until(self.transport.now());
        for i in range {
            if let Some(event) = self.events.get(i) {
                self.voices.trigger(&self.catalog, &event.params, sample_rate, None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ScoreBuilder;
    use pp_ir::{Note, PatchId, SampleAsset, TimelineEvent};

    const SR: u32 = 48_000;

    fn config() -> EngineConfig {
        EngineConfig { sample_rate: SR, block_size: 256, max_voices: 8, beats_per_second: 8.0, control_capacity: 16 }
    }

    fn catalog(len: usize) -> Arc<Catalog> {
        let mut catalog = Catalog::new();
        catalog
            .add_instrument("test", vec![SampleAsset::new("s", vec![0.5; len], SR, 60, 127)])
            .unwrap();
        Arc::new(catalog)
    }

    fn event_at(beats: i64) -> TimelineEvent {
        let mut params = VoiceParams::new(PatchId(0), Note::Pitch(60.0));
        params.attack_time = 0.0;
        TimelineEvent::new(0, BeatTime::from_beats(beats), BeatTime::from_beats(1), params)
    }

    /// Render until finished (or `max_blocks`), returning the left channel.
    fn render_left(engine: &mut Engine, max_blocks: usize) -> Vec<f32> {
        let mut buf = vec![0.0f32; engine.config().buffer_len()];
        let mut left = Vec::new();
        for _ in 0..max_blocks {
            engine.process(&mut buf);
            left.extend(buf.chunks_exact(2).map(|f| f[0]));
            if engine.is_finished() {
                break;
            }
        }
        left
    }

    #[test]
    fn stopped_engine_renders_silence() {
        let mut engine = Engine::new(catalog(100), EventQueue::from_events(vec![event_at(0)]), config());
        let mut buf = vec![1.0f32; 512];
        engine.process(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.0));
        assert_eq!(engine.frame(), 0);
    }

    #[test]
    fn event_at_zero_sounds_for_sample_length() {
        let mut engine = Engine::new(catalog(300), EventQueue::from_events(vec![event_at(0)]), config());
        engine.play();
        let left = render_left(&mut engine, 10);
        let sounding = left.iter().filter(|&&s| s != 0.0).count();
        assert_eq!(sounding, 300);
        assert!(left[..300].iter().all(|&s| s != 0.0));
        assert!(engine.is_finished());
    }

    #[test]
    fn events_fire_on_first_buffer_reaching_them() {
        // One beat is 6000 frames; buffers start every 256 frames, so the
        // first buffer at or after beat 1 starts at frame 6144.
        let mut engine = Engine::new(catalog(100), EventQueue::from_events(vec![event_at(1)]), config());
        engine.play();
        let left = render_left(&mut engine, 100);
        let first = left.iter().position(|&s| s != 0.0);
        assert_eq!(first, Some(6144));
    }

    #[test]
    fn negative_times_fire_immediately() {
        let mut engine = Engine::new(catalog(100), EventQueue::from_events(vec![event_at(-4)]), config());
        engine.play();
        let left = render_left(&mut engine, 4);
        assert_ne!(left[0], 0.0);
    }

    #[test]
    fn stop_cuts_voices_without_fade() {
        let mut engine = Engine::new(catalog(48_000), EventQueue::from_events(vec![event_at(0)]), config());
        engine.play();
        let mut buf = vec![0.0f32; 512];
        engine.process(&mut buf);
        assert_eq!(engine.active_voices(), 1);

        engine.stop();
        assert_eq!(engine.active_voices(), 0);
        engine.play();
        engine.process(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn control_note_on_and_off() {
        let mut engine = Engine::new(catalog(48_000), EventQueue::new(), config());
        let mut control = engine.take_control().unwrap();
        assert!(engine.take_control().is_none());
        engine.play();

        let mut params = VoiceParams::new(PatchId(0), Note::Pitch(60.0));
        params.release_time = 0.001;
        control.note_on(5, params).unwrap();
        let mut buf = vec![0.0f32; 512];
        engine.process(&mut buf);
        assert_eq!(engine.active_voices(), 1);

        control.note_off(5).unwrap();
        engine.process(&mut buf);
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn unresolvable_events_are_skipped() {
        let mut bad = event_at(0);
        bad.params.patch = PatchId(40);
        let mut engine = Engine::new(catalog(100), EventQueue::from_events(vec![bad]), config());
        engine.play();
        let left = render_left(&mut engine, 4);
        assert!(left.iter().all(|&s| s == 0.0));
        assert!(engine.is_finished());
    }

    #[test]
    fn rewind_replays_timeline() {
        let catalog = catalog(100);
        let mut score = ScoreBuilder::new(&catalog);
        score.note(60.0, BeatTime::from_beats(1), BeatTime::zero());
        let events = score.build();

        let mut engine = Engine::new(catalog.clone(), events, config());
        engine.play();
        let first = render_left(&mut engine, 4);
        engine.rewind();
        engine.play();
        let second = render_left(&mut engine, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn position_tracks_rendered_frames() {
        let mut engine = Engine::new(catalog(100), EventQueue::new(), config());
        engine.play();
        let mut buf = vec![0.0f32; 12_000];
        engine.process(&mut buf);
        assert_eq!(engine.position(), BeatTime::from_beats(1));
    }
}
