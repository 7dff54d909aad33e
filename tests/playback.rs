//! End-to-end playback scenarios through the headless controller.

use pp_audio::MemoryOutput;
use pp_engine::{pan_gains, ScoreBuilder, ATTENUATION};
use pp_ir::{BeatTime, Catalog, Note, PatchId, SampleAsset, VoiceParams};
use pp_master::{Controller, EventQueue, SessionConfig, StereoFrame};
use std::time::{Duration, Instant};

const SR: u32 = 48_000;
/// Frames per beat at the default eight beats per second.
const BEAT: usize = 6000;

/// Authored pitch that lands on the flat sample's root.
const ROOT: f32 = 60.0 - pp_engine::NOTE_OFFSET;

fn flat_catalog(len: usize) -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .add_instrument("flat", vec![SampleAsset::new("flat", vec![0.5; len], SR, 60, 127)])
        .unwrap();
    let kit = catalog.add_kit("drums");
    catalog.add_hit(kit, "CLICK", SampleAsset::new("click", vec![1.0; 100], SR, 0, 0), 12).unwrap();
    catalog
}

fn session() -> SessionConfig {
    SessionConfig::default()
}

fn peak(frames: &[StereoFrame]) -> f32 {
    frames.iter().map(|f| f.left.abs().max(f.right.abs())).fold(0.0, f32::max)
}

#[test]
fn single_note_plays_for_sample_length() {
    let catalog = flat_catalog(3000);
    let mut score = ScoreBuilder::new(&catalog);
    score.note(ROOT, BeatTime::from_beats(1), BeatTime::zero());
    let events = score.build();

    let ctrl = Controller::new(catalog, events, session()).unwrap();
    let frames = ctrl.render_frames(usize::MAX);

    // Voice is audible for exactly the sample length, then silent.
    assert!(frames[2999].left != 0.0);
    assert!(frames[3000..].iter().all(|f| *f == StereoFrame::silence()));
    assert_eq!(frames.len(), 3072);
}

#[test]
fn sustained_level_matches_gain_staging() {
    let catalog = flat_catalog(BEAT);
    let mut score = ScoreBuilder::new(&catalog);
    score.set_volume(0.5).note(ROOT, BeatTime::from_beats(1), BeatTime::zero());
    let events = score.build();

    let frames = Controller::new(catalog, events, session()).unwrap().render_frames(usize::MAX);
    let (gl, gr) = pan_gains(0.0);
    let expected = 0.5 / ATTENUATION * 0.5 * 1.375;
    let mid = frames[BEAT / 2];
    assert!((mid.left - expected * gl).abs() < 1e-5);
    assert!((mid.right - expected * gr).abs() < 1e-5);
}

#[test]
fn octave_up_halves_duration() {
    let catalog = flat_catalog(4000);
    let mut score = ScoreBuilder::new(&catalog);
    score.note(60.0, BeatTime::from_beats(1), BeatTime::zero());
    let events = score.build();

    let frames = Controller::new(catalog, events, session()).unwrap().render_frames(usize::MAX);
    assert!(frames[1999].left != 0.0);
    assert_eq!(frames[2000], StereoFrame::silence());
}

#[test]
fn chord_voices_sum() {
    let catalog = flat_catalog(BEAT);
    let single = {
        let mut score = ScoreBuilder::new(&catalog);
        score.note(ROOT, BeatTime::from_beats(1), BeatTime::zero());
        score.build()
    };
    let chord = {
        let mut score = ScoreBuilder::new(&catalog);
        let len = BeatTime::from_beats(1);
        score.chord_note(ROOT, len, BeatTime::zero()).chord_note(ROOT, len, BeatTime::zero()).chord_note(ROOT, len, len);
        score.build()
    };

    let one = Controller::new(catalog.clone(), single, session()).unwrap().render_frames(BEAT);
    let three = Controller::new(catalog, chord, session()).unwrap().render_frames(BEAT);
    assert!((peak(&three) - 3.0 * peak(&one)).abs() < 1e-5);
}

#[test]
fn tracks_are_independent() {
    let catalog = flat_catalog(1000);
    let mut score = ScoreBuilder::new(&catalog);
    score.note(ROOT, BeatTime::from_beats(4), BeatTime::zero());
    score.set_track(1).rest(BeatTime::from_beats(2)).note(ROOT, BeatTime::from_beats(1), BeatTime::zero());
    let events = score.build();

    let frames = Controller::new(catalog, events, session()).unwrap().render_frames(usize::MAX);
    // Track 1 starts at beat 2 regardless of track 0's long note; the
    // first buffer at or past frame 12000 is the one starting at 12032.
    assert_eq!(frames[12_031], StereoFrame::silence());
    assert!(frames[12_032 + 100].left != 0.0);
}

#[test]
fn percussion_hit_plays_at_offset_pitch() {
    let catalog = flat_catalog(100);
    let mut score = ScoreBuilder::new(&catalog);
    score.percussion_hit("CLICK", BeatTime::zero(), BeatTime::from_beats(8)).unwrap();
    let events = score.build();

    // Offset 12 against reference pitch 0 with a sample rooted at 0:
    // one octave up, so the 100-frame click lasts 50 frames.
    let frames = Controller::new(catalog, events, session()).unwrap().render_frames(usize::MAX);
    assert!(frames[49].left != 0.0);
    assert_eq!(frames[50], StereoFrame::silence());
}

#[test]
fn hard_panned_note_is_one_sided() {
    let catalog = flat_catalog(1000);
    let mut score = ScoreBuilder::new(&catalog);
    score.set_pan(-1.0).note(ROOT, BeatTime::from_beats(1), BeatTime::zero());
    let events = score.build();

    let frames = Controller::new(catalog, events, session()).unwrap().render_frames(usize::MAX);
    assert!(frames[500].left > 0.0);
    assert!(frames[500].right.abs() < 1e-6);
}

#[test]
fn wav_export_has_expected_length() {
    let catalog = flat_catalog(1000);
    let mut score = ScoreBuilder::new(&catalog);
    score.note(ROOT, BeatTime::from_beats(1), BeatTime::zero());
    let events = score.build();

    let wav = Controller::new(catalog, events, session()).unwrap().render_to_wav().unwrap();
    // 1000 frames round up to four 256-frame buffers.
    assert_eq!(wav.len(), 44 + 1024 * 4);
}

#[test]
fn threaded_playback_with_live_control() {
    let catalog = flat_catalog(SR as usize);
    let mut ctrl = Controller::new(catalog, EventQueue::new(), session()).unwrap();
    let output = MemoryOutput::new(SR);
    let captured = output.clone();

    // An empty timeline finishes at once and only the silent tail is written.
    ctrl.play_with(move |_| Ok(output)).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !ctrl.is_finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(ctrl.is_finished());
    assert!(captured.frames().lock().unwrap().iter().all(|f| *f == StereoFrame::silence()));

    let catalog = flat_catalog(SR as usize);
    let mut score = ScoreBuilder::new(&catalog);
    score.rest(BeatTime::from_beats(40)).note(ROOT, BeatTime::from_beats(1), BeatTime::zero());
    let events = score.build();
    let mut ctrl = Controller::new(catalog, events, session()).unwrap();
    ctrl.play_with(|_| Ok(MemoryOutput::new(SR))).unwrap();

    let control = ctrl.control().expect("control channel");
    control.note_on(7, VoiceParams::new(PatchId(0), Note::Pitch(60.0))).unwrap();
    control.note_off(7).unwrap();
    ctrl.stop();
    assert!(!ctrl.is_playing());
}
