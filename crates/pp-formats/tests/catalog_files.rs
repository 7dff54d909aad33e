//! Loading a manifest, its WAV samples and a score from disk.

use pp_formats::{load_catalog, load_score, FormatError};
use pp_ir::{CatalogError, Note, Patch};
use std::fs;
use std::path::PathBuf;

/// Fresh scratch directory for one test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pp-formats-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// 16-bit mono WAV holding `frames` samples of a constant value.
fn wav_bytes(sample_rate: u32, frames: usize, value: i16) -> Vec<u8> {
    let data_size = (frames * 2) as u32;
    let mut buf = Vec::new();
    buf.extend(b"RIFF");
    buf.extend(&(36 + data_size).to_le_bytes());
    buf.extend(b"WAVE");
    buf.extend(b"fmt ");
    buf.extend(&16u32.to_le_bytes());
    buf.extend(&1u16.to_le_bytes());
    buf.extend(&1u16.to_le_bytes());
    buf.extend(&sample_rate.to_le_bytes());
    buf.extend(&(sample_rate * 2).to_le_bytes());
    buf.extend(&2u16.to_le_bytes());
    buf.extend(&16u16.to_le_bytes());
    buf.extend(b"data");
    buf.extend(&data_size.to_le_bytes());
    for _ in 0..frames {
        buf.extend(&value.to_le_bytes());
    }
    buf
}

fn write_sample(dir: &PathBuf, rel: &str, frames: usize) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, wav_bytes(48_000, frames, 16384)).unwrap();
}

const MANIFEST: &str = "
root: samples
instruments:
  - name: piano
    pitches: [48, 60]
kits:
  - name: drums
    hits:
      - KICK
      - { name: SNARE, offset: 2 }
";

const SCORE: &str = "
tracks:
  - id: 0
    ops:
      - { op: patch, name: piano }
      - { op: note, pitch: 50, length: 2 }
      - { op: note, pitch: 64 }
  - id: 1
    ops:
      - { op: hit, name: SNARE, gap: 1 }
      - { op: hit, name: KICK }
";

fn setup(name: &str) -> PathBuf {
    let dir = scratch_dir(name);
    write_sample(&dir, "samples/piano/48.wav", 100);
    write_sample(&dir, "samples/piano/60.wav", 200);
    write_sample(&dir, "samples/drums/KICK.wav", 50);
    write_sample(&dir, "samples/drums/SNARE.wav", 60);
    fs::write(dir.join("catalog.yaml"), MANIFEST).unwrap();
    fs::write(dir.join("song.yaml"), SCORE).unwrap();
    dir
}

#[test]
fn manifest_loads_samples_from_disk() {
    let dir = setup("manifest");
    let catalog = load_catalog(&dir.join("catalog.yaml")).unwrap();

    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.bank().len(), 4);

    let piano = catalog.find_patch("piano").unwrap();
    let Some(Patch::MultiSample(inst)) = catalog.patch(piano) else {
        panic!("piano should be an instrument");
    };
    let low = catalog.sample(inst.zones()[0]).unwrap();
    assert_eq!(low.len(), 100);
    assert_eq!((low.root_pitch, low.highest_pitch), (48, 59));
    assert_eq!(low.data()[0], 0.5);

    let high = catalog.resolve(piano, Note::Pitch(100.0)).unwrap();
    assert_eq!(catalog.sample(high.sample).unwrap().len(), 200);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn score_builds_against_loaded_catalog() {
    let dir = setup("score");
    let catalog = load_catalog(&dir.join("catalog.yaml")).unwrap();
    let events = load_score(&dir.join("song.yaml")).unwrap().events(&catalog).unwrap();

    assert_eq!(events.len(), 4);
    let starts: Vec<f64> = events.iter().map(|e| e.start.as_beats_f64()).collect();
    assert_eq!(starts, vec![0.0, 0.0, 1.0, 2.0]);

    let snare = events.iter().find(|e| e.track == 1).unwrap();
    let resolved = catalog.resolve(snare.params.patch, snare.params.note).unwrap();
    assert_eq!(resolved.pitch, 2.0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_sample_file_names_the_path() {
    let dir = setup("missing");
    fs::remove_file(dir.join("samples/drums/KICK.wav")).unwrap();

    let err = load_catalog(&dir.join("catalog.yaml")).unwrap_err();
    assert!(matches!(err, FormatError::Load(_)));
    assert!(err.to_string().contains("drums/KICK.wav"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_manifest_is_a_config_error() {
    let dir = scratch_dir("no-manifest");
    let err = load_catalog(&dir.join("absent.yaml")).unwrap_err();
    assert!(matches!(err, FormatError::Manifest(_)));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unsorted_pitches_are_fatal() {
    let dir = setup("unsorted");
    write_sample(&dir, "samples/piano/72.wav", 100);
    let manifest = "
root: samples
instruments:
  - name: piano
    pitches: [60, 48, 72]
";
    fs::write(dir.join("catalog.yaml"), manifest).unwrap();

    let err = load_catalog(&dir.join("catalog.yaml")).unwrap_err();
    assert!(matches!(
        err,
        FormatError::Catalog(CatalogError::MisorderedSamples { index: 1, previous: 60, highest: 48 })
    ));

    let _ = fs::remove_dir_all(&dir);
}
