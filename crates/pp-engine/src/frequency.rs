//! Pitch-to-rate conversion for sample playback.
//!
//! A sample recorded at `root_pitch` plays back at rate 1.0 for that
//! pitch; every semitone away multiplies the rate by 2^(1/12). The rate is
//! applied to the frame position directly, with no clamping.

/// Playback rate for `pitch` on a sample whose root is `root_pitch`.
///
/// Exactly 1.0 when the pitches match.
pub fn playback_rate(pitch: f32, root_pitch: i32) -> f64 {
    let semitones = pitch as f64 - root_pitch as f64;
    if semitones == 0.0 {
        return 1.0;
    }
    libm::exp2(semitones / 12.0)
}
