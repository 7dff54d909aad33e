//! Parameter ranges for the control surface.
//!
//! The engine itself never validates; whatever feeds it (live control,
//! score files) clamps through these first.

use pp_ir::{Note, VoiceParams, MAX_PITCH};

/// Closed range for one parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp `value` into the range. NaN maps to `min`.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

pub const AMPLITUDE: ParamRange = ParamRange::new(0.0, 20.0);
pub const MIDI_NOTE: ParamRange = ParamRange::new(0.0, MAX_PITCH as f32);
pub const ATTACK_TIME: ParamRange = ParamRange::new(0.001, 3.0);
pub const RELEASE_TIME: ParamRange = ParamRange::new(0.001, 10.0);
pub const PAN: ParamRange = ParamRange::new(-1.0, 1.0);

/// Clamp every continuous field of `params`.
pub fn clamp_params(params: VoiceParams) -> VoiceParams {
    let note = match params.note {
        Note::Pitch(p) => Note::Pitch(MIDI_NOTE.clamp(p)),
        hit => hit,
    };
    VoiceParams {
        note,
        amplitude: AMPLITUDE.clamp(params.amplitude),
        attack_time: ATTACK_TIME.clamp(params.attack_time),
        release_time: RELEASE_TIME.clamp(params.release_time),
        pan: PAN.clamp(params.pan),
        ..params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pp_ir::{HitId, PatchId};

    #[test]
    fn clamp_limits_to_range() {
        assert_eq!(PAN.clamp(2.0), 1.0);
        assert_eq!(PAN.clamp(-0.5), -0.5);
        assert_eq!(ATTACK_TIME.clamp(0.0), 0.001);
        assert_eq!(AMPLITUDE.clamp(f32::NAN), 0.0);
    }

    #[test]
    fn clamp_params_leaves_valid_values() {
        let params = VoiceParams::new(PatchId(2), Note::Pitch(64.5));
        assert_eq!(clamp_params(params), params);
    }

    #[test]
    fn clamp_params_keeps_hits() {
        let mut params = VoiceParams::new(PatchId(1), Note::Hit(HitId(3)));
        params.release_time = 60.0;
        let clamped = clamp_params(params);
        assert_eq!(clamped.note, Note::Hit(HitId(3)));
        assert_eq!(clamped.release_time, 10.0);
    }
}
