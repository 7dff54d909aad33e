//! Audio frame type.

/// A stereo audio frame (f32, nominally in [-1, 1]).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0.0, right: 0.0 }
    }

    /// Create a mono frame (same value for both channels).
    pub const fn mono(value: f32) -> Self {
        Self { left: value, right: value }
    }

    /// Sum another frame into this one. No clipping; the sink owns that.
    pub fn mix(&mut self, other: StereoFrame) {
        self.left += other.left;
        self.right += other.right;
    }

    /// Write the frame as an interleaved pair.
    pub fn write_to(self, out: &mut [f32]) {
        if let [l, r, ..] = out {
            *l = self.left;
            *r = self.right;
        }
    }

    /// Convert to 16-bit PCM, clamping out-of-range values.
    pub fn to_i16(self) -> (i16, i16) {
        (to_i16(self.left), to_i16(self.right))
    }
}

fn to_i16(v: f32) -> i16 {
    (v.clamp(-1.0, 1.0) * 32767.0) as i16
}
