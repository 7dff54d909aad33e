//! VoicePool: fixed-capacity voice allocation and lifecycle management.

use alloc::vec::Vec;
use pp_ir::{Catalog, VoiceParams};

use crate::frame::StereoFrame;
use crate::voice::{Voice, VoiceTag};

/// Identifier for a voice slot in the pool.
pub type VoiceId = usize;

/// Default number of simultaneous voices.
pub const MAX_VOICES: usize = 64;

/// Pool of voices, allocated once and reused.
///
/// When every slot is busy a new trigger steals one: releasing voices go
/// first, then any other, and among equals the one triggered earliest.
pub struct VoicePool {
    slots: Vec<Voice>,
    next_seq: u64,
}

impl VoicePool {
    /// Create a pool with `capacity` free voices (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity.max(1)).map(|_| Voice::new()).collect(),
            next_seq: 0,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Resolve and start a voice, stealing a slot if the pool is full.
    ///
    /// Returns `None` without touching any slot when nothing resolves.
    pub fn trigger(
        &mut self,
        catalog: &Catalog,
        params: &VoiceParams,
        sample_rate: u32,
        tag: Option<VoiceTag>,
    ) -> Option<VoiceId> {
        let resolved = catalog.resolve(params.patch, params.note)?;
        let sample = catalog.sample(resolved.sample)?;

        let id = self.allocate();
        let seq = self.next_seq;
        self.next_seq += 1;

        let voice = &mut self.slots[id];
        voice.start(resolved, sample, params, sample_rate);
        voice.set_tag(tag);
        voice.set_seq(seq);
        Some(id)
    }

    /// Pick a slot: the first free one, otherwise a steal victim.
    fn allocate(&self) -> VoiceId {
        if let Some(id) = self.slots.iter().position(Voice::is_free) {
            return id;
        }
        self.find_steal_candidate()
    }

    /// Releasing voices before sustaining ones, oldest first.
    fn find_steal_candidate(&self) -> VoiceId {
        self.slots
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| (!v.is_releasing(), v.seq()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Get a reference to a voice.
    pub fn get(&self, id: VoiceId) -> Option<&Voice> {
        self.slots.get(id).filter(|v| !v.is_free())
    }

    /// Get a mutable reference to a voice.
    pub fn get_mut(&mut self, id: VoiceId) -> Option<&mut Voice> {
        self.slots.get_mut(id).filter(|v| !v.is_free())
    }

    /// Release one voice.
    pub fn release(&mut self, id: VoiceId) {
        if let Some(voice) = self.get_mut(id) {
            voice.release();
        }
    }

    /// Release every live voice carrying `tag`.
    pub fn release_tagged(&mut self, tag: VoiceTag) {
        self.for_tagged(tag, Voice::release);
    }

    /// Release every live voice.
    pub fn release_all(&mut self) {
        for voice in self.slots.iter_mut().filter(|v| !v.is_free()) {
            voice.release();
        }
    }

    pub fn set_pan(&mut self, tag: VoiceTag, pan: f32) {
        self.for_tagged(tag, |v| v.set_pan(pan));
    }

    pub fn set_amplitude(&mut self, tag: VoiceTag, amplitude: f32) {
        self.for_tagged(tag, |v| v.set_amplitude(amplitude));
    }

    fn for_tagged(&mut self, tag: VoiceTag, mut f: impl FnMut(&mut Voice)) {
        for voice in self.slots.iter_mut() {
            if !voice.is_free() && voice.tag() == Some(tag) {
                f(voice);
            }
        }
    }

    /// Free every voice immediately, with no fade.
    pub fn kill_all(&mut self) {
        for voice in &mut self.slots {
            voice.kill();
        }
    }

    /// Count of sounding voices.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|v| !v.is_free()).count()
    }

    /// Step every live voice once and sum the result.
    pub fn mix_frame(&mut self, catalog: &Catalog) -> StereoFrame {
        let mut out = StereoFrame::silence();
        for voice in self.slots.iter_mut().filter(|v| !v.is_free()) {
            out.mix(voice.step(catalog));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pp_ir::{Note, PatchId, SampleAsset};

    const SR: u32 = 48_000;

    fn catalog(len: usize) -> (Catalog, PatchId) {
        let mut catalog = Catalog::new();
        let id = catalog
            .add_instrument("test", vec![SampleAsset::new("s", vec![0.5; len], SR, 60, 127)])
            .unwrap();
        (catalog, id)
    }

    fn note(patch: PatchId) -> VoiceParams {
        VoiceParams::new(patch, Note::Pitch(60.0))
    }

    #[test]
    fn pool_new_is_empty() {
        let pool = VoicePool::new(8);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.capacity(), 8);
    }

    #[test]
    fn trigger_allocates_distinct_slots() {
        let (catalog, patch) = catalog(100);
        let mut pool = VoicePool::new(4);
        let a = pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        let b = pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn unresolved_trigger_takes_no_slot() {
        let (catalog, _) = catalog(100);
        let mut pool = VoicePool::new(1);
        assert!(pool.trigger(&catalog, &note(PatchId(3)), SR, None).is_none());
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn nan_pitch_never_starts_a_voice() {
        let (catalog, patch) = catalog(100);
        let mut pool = VoicePool::new(1);
        pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        let params = VoiceParams::new(patch, Note::Pitch(f32::NAN));
        assert!(pool.trigger(&catalog, &params, SR, None).is_none());
        assert_eq!(pool.active_count(), 1);

        let mut voice = Voice::new();
        assert!(!voice.trigger(&catalog, &params, SR));
        assert!(voice.is_free());
    }

    #[test]
    fn full_pool_steals_oldest() {
        let (catalog, patch) = catalog(1000);
        let mut pool = VoicePool::new(2);
        let first = pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        let third = pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        assert_eq!(third, first);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn full_pool_prefers_releasing_voice() {
        let (catalog, patch) = catalog(1000);
        let mut pool = VoicePool::new(3);
        pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        let second = pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        pool.release(second);

        let stolen = pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        assert_eq!(stolen, second);
        assert!(!pool.get(stolen).unwrap().is_releasing());
    }

    #[test]
    fn finished_voices_free_their_slot() {
        let (catalog, patch) = catalog(4);
        let mut pool = VoicePool::new(2);
        pool.trigger(&catalog, &note(patch), SR, None).unwrap();
        for _ in 0..4 {
            pool.mix_frame(&catalog);
        }
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn tagged_release_only_touches_matching_voices() {
        let (catalog, patch) = catalog(1000);
        let mut pool = VoicePool::new(4);
        let a = pool.trigger(&catalog, &note(patch), SR, Some(1)).unwrap();
        let b = pool.trigger(&catalog, &note(patch), SR, Some(2)).unwrap();
        pool.release_tagged(1);
        assert!(pool.get(a).unwrap().is_releasing());
        assert!(!pool.get(b).unwrap().is_releasing());
    }

    #[test]
    fn kill_all_silences_immediately() {
        let (catalog, patch) = catalog(1000);
        let mut pool = VoicePool::new(4);
        pool.trigger(&catalog, &note(patch), SR, None);
        pool.trigger(&catalog, &note(patch), SR, None);
        pool.kill_all();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.mix_frame(&catalog), StereoFrame::silence());
    }

    #[test]
    fn mix_sums_voices() {
        let (catalog, patch) = catalog(100);
        let mut single = VoicePool::new(2);
        let mut double = VoicePool::new(2);
        single.trigger(&catalog, &note(patch), SR, None);
        double.trigger(&catalog, &note(patch), SR, None);
        double.trigger(&catalog, &note(patch), SR, None);
        for _ in 0..10 {
            let one = single.mix_frame(&catalog);
            let two = double.mix_frame(&catalog);
            assert!((two.left - 2.0 * one.left).abs() < 1e-6);
        }
    }
}
