//! The patch catalog: every loaded sample and the patches that own them.

use alloc::vec::Vec;

use crate::error::CatalogError;
use crate::event::Note;
use crate::patch::{Hit, HitId, MultiSampleInstrument, Patch, PatchId, PercussionKit};
use crate::sample::{SampleAsset, SampleBank, SampleKey};

/// Reference pitch for percussion hits; a hit's offset is added to it.
pub const KIT_REFERENCE_PITCH: i32 = 0;

/// A sample chosen for a trigger, with the pitch to derive the rate from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved {
    pub sample: SampleKey,
    pub pitch: f32,
}

/// Sample bank plus the patches indexing into it.
///
/// Each sample is inserted together with the single patch that owns it.
/// After construction the catalog is only read.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    bank: SampleBank,
    patches: Vec<Patch>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pitched instrument. Samples must be ordered by non-decreasing
    /// `highest_pitch`.
    pub fn add_instrument(&mut self, name: &str, samples: Vec<SampleAsset>) -> Result<PatchId, CatalogError> {
        let keys: Vec<SampleKey> = samples.into_iter().map(|s| self.bank.insert(s)).collect();
        match MultiSampleInstrument::new(name, keys.clone(), &self.bank) {
            Ok(inst) => Ok(self.push(Patch::MultiSample(inst))),
            Err(e) => {
                for key in keys {
                    self.bank.remove(key);
                }
                Err(e)
            }
        }
    }

    /// Add an empty percussion kit.
    pub fn add_kit(&mut self, name: &str) -> PatchId {
        self.push(Patch::Percussion(PercussionKit::new(name)))
    }

    /// Add a hit to a kit. Returns the hit it replaced, if the name was
    /// already taken; the replaced sample is dropped from the bank.
    pub fn add_hit(
        &mut self,
        kit: PatchId,
        name: &str,
        sample: SampleAsset,
        pitch_offset: i32,
    ) -> Result<Option<Hit>, CatalogError> {
        let key = self.bank.insert(sample);
        let replaced = match self.patches.get_mut(kit.0 as usize) {
            Some(Patch::Percussion(k)) => k.insert(name, key, pitch_offset),
            Some(Patch::MultiSample(_)) => {
                self.bank.remove(key);
                return Err(CatalogError::NotAKit(kit));
            }
            None => {
                self.bank.remove(key);
                return Err(CatalogError::UnknownPatch(kit));
            }
        };
        if let Some(old) = &replaced {
            self.bank.remove(old.sample);
        }
        Ok(replaced)
    }

    fn push(&mut self, patch: Patch) -> PatchId {
        self.patches.push(patch);
        PatchId((self.patches.len() - 1) as u16)
    }

    /// Get a patch by id.
    pub fn patch(&self, id: PatchId) -> Option<&Patch> {
        self.patches.get(id.0 as usize)
    }

    /// All patches in id order.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Number of patches.
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// The sample bank.
    pub fn bank(&self) -> &SampleBank {
        &self.bank
    }

    /// Get a sample by key.
    pub fn sample(&self, key: SampleKey) -> Option<&SampleAsset> {
        self.bank.get(key)
    }

    /// Id of the first patch named `name`.
    pub fn find_patch(&self, name: &str) -> Option<PatchId> {
        self.patches
            .iter()
            .position(|p| p.name() == name)
            .map(|i| PatchId(i as u16))
    }

    /// The percussion kit with id `id`.
    pub fn kit(&self, id: PatchId) -> Result<&PercussionKit, CatalogError> {
        match self.patch(id) {
            Some(Patch::Percussion(kit)) => Ok(kit),
            Some(Patch::MultiSample(_)) => Err(CatalogError::NotAKit(id)),
            None => Err(CatalogError::UnknownPatch(id)),
        }
    }

    /// Id of the first percussion kit, if any.
    pub fn first_kit(&self) -> Option<PatchId> {
        self.patches
            .iter()
            .position(|p| matches!(p, Patch::Percussion(_)))
            .map(|i| PatchId(i as u16))
    }

    /// Dense id of `name` in kit `kit`.
    pub fn hit_id(&self, kit: PatchId, name: &str) -> Result<HitId, CatalogError> {
        let kit = self.kit(kit)?;
        kit.hit_id(name).ok_or_else(|| CatalogError::UnknownHit(name.into()))
    }

    /// Pick the sample for a trigger.
    ///
    /// Instruments take the melodic pitch. Kits play at the reference pitch
    /// plus the hit's offset; a melodic pitch sent to a kit selects the hit
    /// by index. Returns `None` when nothing matches or the pitch is not
    /// finite.
    pub fn resolve(&self, patch: PatchId, note: Note) -> Option<Resolved> {
        if matches!(note, Note::Pitch(p) if !p.is_finite()) {
            return None;
        }
        match (self.patch(patch)?, note) {
            (Patch::MultiSample(inst), Note::Pitch(pitch)) => Some(Resolved {
                sample: inst.resolve(libm::floorf(pitch) as i32, &self.bank),
                pitch,
            }),
            (Patch::MultiSample(_), Note::Hit(_)) => None,
            (Patch::Percussion(kit), Note::Hit(id)) => resolve_hit(kit, id),
            (Patch::Percussion(kit), Note::Pitch(pitch)) => {
                if pitch < 0.0 {
                    return None;
                }
                resolve_hit(kit, HitId(libm::floorf(pitch) as u16))
            }
        }
        .filter(|r| self.bank.contains_key(r.sample))
    }
}

fn resolve_hit(kit: &PercussionKit, id: HitId) -> Option<Resolved> {
    kit.hit(id).map(|hit| Resolved {
        sample: hit.sample,
        pitch: (KIT_REFERENCE_PITCH + hit.pitch_offset) as f32,
    })
}
