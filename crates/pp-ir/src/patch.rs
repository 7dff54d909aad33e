//! Instrument definitions: pitched multi-sample instruments and
//! percussion kits.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::error::CatalogError;
use crate::sample::{push_truncated, SampleBank, SampleKey};

/// Index of a patch in the catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatchId(pub u16);

/// Dense index of a hit inside a percussion kit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HitId(pub u16);

/// An instrument definition.
#[derive(Clone, Debug)]
pub enum Patch {
    /// Pitched instrument with one sample per pitch zone
    MultiSample(MultiSampleInstrument),
    /// Named one-shot hits
    Percussion(PercussionKit),
}

impl Patch {
    /// Patch name.
    pub fn name(&self) -> &str {
        match self {
            Patch::MultiSample(inst) => &inst.name,
            Patch::Percussion(kit) => &kit.name,
        }
    }

    /// Every sample key the patch owns.
    pub fn sample_keys(&self) -> Vec<SampleKey> {
        match self {
            Patch::MultiSample(inst) => inst.zones.clone(),
            Patch::Percussion(kit) => kit.hits.iter().map(|h| h.sample).collect(),
        }
    }
}

/// A pitched instrument: samples ordered by the highest pitch they serve.
#[derive(Clone, Debug)]
pub struct MultiSampleInstrument {
    /// Instrument name
    pub name: ArrayString<48>,
    zones: Vec<SampleKey>,
}

impl MultiSampleInstrument {
    /// Build an instrument from samples already in `bank`.
    ///
    /// Fails unless there is at least one sample, every key is in `bank`,
    /// and `highest_pitch` never decreases along `zones`.
    pub fn new(name: &str, zones: Vec<SampleKey>, bank: &SampleBank) -> Result<Self, CatalogError> {
        if zones.is_empty() {
            return Err(CatalogError::EmptyInstrument);
        }
        let mut previous = i32::MIN;
        for (index, key) in zones.iter().enumerate() {
            let highest = bank.get(*key).ok_or(CatalogError::MissingSample { index })?.highest_pitch;
            if highest < previous {
                return Err(CatalogError::MisorderedSamples { index, previous, highest });
            }
            previous = highest;
        }
        let mut inst = Self { name: ArrayString::new(), zones };
        push_truncated(&mut inst.name, name);
        Ok(inst)
    }

    /// Sample keys in zone order.
    pub fn zones(&self) -> &[SampleKey] {
        &self.zones
    }

    /// Pick the sample for `pitch`: the first zone whose highest pitch
    /// reaches it, otherwise the first zone.
    pub fn resolve(&self, pitch: i32, bank: &SampleBank) -> SampleKey {
        self.zones
            .iter()
            .copied()
            .find(|key| bank.get(*key).is_some_and(|s| s.highest_pitch >= pitch))
            .unwrap_or(self.zones[0])
    }
}

/// One entry in a percussion kit.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    /// Hit name as used when authoring
    pub name: String,
    /// Sample played by the hit
    pub sample: SampleKey,
    /// Semitones added to the kit's reference pitch
    pub pitch_offset: i32,
}

/// A name-keyed table of one-shot samples.
#[derive(Clone, Debug, Default)]
pub struct PercussionKit {
    /// Kit name
    pub name: ArrayString<48>,
    hits: Vec<Hit>,
    by_name: BTreeMap<String, HitId>,
}

impl PercussionKit {
    /// Create an empty kit.
    pub fn new(name: &str) -> Self {
        let mut kit = Self::default();
        push_truncated(&mut kit.name, name);
        kit
    }

    /// Add a hit. A hit with the same name is replaced and its previous
    /// definition returned.
    pub fn insert(&mut self, name: &str, sample: SampleKey, pitch_offset: i32) -> Option<Hit> {
        let hit = Hit { name: name.to_string(), sample, pitch_offset };
        match self.by_name.get(name) {
            Some(id) => Some(core::mem::replace(&mut self.hits[id.0 as usize], hit)),
            None => {
                let id = HitId(self.hits.len() as u16);
                self.hits.push(hit);
                self.by_name.insert(name.to_string(), id);
                None
            }
        }
    }

    /// Look a hit up by name.
    pub fn resolve(&self, name: &str) -> Result<(SampleKey, i32), CatalogError> {
        self.hit_id(name)
            .and_then(|id| self.hit(id))
            .map(|hit| (hit.sample, hit.pitch_offset))
            .ok_or_else(|| CatalogError::UnknownHit(name.to_string()))
    }

    /// Dense id for a hit name.
    pub fn hit_id(&self, name: &str) -> Option<HitId> {
        self.by_name.get(name).copied()
    }

    /// Hit by dense id.
    pub fn hit(&self, id: HitId) -> Option<&Hit> {
        self.hits.get(id.0 as usize)
    }

    /// All hits in insertion order.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
