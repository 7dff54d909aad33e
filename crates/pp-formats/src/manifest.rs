//! Catalog manifests.
//!
//! A manifest names the sample root directory and lists the instruments
//! and kits to load:
//!
//! ```yaml
//! root: samples
//! instruments:
//!   - name: piano
//!     pitches: [36, 48, 60, 72]
//!     correct: 0
//! kits:
//!   - name: drums
//!     hits:
//!       - KICK
//!       - { name: CRASH-LO, offset: 3 }
//! ```
//!
//! Instrument samples are read from `<root>/<instrument>/<pitch>.wav`,
//! kit hits from `<root>/<kit>/<hit>.wav`.

use config::{Config, File, FileFormat};
use pp_ir::{Catalog, CatalogError, SampleAsset, SampleProvider, MAX_PITCH};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::wav_format::WavProvider;
use crate::FormatError;

/// Top-level manifest.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CatalogManifest {
    /// Sample directory; relative paths resolve against the manifest's directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub instruments: Vec<InstrumentEntry>,
    #[serde(default)]
    pub kits: Vec<KitEntry>,
}

/// A pitched instrument recorded at a list of root pitches.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct InstrumentEntry {
    pub name: String,
    /// Recorded pitches, ascending. One sample file per pitch.
    pub pitches: Vec<i32>,
    /// Subtracted from every pitch to align recordings with the scale.
    #[serde(default)]
    pub correct: i32,
}

/// A percussion kit.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct KitEntry {
    pub name: String,
    pub hits: Vec<HitEntry>,
}

/// A kit hit, either a bare name or a name with a pitch offset.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HitEntry {
    Name(String),
    WithOffset {
        name: String,
        #[serde(default)]
        offset: i32,
    },
}

impl HitEntry {
    pub fn name(&self) -> &str {
        match self {
            HitEntry::Name(name) | HitEntry::WithOffset { name, .. } => name,
        }
    }

    pub fn offset(&self) -> i32 {
        match self {
            HitEntry::Name(_) => 0,
            HitEntry::WithOffset { offset, .. } => *offset,
        }
    }
}

impl InstrumentEntry {
    /// Zone `(file pitch, root, highest)` for every recorded pitch.
    ///
    /// Each zone reaches up to one below the next recording; the last
    /// covers the rest of the MIDI range. Pitches must be strictly
    /// ascending.
    pub fn zones(&self) -> Result<Vec<(i32, i32, i32)>, CatalogError> {
        if let Some(i) = self.pitches.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CatalogError::MisorderedSamples {
                index: i + 1,
                previous: self.pitches[i],
                highest: self.pitches[i + 1],
            });
        }
        Ok(self
            .pitches
            .iter()
            .enumerate()
            .map(|(i, &pitch)| {
                let ceiling = self.pitches.get(i + 1).map_or(MAX_PITCH, |next| next - 1);
                (pitch, pitch - self.correct, ceiling - self.correct)
            })
            .collect())
    }
}

impl CatalogManifest {
    /// Build a catalog, opening sample files through `provider`.
    pub fn build<P: SampleProvider>(&self, provider: &P) -> Result<Catalog, FormatError> {
        let mut catalog = Catalog::new();

        for inst in &self.instruments {
            let samples = inst
                .zones()?
                .into_iter()
                .map(|(file, root, highest)| -> Result<SampleAsset, FormatError> {
                    let path = format!("{}/{}.wav", inst.name, file);
                    let sample = SampleAsset::load(provider, &path, root, highest)?;
                    log_sample(&sample);
                    Ok(sample)
                })
                .collect::<Result<Vec<_>, _>>()?;
            catalog.add_instrument(&inst.name, samples)?;
        }

        for kit in &self.kits {
            let id = catalog.add_kit(&kit.name);
            for hit in &kit.hits {
                let path = format!("{}/{}.wav", kit.name, hit.name());
                let sample = SampleAsset::load(provider, &path, 0, 0)?;
                log_sample(&sample);
                if catalog.add_hit(id, hit.name(), sample, hit.offset())?.is_some() {
                    warn!(kit = %kit.name, hit = hit.name(), "duplicate hit name, later entry wins");
                }
            }
        }

        info!(
            patches = catalog.len(),
            samples = catalog.bank().len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

fn log_sample(sample: &SampleAsset) {
    info!(
        name = %sample.name,
        frames = sample.len(),
        sample_rate = sample.sample_rate,
        root = sample.root_pitch,
        highest = sample.highest_pitch,
        "loaded sample"
    );
}

/// Parse manifest text in any format the config crate understands.
pub fn parse_manifest(text: &str, format: FileFormat) -> Result<CatalogManifest, FormatError> {
    Ok(Config::builder()
        .add_source(File::from_str(text, format))
        .build()?
        .try_deserialize()?)
}

/// Read a manifest file and load every sample it lists from disk.
pub fn load_catalog(path: &Path) -> Result<Catalog, FormatError> {
    let manifest: CatalogManifest = Config::builder()
        .add_source(File::from(path))
        .build()?
        .try_deserialize()?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let root = match &manifest.root {
        Some(root) if root.is_absolute() => root.clone(),
        Some(root) => base.join(root),
        None => base.to_path_buf(),
    };
    info!(manifest = %path.display(), root = %root.display(), "loading catalog");
    manifest.build(&WavProvider::new(root))
}
