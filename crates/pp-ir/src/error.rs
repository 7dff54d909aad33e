//! Error types for catalog construction and sample loading.

use alloc::string::String;

use crate::patch::PatchId;

/// Catalog construction or lookup failure.
///
/// These surface while the catalog and score are being built, before any
/// audio is rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// An instrument was defined without any samples.
    #[error("instrument has no samples")]
    EmptyInstrument,

    /// Sample `index` is out of pitch order with the one before it.
    #[error("sample {index} at pitch {highest} is out of order after {previous}")]
    MisorderedSamples {
        index: usize,
        previous: i32,
        highest: i32,
    },

    /// Zone `index` names a sample that is not in the bank.
    #[error("sample {index} is not in the sample bank")]
    MissingSample { index: usize },

    /// A percussion hit name is not in the kit.
    #[error("unknown percussion hit '{0}'")]
    UnknownHit(String),

    /// A patch id is outside the catalog.
    #[error("unknown patch {0:?}")]
    UnknownPatch(PatchId),

    /// A percussion operation named a melodic instrument.
    #[error("patch {0:?} is not a percussion kit")]
    NotAKit(PatchId),

    /// The catalog holds no percussion kit to default to.
    #[error("catalog has no percussion kit")]
    NoPercussionKit,
}

/// Failure to pull a recording out of a sample provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The provider could not open or decode the recording.
    #[error("failed to load '{path}': {message}")]
    Provider { path: String, message: String },

    /// The recording opened but holds no frames.
    #[error("'{0}' contains no audio frames")]
    Empty(String),
}
