//! Error type for format parsing and loading.

use pp_ir::{CatalogError, LoadError};
use std::path::PathBuf;

/// Error type for format parsing.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    #[error("invalid header")]
    InvalidHeader,
    /// Unexpected end of file
    #[error("unexpected end of file")]
    UnexpectedEof,
    /// Encoding or layout the decoder does not handle
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// Reading a file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Manifest or score could not be read or deserialized
    #[error("manifest error: {0}")]
    Manifest(#[from] config::ConfigError),
    /// A score named a patch the catalog does not have
    #[error("unknown patch '{0}'")]
    UnknownPatch(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Load(#[from] LoadError),
}
