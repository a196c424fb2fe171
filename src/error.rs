//! Error types for the parts of encore that can actually fail.
//!
//! The playback core never returns errors (failures degrade into adapter
//! events or no-ops); these cover configuration and catalog loading.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The layered configuration could not be built or deserialized.
    #[error("failed to load config: {0}")]
    Config(#[from] ::config::ConfigError),

    /// The configuration loaded but contains values we refuse to run with.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The catalog manifest could not be read from disk.
    #[error("failed to read catalog manifest {path:?}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog manifest is not valid TOML or does not match the schema.
    #[error("failed to parse catalog manifest {path:?}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Two tracks in the catalog share the same id.
    #[error("duplicate track id in catalog: {0}")]
    DuplicateTrack(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
