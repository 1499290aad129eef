use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading a [`crate::RegistryConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config document is not valid TOML for the config schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An override carried a value outside its domain.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Errors from managing the process-wide registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The global registry was already created, either by an earlier
    /// install or by first use.
    #[error("global registry is already initialized")]
    AlreadyInitialized,
}
