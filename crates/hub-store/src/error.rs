use std::path::PathBuf;

/// Errors from preference domain operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The domain name cannot be used for a store or a backend file.
    #[error("invalid domain name {name:?}: {reason}")]
    InvalidDomainName { name: String, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A persisted domain document could not be decoded.
    #[error("corrupt domain {name} at {path}: {reason}")]
    CorruptDomain {
        name: String,
        path: PathBuf,
        reason: String,
    },

    /// The domain could not be loaded, so writing it would discard its
    /// stored contents.
    #[error("domain {name} failed to load; refusing to overwrite it")]
    DomainUnavailable { name: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding backend state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
