use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domains::{PersistentDomains, SyncMode};
use crate::file::FileDomainStore;

/// Where persistent domains live and how eagerly they are written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one document per domain.
    pub root: PathBuf,
    pub sync_mode: SyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            sync_mode: SyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Configuration rooted at `root` with default sync behaviour.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Build the shared domain cache over a [`FileDomainStore`].
    pub fn open(&self) -> Arc<PersistentDomains> {
        Arc::new(PersistentDomains::new(
            Arc::new(FileDomainStore::new(&self.root)),
            self.sync_mode,
        ))
    }
}

/// `<config dir>/hub/preferences`, or under the temp dir when the platform
/// has no config directory.
pub fn default_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hub")
        .join("preferences")
}
