use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::DomainStore;
use crate::value::{Domain, Value};

/// When cached mutations reach the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Write through to the backend on every mutation.
    #[default]
    EveryWrite,
    /// Hold mutations in memory until [`PersistentDomains::flush`].
    Manual,
}

/// Cached state of one persistent domain.
#[derive(Debug, Default)]
struct CachedDomain {
    values: Domain,
    /// Whether the domain exists (was loaded from the backend or written).
    exists: bool,
    /// Whether the cache differs from the backend.
    dirty: bool,
    /// The last backend load failed. `values` holds only writes made since,
    /// and the domain is never persisted until a load succeeds.
    load_failed: bool,
}

/// Process-shared cache of persistent domains over one backend.
///
/// Every store instance built on the same backend holds an `Arc` to one
/// `PersistentDomains`, so a write through one instance is immediately
/// visible to every other instance whose search list includes that domain.
/// Domains are loaded lazily on first touch and stay cached. A domain whose
/// load failed reads as empty, is loaded again on the next access and is
/// never saved over.
pub struct PersistentDomains {
    backend: Arc<dyn DomainStore>,
    sync_mode: SyncMode,
    cache: RwLock<HashMap<String, CachedDomain>>,
}

impl PersistentDomains {
    pub fn new(backend: Arc<dyn DomainStore>, sync_mode: SyncMode) -> Self {
        Self {
            backend,
            sync_mode,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Shared cache over a fresh [`crate::InMemoryDomainStore`].
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self::new(
            Arc::new(crate::memory::InMemoryDomainStore::new()),
            SyncMode::EveryWrite,
        ))
    }

    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    pub fn backend(&self) -> &Arc<dyn DomainStore> {
        &self.backend
    }

    /// Value of `key` in `domain`.
    pub fn get(&self, domain: &str, key: &str) -> Option<Value> {
        if let Some(value) = self.with_loaded(domain, |cached| cached.values.get(key).cloned()) {
            return value;
        }
        let mut cache = self.write_cache();
        self.entry(&mut cache, domain).values.get(key).cloned()
    }

    /// Set or, with `None`, remove `key` in `domain`.
    pub fn set(&self, domain: &str, key: &str, value: Option<Value>) -> StoreResult<()> {
        let mut cache = self.write_cache();
        let cached = self.entry(&mut cache, domain);
        match value {
            Some(value) => {
                cached.values.insert(key.to_string(), value);
                cached.exists = true;
            }
            None => {
                if cached.values.remove(key).is_none() {
                    return Ok(());
                }
            }
        }
        cached.dirty = true;
        self.write_through(domain, cached)
    }

    /// Copy of a whole domain, or `None` if it does not exist.
    pub fn snapshot(&self, domain: &str) -> Option<Domain> {
        let snap = |cached: &CachedDomain| cached.exists.then(|| cached.values.clone());
        if let Some(snapshot) = self.with_loaded(domain, snap) {
            return snapshot;
        }
        let mut cache = self.write_cache();
        snap(&*self.entry(&mut cache, domain))
    }

    /// Replace every value of `domain`, also over a domain that failed to
    /// load.
    pub fn replace(&self, domain: &str, values: Domain) -> StoreResult<()> {
        let mut cache = self.write_cache();
        let cached = cache.entry(domain.to_string()).or_default();
        cached.values = values;
        cached.exists = true;
        cached.dirty = true;
        cached.load_failed = false;
        self.write_through(domain, cached)
    }

    /// Delete `domain` entirely.
    pub fn remove(&self, domain: &str) -> StoreResult<()> {
        let mut cache = self.write_cache();
        let cached = cache.entry(domain.to_string()).or_default();
        cached.values.clear();
        cached.exists = false;
        cached.dirty = true;
        cached.load_failed = false;
        self.write_through(domain, cached)
    }

    /// Persist every dirty domain. Every dirty domain is attempted; the
    /// first error is returned.
    pub fn flush(&self) -> StoreResult<()> {
        let mut cache = self.write_cache();
        let mut first_error = None;
        let mut flushed = 0usize;
        for (name, cached) in cache.iter_mut().filter(|(_, c)| c.dirty) {
            match self.persist(name, cached) {
                Ok(()) => flushed += 1,
                Err(e) => {
                    warn!(domain = %name, error = %e, "failed to flush domain");
                    first_error.get_or_insert(e);
                }
            }
        }
        debug!(flushed, "flushed persistent domains");
        first_error.map_or(Ok(()), Err)
    }

    /// Returns `true` if any cached domain has unflushed changes.
    pub fn is_dirty(&self) -> bool {
        self.read_cache().values().any(|c| c.dirty)
    }

    /// Names of every existing domain, from the backend and the cache.
    pub fn names(&self) -> StoreResult<Vec<String>> {
        let mut names = self.backend.names()?;
        let cache = self.read_cache();
        names.retain(|name| cache.get(name).map_or(true, |c| c.exists || c.load_failed));
        names.extend(
            cache
                .iter()
                .filter(|(_, c)| c.exists)
                .map(|(name, _)| name.clone()),
        );
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Run `f` on a domain that is already cached.
    fn with_loaded<R>(&self, domain: &str, f: impl FnOnce(&CachedDomain) -> R) -> Option<R> {
        self.read_cache()
            .get(domain)
            .filter(|cached| !cached.load_failed)
            .map(f)
    }

    /// Cached entry for `domain`, loading it from the backend if it is not
    /// cached yet or its last load failed.
    fn entry<'a>(
        &self,
        cache: &'a mut HashMap<String, CachedDomain>,
        domain: &str,
    ) -> &'a mut CachedDomain {
        let cached = cache.entry(domain.to_string()).or_insert_with(|| CachedDomain {
            load_failed: true,
            ..Default::default()
        });
        if cached.load_failed {
            self.load(domain, cached);
        }
        cached
    }

    /// Load `domain` under any writes already cached for it.
    fn load(&self, domain: &str, cached: &mut CachedDomain) {
        match self.backend.load(domain) {
            Ok(loaded) => {
                cached.load_failed = false;
                if let Some(mut values) = loaded {
                    debug!(domain, keys = values.len(), "cached persistent domain");
                    values.append(&mut cached.values);
                    cached.values = values;
                    cached.exists = true;
                }
            }
            Err(e) => {
                warn!(domain, error = %e, "failed to load domain; treating as empty");
            }
        }
    }

    fn write_through(&self, domain: &str, cached: &mut CachedDomain) -> StoreResult<()> {
        match self.sync_mode {
            SyncMode::EveryWrite => self.persist(domain, cached),
            SyncMode::Manual => Ok(()),
        }
    }

    fn persist(&self, domain: &str, cached: &mut CachedDomain) -> StoreResult<()> {
        if cached.load_failed {
            return Err(StoreError::DomainUnavailable {
                name: domain.to_string(),
            });
        }
        if cached.exists {
            self.backend.save(domain, &cached.values)?;
        } else {
            self.backend.remove(domain)?;
        }
        cached.dirty = false;
        Ok(())
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<String, CachedDomain>> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<String, CachedDomain>> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for PersistentDomains {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentDomains")
            .field("sync_mode", &self.sync_mode)
            .field("cached_domains", &self.read_cache().len())
            .finish()
    }
}
