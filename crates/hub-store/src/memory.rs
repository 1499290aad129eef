use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::DomainStore;
use crate::value::Domain;

/// In-memory, HashMap-based domain store.
///
/// Intended for tests and embedding. All domains are held in memory behind a
/// `RwLock` and cloned on load/save. Data is lost when the store is dropped.
pub struct InMemoryDomainStore {
    domains: RwLock<HashMap<String, Domain>>,
}

impl InMemoryDomainStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            domains: RwLock::new(HashMap::new()),
        }
    }

    /// Number of domains currently stored.
    pub fn len(&self) -> usize {
        self.domains.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryDomainStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::LockPoisoned(e.to_string())
}

impl DomainStore for InMemoryDomainStore {
    fn load(&self, name: &str) -> StoreResult<Option<Domain>> {
        let map = self.domains.read().map_err(poisoned)?;
        Ok(map.get(name).cloned())
    }

    fn save(&self, name: &str, domain: &Domain) -> StoreResult<()> {
        let mut map = self.domains.write().map_err(poisoned)?;
        map.insert(name.to_string(), domain.clone());
        Ok(())
    }

    fn remove(&self, name: &str) -> StoreResult<bool> {
        let mut map = self.domains.write().map_err(poisoned)?;
        Ok(map.remove(name).is_some())
    }

    fn names(&self) -> StoreResult<Vec<String>> {
        let map = self.domains.read().map_err(poisoned)?;
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        let map = self.domains.read().map_err(poisoned)?;
        Ok(map.contains_key(name))
    }
}

impl std::fmt::Debug for InMemoryDomainStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDomainStore")
            .field("domain_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn domain(pairs: &[(&str, Value)]) -> Domain {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[test]
    fn save_and_load() {
        let store = InMemoryDomainStore::new();
        let d = domain(&[("age", Value::Integer(42))]);
        store.save("app", &d).unwrap();
        assert_eq!(store.load("app").unwrap(), Some(d));
    }

    #[test]
    fn load_missing_returns_none() {
        let store = InMemoryDomainStore::new();
        assert!(store.load("missing").unwrap().is_none());
        assert!(!store.exists("missing").unwrap());
    }

    #[test]
    fn save_replaces_whole_domain() {
        let store = InMemoryDomainStore::new();
        store
            .save("app", &domain(&[("a", Value::Integer(1)), ("b", Value::Integer(2))]))
            .unwrap();
        store.save("app", &domain(&[("c", Value::Integer(3))])).unwrap();

        let loaded = store.load("app").unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("c"));
    }

    #[test]
    fn remove_reports_presence() {
        let store = InMemoryDomainStore::new();
        store.save("app", &Domain::new()).unwrap();
        assert!(store.remove("app").unwrap());
        assert!(!store.remove("app").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let store = InMemoryDomainStore::new();
        for name in ["zeta", "alpha", "mid"] {
            store.save(name, &Domain::new()).unwrap();
        }
        assert_eq!(store.names().unwrap(), vec!["alpha", "mid", "zeta"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn len_survives_poisoned_lock() {
        let store = std::sync::Arc::new(InMemoryDomainStore::new());
        store.save("app", &Domain::new()).unwrap();

        let writer = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = writer.domains.write().unwrap();
            panic!("writer panicked");
        })
        .join();

        assert!(store.domains.is_poisoned());
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }

    #[test]
    fn debug_format() {
        let store = InMemoryDomainStore::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryDomainStore"));
        assert!(debug.contains("domain_count"));
    }
}
