use crate::error::StoreResult;
use crate::value::{Domain, Value};

/// Persistence backend for named domains.
///
/// All implementations must satisfy these invariants:
/// - `save` replaces the whole domain; there are no partial writes.
/// - `load` after `save` returns exactly what was saved.
/// - `load` of a domain that was never saved, or was removed, is `Ok(None)`.
/// - All I/O errors are propagated, never silently ignored.
pub trait DomainStore: Send + Sync {
    /// Read a whole domain by name.
    fn load(&self, name: &str) -> StoreResult<Option<Domain>>;

    /// Create or replace a domain.
    fn save(&self, name: &str, domain: &Domain) -> StoreResult<()>;

    /// Delete a domain. Returns `true` if it existed.
    fn remove(&self, name: &str) -> StoreResult<bool>;

    /// Names of all stored domains, sorted.
    fn names(&self) -> StoreResult<Vec<String>>;

    /// Check whether a domain exists.
    fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.load(name)?.is_some())
    }
}

/// A store instance: name-addressed preference access over a search list.
///
/// This is the raw surface the keyed accessors in `hub-defaults` delegate
/// to. Nothing here fails: a missing key, a backend error or a bad domain
/// name all read as "absent" and write as a logged no-op.
pub trait PreferenceStore: Send + Sync {
    /// First value for `name` along the search list.
    fn value(&self, name: &str) -> Option<Value>;

    /// Store `value` under `name` in the primary domain. `None` removes
    /// the entry.
    fn set_value(&self, name: &str, value: Option<Value>);

    /// Equivalent to `set_value(name, None)`.
    fn remove_value(&self, name: &str) {
        self.set_value(name, None);
    }

    /// Merge `defaults` into the registration domain, the last stop of the
    /// search list. Registered values are never persisted.
    fn register(&self, defaults: Domain);

    /// Append the named persistent domain to the search list, after the
    /// primary domain.
    fn add_suite(&self, name: &str);

    /// Drop a domain added with [`PreferenceStore::add_suite`].
    fn remove_suite(&self, name: &str);

    fn volatile_domain_names(&self) -> Vec<String>;

    /// Contents of an in-memory domain; empty if it was never set.
    fn volatile_domain(&self, name: &str) -> Domain;

    fn set_volatile_domain(&self, domain: Domain, name: &str);

    fn remove_volatile_domain(&self, name: &str);

    /// Contents of a persistent domain, or `None` if it does not exist.
    fn persistent_domain(&self, name: &str) -> Option<Domain>;

    /// Replace every value in a persistent domain.
    fn set_persistent_domain(&self, domain: Domain, name: &str);

    fn remove_persistent_domain(&self, name: &str);

    /// Flattened view of the whole search list: for every key, the value
    /// [`PreferenceStore::value`] would return.
    fn dictionary_representation(&self) -> Domain;

    /// Block until pending writes reach the backend. Returns `false` if
    /// any write failed.
    fn synchronize(&self) -> bool;
}
