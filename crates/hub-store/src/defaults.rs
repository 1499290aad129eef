use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::domains::PersistentDomains;
use crate::error::{StoreError, StoreResult};
use crate::names::validate_domain_name;
use crate::traits::PreferenceStore;
use crate::value::{Domain, Value};

/// Persistent domain searched by every store instance, after its suites.
pub const GLOBAL_DOMAIN: &str = "GlobalPreferences";

/// Name of the in-memory domain fed by [`PreferenceStore::register`].
pub const REGISTRATION_DOMAIN: &str = "Registration";

#[derive(Debug, Default)]
struct SearchList {
    /// Custom volatile domains, in the order they were first set.
    volatile: Vec<(String, Domain)>,
    /// Added suites, in the order they were added.
    suites: Vec<String>,
    registration: Domain,
}

impl SearchList {
    fn volatile_mut(&mut self, name: &str) -> Option<&mut Domain> {
        self.volatile
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }
}

/// A store instance over one primary persistent domain.
///
/// Reads walk the search list in order and return the first hit:
///
/// 1. volatile domains, in the order they were set;
/// 2. the primary domain (the suite name);
/// 3. added suites, in the order they were added;
/// 4. [`GLOBAL_DOMAIN`];
/// 5. the registration domain.
///
/// Writes only ever touch the primary domain, so removing a key lets a
/// registered default for it show through again.
pub struct Defaults {
    suite: String,
    domains: Arc<PersistentDomains>,
    search: RwLock<SearchList>,
}

impl Defaults {
    /// Store instance whose primary domain is `name`.
    ///
    /// Fails if `name` is not a valid domain name or is [`GLOBAL_DOMAIN`].
    pub fn suite(name: &str, domains: Arc<PersistentDomains>) -> StoreResult<Self> {
        validate_domain_name(name)?;
        if name == GLOBAL_DOMAIN {
            return Err(StoreError::InvalidDomainName {
                name: name.to_string(),
                reason: "the global domain cannot be used as a suite".into(),
            });
        }
        Ok(Self::with_primary(name, domains))
    }

    /// Like [`Defaults::suite`], and additionally rejects the application
    /// domain, which belongs to [`Defaults::standard`].
    pub fn suite_checked(
        name: &str,
        application_domain: &str,
        domains: Arc<PersistentDomains>,
    ) -> StoreResult<Self> {
        if name == application_domain {
            return Err(StoreError::InvalidDomainName {
                name: name.to_string(),
                reason: "the application domain cannot be used as a suite".into(),
            });
        }
        Self::suite(name, domains)
    }

    /// The application's own store instance. Never fails.
    pub fn standard(application_domain: &str, domains: Arc<PersistentDomains>) -> Self {
        Self::with_primary(application_domain, domains)
    }

    fn with_primary(name: &str, domains: Arc<PersistentDomains>) -> Self {
        debug!(suite = name, "created store instance");
        Self {
            suite: name.to_string(),
            domains,
            search: RwLock::new(SearchList::default()),
        }
    }

    /// Name of the primary persistent domain.
    pub fn suite_name(&self) -> &str {
        &self.suite
    }

    /// Added suites, in search order.
    pub fn suites(&self) -> Vec<String> {
        self.read_search().suites.clone()
    }

    pub fn domains(&self) -> &Arc<PersistentDomains> {
        &self.domains
    }

    /// Persistent domains in search order.
    fn persistent_order<'a>(&'a self, search: &'a SearchList) -> impl Iterator<Item = &'a str> {
        std::iter::once(self.suite.as_str())
            .chain(search.suites.iter().map(String::as_str))
            .chain(std::iter::once(GLOBAL_DOMAIN))
    }

    fn read_search(&self) -> RwLockReadGuard<'_, SearchList> {
        self.search.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_search(&self) -> RwLockWriteGuard<'_, SearchList> {
        self.search.write().unwrap_or_else(|e| e.into_inner())
    }

    fn log_failure(&self, action: &str, domain: &str, result: StoreResult<()>) {
        if let Err(e) = result {
            warn!(suite = %self.suite, domain, action, error = %e, "preference write failed");
        }
    }
}

impl PreferenceStore for Defaults {
    fn value(&self, name: &str) -> Option<Value> {
        let search = self.read_search();
        if let Some(value) = search.volatile.iter().find_map(|(_, d)| d.get(name)) {
            return Some(value.clone());
        }
        let found = self
            .persistent_order(&search)
            .find_map(|domain| self.domains.get(domain, name))
            .or_else(|| search.registration.get(name).cloned());
        found
    }

    fn set_value(&self, name: &str, value: Option<Value>) {
        let result = self.domains.set(&self.suite, name, value);
        self.log_failure("set", &self.suite, result);
    }

    fn register(&self, defaults: Domain) {
        self.write_search().registration.extend(defaults);
    }

    fn add_suite(&self, name: &str) {
        if name == self.suite || name == GLOBAL_DOMAIN {
            debug!(suite = %self.suite, name, "ignoring unsupported suite");
            return;
        }
        let mut search = self.write_search();
        if !search.suites.iter().any(|s| s == name) {
            search.suites.push(name.to_string());
        }
    }

    fn remove_suite(&self, name: &str) {
        self.write_search().suites.retain(|s| s != name);
    }

    fn volatile_domain_names(&self) -> Vec<String> {
        let search = self.read_search();
        search
            .volatile
            .iter()
            .map(|(name, _)| name.clone())
            .chain(std::iter::once(REGISTRATION_DOMAIN.to_string()))
            .collect()
    }

    fn volatile_domain(&self, name: &str) -> Domain {
        let search = self.read_search();
        if name == REGISTRATION_DOMAIN {
            return search.registration.clone();
        }
        search
            .volatile
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.clone())
            .unwrap_or_default()
    }

    fn set_volatile_domain(&self, domain: Domain, name: &str) {
        let mut search = self.write_search();
        if name == REGISTRATION_DOMAIN {
            search.registration = domain;
        } else if let Some(existing) = search.volatile_mut(name) {
            *existing = domain;
        } else {
            search.volatile.push((name.to_string(), domain));
        }
    }

    fn remove_volatile_domain(&self, name: &str) {
        let mut search = self.write_search();
        if name == REGISTRATION_DOMAIN {
            search.registration.clear();
        } else {
            search.volatile.retain(|(n, _)| n != name);
        }
    }

    fn persistent_domain(&self, name: &str) -> Option<Domain> {
        self.domains.snapshot(name)
    }

    fn set_persistent_domain(&self, domain: Domain, name: &str) {
        let result = self.domains.replace(name, domain);
        self.log_failure("replace", name, result);
    }

    fn remove_persistent_domain(&self, name: &str) {
        let result = self.domains.remove(name);
        self.log_failure("remove", name, result);
    }

    fn dictionary_representation(&self) -> Domain {
        let search = self.read_search();
        let persistent: Vec<&str> = self.persistent_order(&search).collect();

        // Lowest precedence first; later layers overwrite earlier ones.
        let mut merged = search.registration.clone();
        for domain in persistent.iter().rev() {
            if let Some(values) = self.domains.snapshot(domain) {
                merged.extend(values);
            }
        }
        for (_, values) in search.volatile.iter().rev() {
            merged.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    fn synchronize(&self) -> bool {
        match self.domains.flush() {
            Ok(()) => true,
            Err(e) => {
                warn!(suite = %self.suite, error = %e, "synchronize failed");
                false
            }
        }
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let search = self.read_search();
        f.debug_struct("Defaults")
            .field("suite", &self.suite)
            .field("suites", &search.suites)
            .field("volatile_domains", &search.volatile.len())
            .field("registered", &search.registration.len())
            .finish()
    }
}
