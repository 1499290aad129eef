//! Process-wide mapping from namespace digests to shared store instances.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, warn};

use hub_digest::HexDigester;
use hub_store::{Defaults, PersistentDomains, PreferenceStore};

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::lock::LockExt;
use crate::unique::Unique;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Lookup-or-create table of store instances, one per namespace digest.
///
/// All instances share one [`PersistentDomains`] cache, so two namespaces
/// writing the same persistent domain see each other's values.
pub struct Registry {
    domains: Arc<PersistentDomains>,
    application_domain: String,
    map: Mutex<HashMap<String, Arc<Defaults>>>,
}

impl Registry {
    pub fn new(domains: Arc<PersistentDomains>, application_domain: impl Into<String>) -> Self {
        Self {
            domains,
            application_domain: application_domain.into(),
            map: Mutex::new(HashMap::new()),
        }
    }

    /// Registry over the file-backed domains described by `config`.
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.store.open(), config.application_domain.clone())
    }

    /// The domain name a namespace identifier maps to: the uppercase MD5
    /// hex digest of its unique id.
    pub fn namespace_for<U: Unique + ?Sized>(id: &U) -> String {
        HexDigester::MD5.digest(&id.unique_id())
    }

    /// The store instance for `id`, created on first request.
    ///
    /// Every call with the same unique id returns the same instance, from
    /// any thread. If the digest cannot name a suite, the instance is the
    /// application's standard store with the digest added as a suite.
    pub fn store_for<U: Unique + ?Sized>(&self, id: &U) -> Arc<Defaults> {
        let key = Self::namespace_for(id);
        self.map.execute(|map| {
            if let Some(existing) = map.get(&key) {
                return Arc::clone(existing);
            }
            let store = self.create(&key);
            map.insert(key, Arc::clone(&store));
            store
        })
    }

    fn create(&self, key: &str) -> Arc<Defaults> {
        let domains = Arc::clone(&self.domains);
        match Defaults::suite_checked(key, &self.application_domain, Arc::clone(&domains)) {
            Ok(store) => {
                debug!(namespace = key, "registered namespace store");
                Arc::new(store)
            }
            Err(e) => {
                warn!(namespace = key, error = %e, "suite unavailable, using standard store");
                let store = Defaults::standard(&self.application_domain, domains);
                store.add_suite(key);
                Arc::new(store)
            }
        }
    }

    /// Number of namespaces created so far.
    pub fn len(&self) -> usize {
        self.map.execute(|map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a store instance for `id` already exists.
    pub fn contains<U: Unique + ?Sized>(&self, id: &U) -> bool {
        let key = Self::namespace_for(id);
        self.map.execute(|map| map.contains_key(&key))
    }

    pub fn application_domain(&self) -> &str {
        &self.application_domain
    }

    pub fn domains(&self) -> &Arc<PersistentDomains> {
        &self.domains
    }

    /// The process-wide registry, configured from the environment on first
    /// use unless [`install_global`] ran earlier.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(|| {
            let config = RegistryConfig::from_env().unwrap_or_else(|e| {
                warn!(error = %e, "ignoring invalid registry environment");
                RegistryConfig::default()
            });
            debug!(
                root = %config.store.root.display(),
                app = %config.application_domain,
                "initialized global registry"
            );
            Registry::from_config(&config)
        })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("application_domain", &self.application_domain)
            .field("namespaces", &self.len())
            .finish()
    }
}

/// Install the process-wide registry. Fails once the global registry
/// exists, whether from an earlier install or from first use.
pub fn install_global(config: &RegistryConfig) -> Result<&'static Registry, RegistryError> {
    let mut installed = false;
    let registry = GLOBAL.get_or_init(|| {
        installed = true;
        Registry::from_config(config)
    });
    if installed {
        Ok(registry)
    } else {
        Err(RegistryError::AlreadyInitialized)
    }
}

/// The store instance for `id` in the process-wide registry.
pub fn shared<U: Unique + ?Sized>(id: &U) -> Arc<Defaults> {
    Registry::global().store_for(id)
}
