//! Namespaced, per-key-locked preference stores.
//!
//! A caller asks the [`Registry`] for the store instance of a namespace
//! identifier (anything implementing [`Unique`]). The registry digests the
//! identifier's unique id with uppercase MD5 and hands back the single shared
//! [`Defaults`] for that digest, creating it on first request. Typed reads
//! and writes then go through [`KeyedStore`], addressed by a [`StoreKey`]
//! whose own lock serializes every access made through it.
//!
//! ```
//! use hub_defaults::{KeyedStore, Registry, StoreKey};
//! use hub_store::PersistentDomains;
//!
//! let registry = Registry::new(PersistentDomains::in_memory(), "demo");
//! let store = registry.store_for("user-42");
//!
//! let age = StoreKey::new("age");
//! store.set(&age, 42);
//! assert_eq!(store.integer(&age), 42);
//!
//! store.set_object(&age, None);
//! assert_eq!(store.object(&age), None);
//! ```
//!
//! # Locking
//!
//! - One registry lock covers lookup-or-create of store instances.
//! - One lock per [`StoreKey`] *instance* covers each accessor call made with
//!   that key, including the underlying store call. Two keys built from the
//!   same name hold independent locks and do not exclude each other; share
//!   one key (for example a `static`) to serialize call sites.
//! - Whole-domain operations on [`hub_store::PreferenceStore`] take no
//!   per-key lock.

pub mod config;
pub mod error;
pub mod key;
pub mod keyed;
pub mod lock;
pub mod registry;
pub mod unique;

pub use config::RegistryConfig;
pub use error::{ConfigError, RegistryError};
pub use key::StoreKey;
pub use keyed::KeyedStore;
pub use lock::LockExt;
pub use registry::{install_global, shared, Registry};
pub use unique::Unique;

// Re-export the store-side types callers need alongside the accessors.
pub use hub_store::{Defaults, Domain, FromValue, PreferenceStore, Value};
