//! Persistent preference domains for hub.
//!
//! This crate is the key-value layer the keyed accessors in `hub-defaults`
//! sit on. A *domain* is a named map from string keys to [`Value`]s. Domains
//! are persisted by a [`DomainStore`] backend and shared in-process through
//! [`PersistentDomains`]. A [`Defaults`] store instance resolves keys across
//! a search list of volatile, persistent and registration domains.
//!
//! # Storage Backends
//!
//! All backends implement the [`DomainStore`] trait:
//!
//! - [`InMemoryDomainStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileDomainStore`] -- one JSON document per domain under a root directory
//!
//! # Design Rules
//!
//! 1. Reads through a store instance never fail: missing keys, wrong shapes
//!    and backend errors all degrade to "absent".
//! 2. Every store instance on one backend shares one domain cache, so writes
//!    are visible to every search list that includes the domain.
//! 3. Registered defaults are never persisted.
//! 4. Backend I/O errors are propagated by [`DomainStore`] and
//!    [`PersistentDomains`], and logged by [`Defaults`].

pub mod coerce;
pub mod config;
pub mod defaults;
pub mod domains;
pub mod error;
pub mod file;
pub mod memory;
pub mod names;
pub mod traits;
pub mod value;

// Re-export primary types at crate root for ergonomic imports.
pub use config::StoreConfig;
pub use defaults::{Defaults, GLOBAL_DOMAIN, REGISTRATION_DOMAIN};
pub use domains::{PersistentDomains, SyncMode};
pub use error::{StoreError, StoreResult};
pub use file::FileDomainStore;
pub use memory::InMemoryDomainStore;
pub use names::validate_domain_name;
pub use traits::{DomainStore, PreferenceStore};
pub use value::{Domain, FromValue, Value};
