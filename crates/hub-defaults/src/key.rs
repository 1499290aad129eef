use std::borrow::Cow;
use std::fmt;
use std::sync::Mutex;

use crate::lock::LockExt;

/// A preference key: a raw name paired with its own lock.
///
/// The lock belongs to the key *instance*. Two keys built from the same
/// name are equal, but each holds an independent lock, so they do not
/// exclude each other. Call sites that must be serialized have to share one
/// key, typically a `static`:
///
/// ```
/// use hub_defaults::StoreKey;
///
/// static LAUNCH_COUNT: StoreKey = StoreKey::from_static("launch-count");
///
/// assert_eq!(LAUNCH_COUNT.raw_value(), "launch-count");
/// ```
///
/// `StoreKey` is deliberately not `Clone`: a clone would carry a fresh lock.
pub struct StoreKey {
    raw: Cow<'static, str>,
    lock: Mutex<()>,
}

impl StoreKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: Cow::Owned(raw.into()),
            lock: Mutex::new(()),
        }
    }

    /// Key usable in `static` and `const` items.
    pub const fn from_static(raw: &'static str) -> Self {
        Self {
            raw: Cow::Borrowed(raw),
            lock: Mutex::new(()),
        }
    }

    /// Name the key addresses in the underlying store.
    pub fn raw_value(&self) -> &str {
        &self.raw
    }

    /// Run `work` while holding this key's lock.
    pub fn safe<T>(&self, work: impl FnOnce() -> T) -> T {
        self.lock.execute(|_| work())
    }

    /// Returns `true` if both keys share one lock, i.e. are the same
    /// instance.
    pub fn shares_lock_with(&self, other: &StoreKey) -> bool {
        std::ptr::eq(&self.lock, &other.lock)
    }
}

impl PartialEq for StoreKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for StoreKey {}

impl std::hash::Hash for StoreKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoreKey").field(&self.raw).finish()
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&'static str> for StoreKey {
    fn from(raw: &'static str) -> Self {
        Self::from_static(raw)
    }
}

impl From<String> for StoreKey {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
