//! Typed, per-key-locked accessors over any [`PreferenceStore`].
//!
//! Every accessor runs its store call inside [`StoreKey::safe`]. None of
//! them fail: a missing entry, a value of the wrong shape and a failed
//! decode all read as `None`, or as the type's zero value for the coercing
//! numeric and boolean accessors.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use hub_store::coerce::archive_url;
use hub_store::{Domain, FromValue, PreferenceStore, Value};

use crate::key::StoreKey;

/// Keyed accessor surface, implemented for every [`PreferenceStore`].
pub trait KeyedStore: PreferenceStore {
    /// Raw stored value.
    fn object(&self, key: &StoreKey) -> Option<Value> {
        key.safe(|| self.value(key.raw_value()))
    }

    /// Stored value if it is exactly a `T`.
    fn object_as<T: FromValue>(&self, key: &StoreKey) -> Option<T> {
        self.object(key).as_ref().and_then(T::from_value)
    }

    /// Store a raw value. `None` removes the entry.
    fn set_object(&self, key: &StoreKey, value: Option<Value>) {
        key.safe(|| self.set_value(key.raw_value(), value));
    }

    fn set(&self, key: &StoreKey, value: impl Into<Value>) {
        self.set_object(key, Some(value.into()));
    }

    fn remove(&self, key: &StoreKey) {
        key.safe(|| self.remove_value(key.raw_value()));
    }

    /// String form; numbers are stringified, other shapes are `None`.
    fn string(&self, key: &StoreKey) -> Option<String> {
        self.object(key).and_then(|v| v.coerce_string())
    }

    fn array(&self, key: &StoreKey) -> Option<Vec<Value>> {
        self.object_as(key)
    }

    fn dictionary(&self, key: &StoreKey) -> Option<Domain> {
        self.object_as(key)
    }

    /// The stored array, if every element is a string.
    fn string_array(&self, key: &StoreKey) -> Option<Vec<String>> {
        self.object(key).and_then(|v| v.as_string_array())
    }

    fn data(&self, key: &StoreKey) -> Option<Vec<u8>> {
        self.object_as(key)
    }

    fn set_data(&self, key: &StoreKey, data: Option<Vec<u8>>) {
        self.set_object(key, data.map(Value::Data));
    }

    /// Coerced integer; `0` when absent or unconvertible.
    fn integer(&self, key: &StoreKey) -> i64 {
        self.object(key)
            .and_then(|v| v.coerce_integer())
            .unwrap_or(0)
    }

    /// Coerced float; `0.0` when absent or unconvertible.
    fn float(&self, key: &StoreKey) -> f32 {
        self.object(key)
            .and_then(|v| v.coerce_float())
            .unwrap_or(0.0)
    }

    /// Coerced double; `0.0` when absent or unconvertible.
    fn double(&self, key: &StoreKey) -> f64 {
        self.object(key)
            .and_then(|v| v.coerce_double())
            .unwrap_or(0.0)
    }

    /// Coerced boolean; `false` when absent or unconvertible.
    fn bool(&self, key: &StoreKey) -> bool {
        self.object(key)
            .and_then(|v| v.coerce_bool())
            .unwrap_or(false)
    }

    /// The stored value only if it is exactly an integer.
    fn exact_integer(&self, key: &StoreKey) -> Option<i64> {
        self.object_as(key)
    }

    /// The stored value only if it is exactly a float.
    fn exact_float(&self, key: &StoreKey) -> Option<f32> {
        self.object_as(key)
    }

    /// The stored value only if it is exactly a double.
    fn exact_double(&self, key: &StoreKey) -> Option<f64> {
        self.object_as(key)
    }

    /// The stored value only if it is exactly a boolean.
    fn exact_bool(&self, key: &StoreKey) -> Option<bool> {
        self.object_as(key)
    }

    fn date(&self, key: &StoreKey) -> Option<DateTime<Utc>> {
        self.object_as(key)
    }

    fn set_date(&self, key: &StoreKey, date: Option<DateTime<Utc>>) {
        self.set_object(key, date.map(Value::Date));
    }

    /// A URL stored with [`KeyedStore::set_url`], or a string path as a
    /// `file://` URL.
    fn url(&self, key: &StoreKey) -> Option<Url> {
        self.object(key).and_then(|v| v.coerce_url())
    }

    /// Archive `url` into the entry. `None` removes it.
    fn set_url(&self, key: &StoreKey, url: Option<&Url>) {
        self.set_object(key, url.map(archive_url));
    }

    /// Decode a value stored with [`KeyedStore::set_encoded`].
    fn encoded<T: DeserializeOwned>(&self, key: &StoreKey) -> Option<T> {
        let bytes = self.data(key)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key = key.raw_value(), error = %e, "stored value does not decode");
                None
            }
        }
    }

    /// Encode `value` as a JSON blob. `None`, or a value that fails to
    /// encode, removes the entry.
    fn set_encoded<T: Serialize + ?Sized>(&self, key: &StoreKey, value: Option<&T>) {
        let encoded = value.and_then(|v| match serde_json::to_vec(v) {
            Ok(bytes) => Some(Value::Data(bytes)),
            Err(e) => {
                debug!(key = key.raw_value(), error = %e, "value does not encode");
                None
            }
        });
        self.set_object(key, encoded);
    }
}

impl<S: PreferenceStore + ?Sized> KeyedStore for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hub_store::{Defaults, PersistentDomains};
    use proptest::prelude::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    fn store() -> Defaults {
        Defaults::suite("keyed-tests", PersistentDomains::in_memory()).unwrap()
    }

    // -----------------------------------------------------------------------
    // Raw objects
    // -----------------------------------------------------------------------

    #[test]
    fn set_get_remove_end_to_end() {
        let store = store();
        let key = StoreKey::new("age");
        store.set(&key, 42);
        assert_eq!(store.integer(&key), 42);

        store.set_object(&key, None);
        assert_eq!(store.object(&key), None);
    }

    #[test]
    fn remove_is_set_none() {
        let store = store();
        let key = StoreKey::new("name");
        store.set(&key, "hub");
        store.remove(&key);
        assert_eq!(store.object(&key), None);
        assert_eq!(store.value("name"), None);
    }

    #[test]
    fn keys_address_raw_names() {
        let store = store();
        store.set_value("color", Some(Value::from("red")));
        assert_eq!(store.string(&StoreKey::new("color")).as_deref(), Some("red"));
    }

    #[test]
    fn works_through_a_trait_object() {
        let store: Box<dyn PreferenceStore> = Box::new(store());
        let key = StoreKey::new("k");
        store.set(&key, true);
        assert!(store.bool(&key));
    }

    // -----------------------------------------------------------------------
    // Strings and containers
    // -----------------------------------------------------------------------

    #[test]
    fn string_stringifies_numbers() {
        let store = store();
        let key = StoreKey::new("n");
        store.set(&key, 12);
        assert_eq!(store.string(&key).as_deref(), Some("12"));
        store.set_data(&key, Some(vec![1, 2]));
        assert_eq!(store.string(&key), None);
    }

    #[test]
    fn containers_require_exact_shape() {
        let store = store();
        let key = StoreKey::new("c");

        store.set(&key, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.string_array(&key), Some(vec!["a".into(), "b".into()]));
        assert_eq!(store.array(&key).map(|a| a.len()), Some(2));
        assert_eq!(store.dictionary(&key), None);

        store.set(&key, Value::Array(vec![Value::from("a"), Value::Integer(1)]));
        assert_eq!(store.string_array(&key), None);
        assert!(store.array(&key).is_some());

        let mut dict = BTreeMap::new();
        dict.insert("inner".to_string(), Value::Bool(true));
        store.set(&key, dict.clone());
        assert_eq!(store.dictionary(&key), Some(dict));
        assert_eq!(store.array(&key), None);
    }

    #[test]
    fn data_round_trip_and_mismatch() {
        let store = store();
        let key = StoreKey::new("blob");
        store.set_data(&key, Some(b"bytes".to_vec()));
        assert_eq!(store.data(&key), Some(b"bytes".to_vec()));

        store.set(&key, "bytes");
        assert_eq!(store.data(&key), None);

        store.set_data(&key, None);
        assert_eq!(store.object(&key), None);
    }

    // -----------------------------------------------------------------------
    // Coercing numeric and boolean accessors
    // -----------------------------------------------------------------------

    #[test]
    fn numeric_text_coerces() {
        let store = store();
        let key = StoreKey::new("n");
        store.set(&key, "42");
        assert_eq!(store.integer(&key), 42);
        assert_eq!(store.double(&key), 42.0);

        store.set(&key, "abc");
        assert_eq!(store.integer(&key), 0);
        assert_eq!(store.float(&key), 0.0);
    }

    #[test]
    fn missing_values_degrade_to_zero() {
        let store = store();
        let key = StoreKey::new("missing");
        assert_eq!(store.integer(&key), 0);
        assert_eq!(store.float(&key), 0.0);
        assert_eq!(store.double(&key), 0.0);
        assert!(!store.bool(&key));
        assert_eq!(store.string(&key), None);
    }

    #[test]
    fn booleans_count_as_numbers() {
        let store = store();
        let key = StoreKey::new("b");
        store.set(&key, true);
        assert_eq!(store.integer(&key), 1);
        assert_eq!(store.double(&key), 1.0);
        assert_eq!(store.float(&key), 1.0);
    }

    #[test]
    fn yes_string_is_true_but_not_exactly_bool() {
        let store = store();
        let key = StoreKey::new("flag");
        store.set(&key, "YES");
        assert!(store.bool(&key));
        assert_eq!(store.exact_bool(&key), None);

        store.set(&key, "NO");
        assert!(!store.bool(&key));
    }

    // -----------------------------------------------------------------------
    // Strict accessors
    // -----------------------------------------------------------------------

    #[test]
    fn exact_accessors_match_only_their_type() {
        let store = store();
        let key = StoreKey::new("x");

        store.set(&key, 5);
        assert_eq!(store.exact_integer(&key), Some(5));
        assert_eq!(store.exact_double(&key), None);
        assert_eq!(store.exact_float(&key), None);
        assert_eq!(store.exact_bool(&key), None);

        store.set(&key, 2.5f64);
        assert_eq!(store.exact_double(&key), Some(2.5));
        assert_eq!(store.exact_float(&key), None);
        assert_eq!(store.exact_integer(&key), None);

        store.set(&key, 2.5f32);
        assert_eq!(store.exact_float(&key), Some(2.5));
        assert_eq!(store.exact_double(&key), None);

        store.set(&key, "5");
        assert_eq!(store.exact_integer(&key), None);
        assert_eq!(store.integer(&key), 5);

        store.set(&key, false);
        assert_eq!(store.exact_bool(&key), Some(false));
        assert_eq!(store.exact_integer(&key), None);
    }

    #[test]
    fn date_is_strict() {
        let store = store();
        let key = StoreKey::new("when");
        let when = Utc.with_ymd_and_hms(2021, 4, 1, 8, 30, 0).unwrap();
        store.set_date(&key, Some(when));
        assert_eq!(store.date(&key), Some(when));

        store.set(&key, when.to_rfc3339());
        assert_eq!(store.date(&key), None);

        store.set_date(&key, None);
        assert_eq!(store.object(&key), None);
    }

    #[test]
    fn object_as_is_strict() {
        let store = store();
        let key = StoreKey::new("s");
        store.set(&key, "text");
        assert_eq!(store.object_as::<String>(&key).as_deref(), Some("text"));
        assert_eq!(store.object_as::<i64>(&key), None);
    }

    // -----------------------------------------------------------------------
    // URLs
    // -----------------------------------------------------------------------

    #[test]
    fn url_round_trip() {
        let store = store();
        let key = StoreKey::new("endpoint");
        let url = Url::parse("https://example.com/api").unwrap();
        store.set_url(&key, Some(&url));
        assert_eq!(store.url(&key), Some(url));
        // Archived, so it is a blob underneath.
        assert!(store.data(&key).is_some());

        store.set_url(&key, None);
        assert_eq!(store.object(&key), None);
    }

    #[cfg(unix)]
    #[test]
    fn string_path_reads_as_file_url() {
        let store = store();
        let key = StoreKey::new("dir");
        store.set(&key, "/var/tmp");
        assert_eq!(store.url(&key).unwrap().as_str(), "file:///var/tmp");
    }

    #[test]
    fn non_url_shapes_are_none() {
        let store = store();
        let key = StoreKey::new("dir");
        store.set(&key, 3);
        assert_eq!(store.url(&key), None);
    }

    // -----------------------------------------------------------------------
    // Structured values
    // -----------------------------------------------------------------------

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        age: u32,
        tags: Vec<String>,
        nickname: Option<String>,
    }

    fn profile() -> Profile {
        Profile {
            name: "Ada".into(),
            age: 36,
            tags: vec!["admin".into()],
            nickname: None,
        }
    }

    #[test]
    fn encoded_round_trip() {
        let store = store();
        let key = StoreKey::new("profile");
        store.set_encoded(&key, Some(&profile()));
        assert_eq!(store.encoded::<Profile>(&key), Some(profile()));
    }

    #[test]
    fn encoded_none_removes_entry() {
        let store = store();
        let key = StoreKey::new("profile");
        store.set_encoded(&key, Some(&profile()));
        store.set_encoded::<Profile>(&key, None);
        assert_eq!(store.encoded::<Profile>(&key), None);
        assert_eq!(store.object(&key), None);
    }

    #[test]
    fn decode_failure_is_none() {
        let store = store();
        let key = StoreKey::new("profile");
        store.set_encoded(&key, Some(&vec![1, 2, 3]));
        assert_eq!(store.encoded::<Profile>(&key), None);

        store.set(&key, "not a blob");
        assert_eq!(store.encoded::<Profile>(&key), None);
    }

    #[test]
    fn encode_failure_removes_entry() {
        let store = store();
        let key = StoreKey::new("map");
        store.set(&key, 1);

        // JSON object keys must be strings.
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], 1u8);
        store.set_encoded(&key, Some(&bad));
        assert_eq!(store.object(&key), None);
    }

    proptest! {
        #[test]
        fn encoded_values_round_trip(
            name in "[a-zA-Z ]{0,24}",
            age in any::<u32>(),
            tags in prop::collection::vec("[a-z]{1,8}", 0..5),
            nickname in prop::option::of("[a-z]{1,8}"),
        ) {
            let store = store();
            let key = StoreKey::new("profile");
            let value = Profile { name, age, tags, nickname };
            store.set_encoded(&key, Some(&value));
            prop_assert_eq!(store.encoded::<Profile>(&key), Some(value));
        }
    }
}
