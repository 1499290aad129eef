use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named set of preferences: key to value.
pub type Domain = BTreeMap<String, Value>;

/// A preference value.
///
/// Every variant is its own exact type for strict extraction via
/// [`FromValue`]: an `Integer` is never an exact `Double`, and a `Bool` is
/// never an exact `Integer`, even though the coercing accessors in
/// [`crate::coerce`] convert between them.
///
/// Persisted with adjacent tagging, e.g. `{"type": "integer", "value": 42}`.
/// Blobs are written as hex strings and dates as RFC 3339. Non-finite reals
/// are written as `"nan"`, `"inf"` or `"-inf"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Integer(i64),
    Float(#[serde(with = "real32")] f32),
    Double(#[serde(with = "real64")] f64),
    Bool(bool),
    Date(DateTime<Utc>),
    Data(#[serde(with = "hex_bytes")] Vec<u8>),
    Array(Vec<Value>),
    Dictionary(Domain),
}

impl Value {
    /// Wrap raw bytes as a blob value.
    pub fn data(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Data(bytes.into())
    }

    /// Lowercase name of the variant, as used in the persisted form.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::Date(_) => "date",
            Self::Data(_) => "data",
            Self::Array(_) => "array",
            Self::Dictionary(_) => "dictionary",
        }
    }

    /// Returns `true` for integer, float, double and bool values.
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Self::Integer(_) | Self::Float(_) | Self::Double(_) | Self::Bool(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Data(d) => Some(d),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Date(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::Array(v.into_iter().map(Self::String).collect())
    }
}

impl From<Domain> for Value {
    fn from(v: Domain) -> Self {
        Self::Dictionary(v)
    }
}

/// Strict extraction from a [`Value`].
///
/// Returns `Some` only when the value's variant is exactly the requested
/// type. There is no coercion and no fallback.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_from_value!(String, String);
impl_from_value!(i64, Integer);
impl_from_value!(f32, Float);
impl_from_value!(f64, Double);
impl_from_value!(bool, Bool);
impl_from_value!(DateTime<Utc>, Date);
impl_from_value!(Vec<u8>, Data);
impl_from_value!(Vec<Value>, Array);
impl_from_value!(Domain, Dictionary);

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

/// Finite reals as numbers, the rest as text. JSON has no NaN or infinity.
#[derive(Deserialize)]
#[serde(untagged)]
enum RealRepr {
    Number(f64),
    Text(String),
}

impl RealRepr {
    fn of(v: f64) -> Option<&'static str> {
        if v.is_nan() {
            Some("nan")
        } else if v == f64::INFINITY {
            Some("inf")
        } else if v == f64::NEG_INFINITY {
            Some("-inf")
        } else {
            None
        }
    }

    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(t) => match t.as_str() {
                "nan" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(E::invalid_value(
                    serde::de::Unexpected::Str(other),
                    &"a number, \"nan\", \"inf\" or \"-inf\"",
                )),
            },
        }
    }
}

mod real64 {
    use super::RealRepr;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        match RealRepr::of(*v) {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_f64(*v),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        RealRepr::deserialize(deserializer)?.into_f64()
    }
}

mod real32 {
    use super::RealRepr;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        match RealRepr::of(f64::from(*v)) {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_f32(*v),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        Ok(RealRepr::deserialize(deserializer)?.into_f64()? as f32)
    }
}
