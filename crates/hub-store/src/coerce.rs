//! Coercing conversions used by the non-optional accessors.
//!
//! Each `coerce_*` method returns `None` when the value cannot be converted;
//! callers substitute the type's zero value (`0`, `0.0`, `false`). Booleans
//! count as numbers throughout: `true` is `1`, and stringifies as `"1"`.

use std::path::{Path, PathBuf};

use url::Url;

use crate::value::Value;

impl Value {
    /// String form. Numbers are rendered as decimal text; arrays, blobs,
    /// dates and dictionaries yield `None`.
    pub fn coerce_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Double(d) => Some(d.to_string()),
            Self::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            _ => None,
        }
    }

    /// Integer form. Floating point values truncate toward zero and
    /// saturate at the `i64` bounds; strings are parsed as an integer first
    /// and then as a float.
    pub fn coerce_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) => Some(*f as i64),
            Self::Double(d) => Some(*d as i64),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::String(s) => parse_integer(s),
            _ => None,
        }
    }

    pub fn coerce_double(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(f64::from(*f)),
            Self::Double(d) => Some(*d),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::String(s) => parse_float(s),
            _ => None,
        }
    }

    pub fn coerce_float(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            other => other.coerce_double().map(|d| d as f32),
        }
    }

    /// Boolean form. Numbers are true when nonzero. Only the strings `"YES"`
    /// and `"1"` are true; every other string is false.
    pub fn coerce_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Integer(i) => Some(*i != 0),
            Self::Float(f) => Some(*f != 0.0),
            Self::Double(d) => Some(*d != 0.0),
            Self::String(s) => Some(s == "YES" || s == "1"),
            _ => None,
        }
    }

    /// URL form. A string is taken as a filesystem path and turned into a
    /// `file://` URL; a blob is unarchived if it holds an encoded URL.
    pub fn coerce_url(&self) -> Option<Url> {
        match self {
            Self::String(path) => file_url(path),
            Self::Data(bytes) => serde_json::from_slice::<Url>(bytes).ok(),
            _ => None,
        }
    }

    /// The elements of an array made entirely of strings. Numbers are not
    /// converted.
    pub fn as_string_array(&self) -> Option<Vec<String>> {
        match self {
            Self::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => None,
        }
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| parse_float(text).map(|f| f as i64))
}

fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Archive a URL into the blob form understood by [`Value::coerce_url`].
pub fn archive_url(url: &Url) -> Value {
    // Serializing a `Url` only writes its string form.
    Value::Data(serde_json::to_vec(url).unwrap_or_default())
}

fn file_url(path: &str) -> Option<Url> {
    if path.is_empty() {
        return None;
    }
    Url::from_file_path(resolve_path(path)?).ok()
}

fn resolve_path(path: &str) -> Option<PathBuf> {
    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir()?,
        Some(rest) if rest.starts_with('/') => dirs::home_dir()?.join(&rest[1..]),
        _ => PathBuf::from(path),
    };
    if expanded.is_absolute() {
        Some(expanded)
    } else {
        Some(std::env::current_dir().ok()?.join(Path::new(&expanded)))
    }
}
