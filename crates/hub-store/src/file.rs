use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::names::validate_domain_name;
use crate::traits::DomainStore;
use crate::value::Domain;

/// File extension of persisted domain documents.
const EXTENSION: &str = "json";

/// Directory-backed domain store.
///
/// Each domain is one pretty-printed JSON document, `<root>/<name>.json`.
/// The root directory is created on the first save. Saves are atomic: the
/// document is written to a temporary file in the same directory and then
/// renamed over the old one, so readers never observe a torn document.
#[derive(Debug, Clone)]
pub struct FileDomainStore {
    root: PathBuf,
}

impl FileDomainStore {
    /// Open a store rooted at `root`. Nothing touches the filesystem until
    /// the first operation.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document backing `name`.
    pub fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        validate_domain_name(name)?;
        Ok(self.root.join(format!("{name}.{EXTENSION}")))
    }
}

impl DomainStore for FileDomainStore {
    fn load(&self, name: &str) -> StoreResult<Option<Domain>> {
        let path = self.path_for(name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let domain = serde_json::from_slice(&bytes).map_err(|e| StoreError::CorruptDomain {
            name: name.to_string(),
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!(domain = name, path = %path.display(), "loaded domain");
        Ok(Some(domain))
    }

    fn save(&self, name: &str, domain: &Domain) -> StoreResult<()> {
        let path = self.path_for(name)?;
        let payload = serde_json::to_vec_pretty(domain)?;

        fs::create_dir_all(&self.root)?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&payload)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(domain = name, bytes = payload.len(), "saved domain");
        Ok(())
    }

    fn remove(&self, name: &str) -> StoreResult<bool> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn names(&self) -> StoreResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.path_for(name)?.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn store() -> (tempfile::TempDir, FileDomainStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDomainStore::new(dir.path().join("prefs"));
        (dir, store)
    }

    fn sample() -> Domain {
        let mut d = Domain::new();
        d.insert("name".into(), Value::from("hub"));
        d.insert("age".into(), Value::Integer(42));
        d.insert("blob".into(), Value::data(vec![0u8, 1, 2]));
        d
    }

    #[test]
    fn save_creates_root_and_document() {
        let (_dir, store) = store();
        assert!(!store.root().exists());

        store.save("app", &sample()).unwrap();
        assert!(store.path_for("app").unwrap().is_file());
        assert_eq!(store.load("app").unwrap(), Some(sample()));
    }

    #[test]
    fn load_missing_returns_none() {
        let (_dir, store) = store();
        assert!(store.load("nothing").unwrap().is_none());
        assert!(!store.exists("nothing").unwrap());
    }

    #[test]
    fn non_finite_reals_round_trip() {
        let (_dir, store) = store();
        let mut d = Domain::new();
        d.insert("nan".into(), Value::Double(f64::NAN));
        d.insert("inf".into(), Value::Double(f64::INFINITY));
        d.insert("neg".into(), Value::Float(f32::NEG_INFINITY));
        store.save("app", &d).unwrap();

        let loaded = store.load("app").unwrap().unwrap();
        assert!(matches!(loaded.get("nan"), Some(Value::Double(v)) if v.is_nan()));
        assert_eq!(loaded.get("inf"), Some(&Value::Double(f64::INFINITY)));
        assert_eq!(loaded.get("neg"), Some(&Value::Float(f32::NEG_INFINITY)));
    }

    #[test]
    fn corrupt_document_is_reported() {
        let (_dir, store) = store();
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.path_for("bad").unwrap(), b"{ not json").unwrap();

        let err = store.load("bad").unwrap_err();
        assert!(matches!(err, StoreError::CorruptDomain { ref name, .. } if name == "bad"));
    }

    #[test]
    fn remove_deletes_document() {
        let (_dir, store) = store();
        store.save("app", &sample()).unwrap();
        assert!(store.remove("app").unwrap());
        assert!(!store.remove("app").unwrap());
        assert!(store.load("app").unwrap().is_none());
    }

    #[test]
    fn names_lists_only_documents() {
        let (_dir, store) = store();
        store.save("b", &Domain::new()).unwrap();
        store.save("a", &Domain::new()).unwrap();
        fs::write(store.root().join("notes.txt"), b"ignored").unwrap();

        assert_eq!(store.names().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn names_of_missing_root_is_empty() {
        let (_dir, store) = store();
        assert!(store.names().unwrap().is_empty());
    }

    #[test]
    fn invalid_names_never_touch_disk() {
        let (_dir, store) = store();
        let err = store.save("../escape", &Domain::new()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidDomainName { .. }));
        assert!(!store.root().exists());
    }

    #[test]
    fn documents_are_human_readable() {
        let (_dir, store) = store();
        store.save("app", &sample()).unwrap();
        let text = fs::read_to_string(store.path_for("app").unwrap()).unwrap();
        assert!(text.contains("\"type\": \"integer\""));
        assert!(text.contains("\"000102\""));
    }
}
