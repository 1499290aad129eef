use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use hub_store::{StoreConfig, SyncMode};

use crate::error::ConfigError;

/// Environment variable overriding [`StoreConfig::root`].
pub const ENV_ROOT: &str = "HUB_DEFAULTS_ROOT";
/// Environment variable overriding [`RegistryConfig::application_domain`].
pub const ENV_APP: &str = "HUB_DEFAULTS_APP";
/// Environment variable overriding [`StoreConfig::sync_mode`]
/// (`every_write` or `manual`).
pub const ENV_SYNC: &str = "HUB_DEFAULTS_SYNC";

/// Configuration for a [`crate::Registry`].
///
/// ```toml
/// application_domain = "com.example.app"
/// root = "/var/lib/example/preferences"
/// sync_mode = "manual"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Primary domain of the standard store instance. Namespaces never use
    /// it as their own domain.
    pub application_domain: String,
    #[serde(flatten)]
    pub store: StoreConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            application_domain: default_application_domain(),
            store: StoreConfig::default(),
        }
    }
}

impl RegistryConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply `HUB_DEFAULTS_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by the `ENV_*` names.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(root) = lookup(ENV_ROOT).filter(|v| !v.is_empty()) {
            self.store.root = PathBuf::from(root);
        }
        if let Some(app) = lookup(ENV_APP).filter(|v| !v.is_empty()) {
            self.application_domain = app;
        }
        if let Some(mode) = lookup(ENV_SYNC) {
            self.store.sync_mode = parse_sync_mode(&mode)?;
        }
        Ok(self)
    }
}

fn parse_sync_mode(value: &str) -> Result<SyncMode, ConfigError> {
    match value.trim() {
        "every_write" => Ok(SyncMode::EveryWrite),
        "manual" => Ok(SyncMode::Manual),
        other => Err(ConfigError::InvalidValue {
            key: ENV_SYNC.to_string(),
            value: other.to_string(),
            reason: "expected `every_write` or `manual`".into(),
        }),
    }
}

/// Stem of the running executable, or `"hub"`.
fn default_application_domain() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "hub".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let c = RegistryConfig::default();
        assert!(!c.application_domain.is_empty());
        assert_eq!(c.store, StoreConfig::default());
    }

    #[test]
    fn parses_full_document() {
        let c = RegistryConfig::from_toml_str(
            r#"
            application_domain = "com.example.app"
            root = "/srv/prefs"
            sync_mode = "manual"
            "#,
        )
        .unwrap();
        assert_eq!(c.application_domain, "com.example.app");
        assert_eq!(c.store.root, PathBuf::from("/srv/prefs"));
        assert_eq!(c.store.sync_mode, SyncMode::Manual);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let c = RegistryConfig::from_toml_str(r#"application_domain = "app""#).unwrap();
        assert_eq!(c.application_domain, "app");
        assert_eq!(c.store, StoreConfig::default());
    }

    #[test]
    fn rejects_bad_sync_mode() {
        let err = RegistryConfig::from_toml_str(r#"sync_mode = "sometimes""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.toml");
        std::fs::write(&path, "application_domain = \"from-file\"\n").unwrap();
        assert_eq!(RegistryConfig::load(&path).unwrap().application_domain, "from-file");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = RegistryConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn overrides_apply() {
        let c = RegistryConfig::default()
            .with_overrides(lookup(&[
                (ENV_ROOT, "/tmp/over"),
                (ENV_APP, "over-app"),
                (ENV_SYNC, "manual"),
            ]))
            .unwrap();
        assert_eq!(c.store.root, PathBuf::from("/tmp/over"));
        assert_eq!(c.application_domain, "over-app");
        assert_eq!(c.store.sync_mode, SyncMode::Manual);
    }

    #[test]
    fn empty_overrides_are_ignored() {
        let base = RegistryConfig::default();
        let c = base
            .clone()
            .with_overrides(lookup(&[(ENV_ROOT, ""), (ENV_APP, "")]))
            .unwrap();
        assert_eq!(c, base);
    }

    #[test]
    fn bad_sync_override_is_rejected() {
        let err = RegistryConfig::default()
            .with_overrides(lookup(&[(ENV_SYNC, "often")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref value, .. } if value == "often"));
    }
}
