//! # Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults (this file)                                               │
//! │  2. Config file                                                         │
//! │       --config <path>, or bizbooks.toml in the platform config dir:    │
//! │       ~/.config/bizbooks/bizbooks.toml (Linux)                         │
//! │       ~/Library/Application Support/com.bizbooks.bizbooks/ (macOS)     │
//! │  3. Environment variables (BIZBOOKS_*)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! [storage]
//! backend = "native-file"
//! db_path = "/srv/books/bizbooks.db"
//!
//! [legacy]
//! file = "/srv/books/localstorage-dump.json"
//!
//! [session]
//! company_id = "6f1c0c4e-..."
//! ```
//!
//! Read-only after load.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use bizbooks_db::{
    resolve_native_location, LocationCandidates, StorageBackend, StorageMode,
};

/// Config file name looked up in the platform config dir.
pub const CONFIG_FILE_NAME: &str = "bizbooks.toml";

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Sections
// =============================================================================

/// Where the database is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `native-file` or `object-store`.
    pub backend: StorageMode,

    /// Database file. Resolved from the standard locations when unset.
    pub db_path: Option<PathBuf>,

    /// Object-store namespace.
    pub namespace: String,

    /// Root directory of the object store. App-data dir when unset.
    pub object_root: Option<PathBuf>,

    /// Engine connect timeout.
    pub connect_timeout_secs: u64,

    /// Scratch directory for snapshot staging. System temp when unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageMode::NativeFile,
            db_path: None,
            namespace: "bizbooks".to_string(),
            object_root: None,
            connect_timeout_secs: 30,
            scratch_dir: None,
        }
    }
}

/// Legacy key-value dump imported into a brand-new database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacySettings {
    pub file: Option<PathBuf>,
}

/// Per-user session choices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Selected company. The first company is used when unset or missing.
    pub company_id: Option<String>,
}

// =============================================================================
// App Config
// =============================================================================

/// Complete host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub legacy: LegacySettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit `config_path` must exist; the default one may be absent.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(path = %path.display(), "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading config file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `bizbooks.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Applies `BIZBOOKS_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("BIZBOOKS_BACKEND") {
            debug!(backend = %backend, "Overriding backend from environment");
            self.storage.backend = parse_mode(&backend)?;
        }

        if let Some(path) = lookup("BIZBOOKS_DB_PATH") {
            self.storage.db_path = Some(PathBuf::from(path));
        }

        if let Some(namespace) = lookup("BIZBOOKS_NAMESPACE") {
            self.storage.namespace = namespace;
        }

        if let Some(file) = lookup("BIZBOOKS_LEGACY_FILE") {
            self.legacy.file = Some(PathBuf::from(file));
        }

        if let Some(company_id) = lookup("BIZBOOKS_COMPANY_ID") {
            self.session.company_id = Some(company_id).filter(|id| !id.trim().is_empty());
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageMode::ObjectStore {
            let namespace = self.storage.namespace.trim();
            if namespace.is_empty() || namespace.contains(['/', '\\']) || namespace == ".." {
                return Err(ConfigError::Invalid(format!(
                    "namespace '{}' is not a valid object-store namespace",
                    self.storage.namespace
                )));
            }
        }

        if let Some(path) = &self.storage.db_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("db_path is empty".into()));
            }
        }

        if self.storage.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "connect_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Chooses the storage backend for this process.
    ///
    /// An explicit `db_path` wins; otherwise the first writable of the
    /// development dir, the executable dir and the app-data dir.
    pub fn backend(&self) -> StorageBackend {
        match self.storage.backend {
            StorageMode::ObjectStore => StorageBackend::ObjectStore {
                namespace: self.storage.namespace.trim().to_string(),
            },
            StorageMode::NativeFile => {
                let path = match &self.storage.db_path {
                    Some(path) => path.clone(),
                    None => resolve_native_location(
                        &location_candidates(),
                        bizbooks_db::storage::DATABASE_FILE_NAME,
                    ),
                };
                StorageBackend::NativeFile(path)
            }
        }
    }

    /// Root of the directory object store.
    pub fn object_root(&self) -> PathBuf {
        self.storage
            .object_root
            .clone()
            .unwrap_or_else(|| app_data_dir().join("objects"))
    }
}

fn parse_mode(value: &str) -> Result<StorageMode, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "native-file" | "native" | "file" => Ok(StorageMode::NativeFile),
        "object-store" | "object" | "browser" => Ok(StorageMode::ObjectStore),
        other => Err(ConfigError::Invalid(format!("unknown backend '{}'", other))),
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "bizbooks", "bizbooks")
}

/// Per-user data directory, or the working directory if the platform has none.
fn app_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn location_candidates() -> LocationCandidates {
    // Debug builds keep their database next to the sources.
    let dev_dir = cfg!(debug_assertions)
        .then(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("data"));

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    LocationCandidates {
        dev_dir,
        exe_dir,
        app_data_dir: app_data_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_file_then_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
                [storage]
                backend = "object-store"
                namespace = "shop"

                [session]
                company_id = "c-1"
            "#,
        )
        .unwrap();

        let mut config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.storage.backend, StorageMode::ObjectStore);
        assert_eq!(config.storage.connect_timeout_secs, 30);

        config
            .apply_overrides(env(&[
                ("BIZBOOKS_NAMESPACE", "shop-2"),
                ("BIZBOOKS_COMPANY_ID", "c-2"),
                ("BIZBOOKS_LEGACY_FILE", "/tmp/dump.json"),
            ]))
            .unwrap();

        assert_eq!(config.storage.namespace, "shop-2");
        assert_eq!(config.session.company_id.as_deref(), Some("c-2"));
        assert_eq!(config.legacy.file, Some(PathBuf::from("/tmp/dump.json")));
        assert_eq!(
            config.backend(),
            StorageBackend::ObjectStore {
                namespace: "shop-2".to_string()
            }
        );
    }

    #[test]
    fn test_explicit_db_path_wins() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                ("BIZBOOKS_BACKEND", "native"),
                ("BIZBOOKS_DB_PATH", "/data/books.db"),
            ]))
            .unwrap();

        assert_eq!(
            config.backend(),
            StorageBackend::NativeFile(PathBuf::from("/data/books.db"))
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = AppConfig::default();
        assert!(config
            .apply_overrides(env(&[("BIZBOOKS_BACKEND", "floppy")]))
            .is_err());

        config.storage.backend = StorageMode::ObjectStore;
        config.storage.namespace = "../up".to_string();
        assert!(config.validate().is_err());

        let missing = AppConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
