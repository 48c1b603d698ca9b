//! Object-store backend: the snapshot is one blob under a fixed key inside a
//! namespace.
//!
//! The web build plugs its browser store in through [`ObjectStore`]. Two
//! stores ship here: [`MemoryObjectStore`] for tests and embedding, and
//! [`DirectoryObjectStore`] which keeps each namespace as a directory.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::dialogs::{read_picked, write_file, write_picked};
use super::{
    suggested_export_name, HostDialogs, StorageAdapter, StorageIdentity, StorageMode,
    DATABASE_OBJECT_KEY,
};
use crate::error::{StorageError, StorageResult};

/// A namespaced key/blob store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>>;

    async fn put(&self, namespace: &str, key: &str, bytes: &[u8]) -> StorageResult<()>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let objects = self.objects.lock().await;
        Ok(objects
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn put(&self, namespace: &str, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let mut objects = self.objects.lock().await;
        objects.insert((namespace.to_string(), key.to_string()), bytes.to_vec());
        Ok(())
    }
}

// =============================================================================
// Directory Store
// =============================================================================

/// Keeps `namespace/key` as files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryObjectStore {
    root: PathBuf,
}

impl DirectoryObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryObjectStore { root: root.into() }
    }

    fn object_path(&self, namespace: &str, key: &str) -> StorageResult<PathBuf> {
        for part in [namespace, key] {
            let clean = !part.is_empty()
                && part != "."
                && part != ".."
                && !part.contains(['/', '\\']);
            if !clean {
                return Err(StorageError::Unavailable(format!(
                    "invalid object name '{}'",
                    part
                )));
            }
        }
        Ok(self.root.join(namespace).join(key))
    }
}

#[async_trait]
impl ObjectStore for DirectoryObjectStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.object_path(namespace, key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    async fn put(&self, namespace: &str, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.object_path(namespace, key)?;
        write_file(&path, bytes).await
    }
}

// =============================================================================
// Adapter
// =============================================================================

/// Keeps the database as the `database` object of one namespace.
#[derive(Clone)]
pub struct ObjectStoreAdapter {
    store: Arc<dyn ObjectStore>,
    namespace: String,
    dialogs: Arc<dyn HostDialogs>,
}

impl std::fmt::Debug for ObjectStoreAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreAdapter")
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl ObjectStoreAdapter {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        namespace: impl Into<String>,
        dialogs: Arc<dyn HostDialogs>,
    ) -> Self {
        ObjectStoreAdapter {
            store,
            namespace: namespace.into(),
            dialogs,
        }
    }
}

#[async_trait]
impl StorageAdapter for ObjectStoreAdapter {
    async fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        let bytes = self.store.get(&self.namespace, DATABASE_OBJECT_KEY).await?;
        debug!(
            namespace = %self.namespace,
            found = bytes.is_some(),
            "Read database object"
        );
        Ok(bytes)
    }

    async fn write(&self, bytes: &[u8]) -> StorageResult<()> {
        self.store
            .put(&self.namespace, DATABASE_OBJECT_KEY, bytes)
            .await?;
        info!(namespace = %self.namespace, bytes = bytes.len(), "Database object written");
        Ok(())
    }

    async fn pick_and_read(&self) -> StorageResult<Option<Vec<u8>>> {
        read_picked(self.dialogs.as_ref()).await
    }

    async fn pick_and_write(&self, bytes: &[u8]) -> StorageResult<Option<String>> {
        let name = suggested_export_name(Utc::now().date_naive());
        write_picked(self.dialogs.as_ref(), &name, bytes).await
    }

    fn identity(&self) -> StorageIdentity {
        StorageIdentity {
            mode: StorageMode::ObjectStore,
            location: format!("{}/{}", self.namespace, DATABASE_OBJECT_KEY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NoDialogs;

    #[tokio::test]
    async fn test_namespaces_are_separate() {
        let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
        let a = ObjectStoreAdapter::new(store.clone(), "shop-a", Arc::new(NoDialogs));
        let b = ObjectStoreAdapter::new(store, "shop-b", Arc::new(NoDialogs));

        a.write(b"alpha").await.unwrap();

        assert_eq!(a.read().await.unwrap().as_deref(), Some(&b"alpha"[..]));
        assert_eq!(b.read().await.unwrap(), None);
        assert_eq!(a.identity().location, "shop-a/database");
    }

    #[tokio::test]
    async fn test_directory_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        DirectoryObjectStore::new(dir.path())
            .put("bizbooks", "database", b"blob")
            .await
            .unwrap();

        let reopened = DirectoryObjectStore::new(dir.path());
        assert_eq!(
            reopened.get("bizbooks", "database").await.unwrap().as_deref(),
            Some(&b"blob"[..])
        );
        assert_eq!(reopened.get("bizbooks", "other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_directory_store_rejects_path_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryObjectStore::new(dir.path());
        assert!(store.get("../escape", "database").await.is_err());
        assert!(store.put("ns", "", b"x").await.is_err());
    }
}
