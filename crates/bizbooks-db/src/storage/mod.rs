//! # Storage Adapters
//!
//! Where the database snapshot lives between runs.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       StorageAdapter (trait)                            │
//! │                                                                         │
//! │   read() / write(bytes)             the one persisted snapshot         │
//! │   pick_and_read() / pick_and_write  user-driven import / export        │
//! │   identity()                        { mode, location } for display     │
//! │                                                                         │
//! │        ┌──────────────────────┐        ┌──────────────────────────┐    │
//! │        │  NativeFileAdapter   │        │   ObjectStoreAdapter     │    │
//! │        │  desktop shell       │        │   web build              │    │
//! │        │  one file on disk    │        │   one blob in namespace  │    │
//! │        └──────────────────────┘        └──────────────────────────┘    │
//! │                                                                         │
//! │  Picked backend is fixed for the life of the process                   │
//! │  (see StorageBackend); nothing outside the controller branches on it.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod dialogs;
pub mod location;
pub mod native;
pub mod object_store;

pub use dialogs::{HostDialogs, NoDialogs, PresetDialogs};
pub use location::{resolve_native_location, LocationCandidates};
pub use native::NativeFileAdapter;
pub use object_store::{DirectoryObjectStore, MemoryObjectStore, ObjectStore, ObjectStoreAdapter};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::StorageResult;

/// File name of the persisted database in native-file mode.
pub const DATABASE_FILE_NAME: &str = "bizbooks.db";

/// Key of the persisted database inside an object-store namespace.
pub const DATABASE_OBJECT_KEY: &str = "database";

/// Which kind of backend an adapter is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageMode {
    NativeFile,
    ObjectStore,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::NativeFile => write!(f, "native-file"),
            StorageMode::ObjectStore => write!(f, "object-store"),
        }
    }
}

/// Active backend and where it keeps the database. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageIdentity {
    pub mode: StorageMode,
    pub location: String,
}

/// Backend chosen once at startup and injected into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Database file at an absolute path.
    NativeFile(PathBuf),
    /// Blob inside a named object-store namespace.
    ObjectStore { namespace: String },
}

impl StorageBackend {
    pub fn mode(&self) -> StorageMode {
        match self {
            StorageBackend::NativeFile(_) => StorageMode::NativeFile,
            StorageBackend::ObjectStore { .. } => StorageMode::ObjectStore,
        }
    }

    /// Builds the adapter for this backend.
    ///
    /// `store` is only used by the object-store backend.
    pub fn into_adapter(
        self,
        store: Arc<dyn ObjectStore>,
        dialogs: Arc<dyn HostDialogs>,
    ) -> Arc<dyn StorageAdapter> {
        match self {
            StorageBackend::NativeFile(path) => Arc::new(NativeFileAdapter::new(path, dialogs)),
            StorageBackend::ObjectStore { namespace } => {
                Arc::new(ObjectStoreAdapter::new(store, namespace, dialogs))
            }
        }
    }
}

/// Byte-level access to wherever the database snapshot is kept.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// The persisted snapshot, or `None` when nothing was saved yet.
    async fn read(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the persisted snapshot.
    async fn write(&self, bytes: &[u8]) -> StorageResult<()>;

    /// Lets the user choose a file to import. `None` if they cancel.
    async fn pick_and_read(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Lets the user choose where to export. Returns the chosen location,
    /// `None` if they cancel.
    async fn pick_and_write(&self, bytes: &[u8]) -> StorageResult<Option<String>>;

    fn identity(&self) -> StorageIdentity;
}

/// Suggested file name for a user export made on `date`.
///
/// ```rust
/// use bizbooks_db::storage::suggested_export_name;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(suggested_export_name(date), "bizbooks-backup-2024-03-09.db");
/// ```
pub fn suggested_export_name(date: NaiveDate) -> String {
    format!("bizbooks-backup-{}.db", date.format("%Y-%m-%d"))
}
