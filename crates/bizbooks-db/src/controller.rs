//! # Lifecycle Controller
//!
//! Owns the single live [`Database`] and moves it between memory and the
//! active [`StorageAdapter`].
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Lifecycle                                 │
//! │                                                                         │
//! │  initialize()                                                          │
//! │       │  handle present? ──yes──► return it                            │
//! │       ▼                                                                 │
//! │  adapter.read()                                                        │
//! │       ├── Some(bytes) ──► Database::from_bytes ──ok──► live handle     │
//! │       │                         │                                       │
//! │       │                      corrupt (warn)                             │
//! │       ├── None ◄────────────────┘                                       │
//! │       ├── Err (warn) ──► treated as None                               │
//! │       ▼                                                                 │
//! │  open_empty ──► migrate_legacy (once) ──► adapter.write ──► live       │
//! │                                                                         │
//! │  save()          to_bytes ──► adapter.write      (false on failure)    │
//! │  export_bytes()  to_bytes, storage untouched                           │
//! │  import_bytes()  parse ──► swap ──► adapter.write  (write lock held)   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Busy Guard
//! The handle sits behind a `tokio::sync::RwLock`. `import_bytes` keeps the
//! write lock from parse to persistence, so repository access through
//! [`LifecycleController::database`] waits until the import is complete.
//! A replaced handle is closed; clones of it taken earlier fail with
//! `DbError::NotInitialized` instead of reading stale data.

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::engine::{Database, DbConfig};
use crate::error::{DbError, DbResult};
use crate::migrations::{migrate_legacy, LegacyStore};
use crate::storage::{StorageAdapter, StorageIdentity};

/// Outcome of [`LifecycleController::import_from_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserImport {
    /// The user dismissed the pick; nothing changed.
    Cancelled,
    /// The picked database is live. `saved` is false when it did not reach
    /// storage and only exists in the live handle.
    Imported { saved: bool },
}

/// Owner of the live database handle.
pub struct LifecycleController {
    adapter: Arc<dyn StorageAdapter>,
    legacy: Option<Arc<dyn LegacyStore>>,
    config: DbConfig,
    handle: RwLock<Option<Database>>,
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("identity", &self.adapter.identity())
            .field("has_legacy", &self.legacy.is_some())
            .finish()
    }
}

impl LifecycleController {
    /// Creates a controller bound to `adapter` for its whole life.
    pub fn new(adapter: Arc<dyn StorageAdapter>, config: DbConfig) -> Self {
        LifecycleController {
            adapter,
            legacy: None,
            config,
            handle: RwLock::new(None),
        }
    }

    /// Source for the one-time legacy import on a fresh database.
    pub fn with_legacy(mut self, legacy: Arc<dyn LegacyStore>) -> Self {
        self.legacy = Some(legacy);
        self
    }

    /// Loads the database, creating it if storage has none.
    ///
    /// Idempotent: later calls return the existing handle without touching
    /// storage.
    ///
    /// ## Errors
    /// Only `DbError::EngineUnavailable` (or another engine failure) escapes.
    /// Storage read failures and corrupt snapshots fall through to a fresh
    /// database.
    pub async fn initialize(&self) -> DbResult<Database> {
        if let Some(db) = self.handle.read().await.as_ref() {
            return Ok(db.clone());
        }

        let mut slot = self.handle.write().await;
        if let Some(db) = slot.as_ref() {
            return Ok(db.clone());
        }

        let identity = self.adapter.identity();
        info!(mode = %identity.mode, location = %identity.location, "Initializing database");

        let db = match self.load_existing().await? {
            Some(db) => db,
            None => self.create_fresh().await?,
        };

        *slot = Some(db.clone());
        Ok(db)
    }

    async fn load_existing(&self) -> DbResult<Option<Database>> {
        let bytes = match self.adapter.read().await {
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => {
                debug!("No stored database found");
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "Stored database unreadable, starting fresh");
                return Ok(None);
            }
        };

        match Database::from_bytes(&bytes, &self.config).await {
            Ok(db) => {
                info!(bytes = bytes.len(), "Loaded stored database");
                Ok(Some(db))
            }
            Err(DbError::InvalidSnapshot(reason)) => {
                warn!(reason = %reason, "Stored database is corrupt, starting fresh");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_fresh(&self) -> DbResult<Database> {
        let db = Database::open_empty(&self.config).await?;
        info!("Created fresh database");

        if let Some(legacy) = &self.legacy {
            let report = migrate_legacy(&db, legacy.as_ref()).await?;
            info!(
                imported = report.total_imported(),
                skipped = report.total_skipped(),
                "Legacy data imported"
            );
        }

        self.persist(&db).await;
        Ok(db)
    }

    /// Serializes `db` and writes it through the adapter.
    async fn persist(&self, db: &Database) -> bool {
        let bytes = match db.to_bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to serialize database");
                return false;
            }
        };

        match self.adapter.write(&bytes).await {
            Ok(()) => {
                info!(bytes = bytes.len(), "Database saved");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to save database");
                false
            }
        }
    }

    /// Writes the live database to storage.
    ///
    /// Returns false when nothing was written: no handle yet, or the write
    /// failed (logged). Never errors.
    pub async fn save(&self) -> bool {
        let guard = self.handle.read().await;
        match guard.as_ref() {
            Some(db) => self.persist(db).await,
            None => {
                debug!("Save skipped, database not initialized");
                false
            }
        }
    }

    /// Snapshot of the live database. Storage is not touched.
    ///
    /// `None` when there is no handle yet.
    pub async fn export_bytes(&self) -> DbResult<Option<Vec<u8>>> {
        let guard = self.handle.read().await;
        match guard.as_ref() {
            Some(db) => {
                let bytes = db.to_bytes().await?;
                info!(bytes = bytes.len(), "Exported database");
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }

    /// Replaces the live database with the snapshot in `bytes` and persists it.
    ///
    /// The old handle stays live until `bytes` has parsed. Nothing is merged.
    /// Returns whether the new database reached storage.
    ///
    /// ## Errors
    /// `DbError::InvalidSnapshot` when `bytes` is not a database; the
    /// previous handle is untouched in that case.
    pub async fn import_bytes(&self, bytes: &[u8]) -> DbResult<bool> {
        let mut slot = self.handle.write().await;

        let fresh = Database::from_bytes(bytes, &self.config).await?;

        if let Some(old) = slot.replace(fresh.clone()) {
            old.close().await;
        }
        info!(bytes = bytes.len(), "Imported database");

        Ok(self.persist(&fresh).await)
    }

    /// Asks the host for a destination and writes a snapshot there.
    ///
    /// Returns the written location, or `None` when the user cancelled.
    pub async fn export_to_user(&self) -> DbResult<Option<String>> {
        let bytes = self.export_bytes().await?.ok_or(DbError::NotInitialized)?;
        let location = self.adapter.pick_and_write(&bytes).await?;
        if location.is_none() {
            debug!("Export cancelled");
        }
        Ok(location)
    }

    /// Asks the host for a database file and imports it.
    pub async fn import_from_user(&self) -> DbResult<UserImport> {
        let Some(bytes) = self.adapter.pick_and_read().await? else {
            debug!("Import cancelled");
            return Ok(UserImport::Cancelled);
        };
        let saved = self.import_bytes(&bytes).await?;
        if !saved {
            warn!("Imported database is live but was not saved");
        }
        Ok(UserImport::Imported { saved })
    }

    /// Borrows the live database for one operation.
    ///
    /// Do not hold the guard across calls; an import waits for it.
    pub async fn database(&self) -> DbResult<RwLockReadGuard<'_, Database>> {
        let guard = self.handle.read().await;
        RwLockReadGuard::try_map(guard, |slot| slot.as_ref()).map_err(|_| DbError::NotInitialized)
    }

    /// The live handle, if initialized.
    pub async fn current_handle(&self) -> Option<Database> {
        self.handle.read().await.clone()
    }

    /// Backend mode and location, for display.
    pub fn identity(&self) -> StorageIdentity {
        self.adapter.identity()
    }

    /// Closes the live handle without saving.
    pub async fn shutdown(&self) {
        if let Some(db) = self.handle.write().await.take() {
            db.close().await;
            info!("Database closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryObjectStore, NoDialogs, ObjectStoreAdapter};
    use bizbooks_core::Customer;

    fn controller() -> LifecycleController {
        let adapter = ObjectStoreAdapter::new(
            Arc::new(MemoryObjectStore::new()),
            "test",
            Arc::new(NoDialogs),
        );
        LifecycleController::new(Arc::new(adapter), DbConfig::default())
    }

    #[tokio::test]
    async fn test_uninitialized_controller() {
        let controller = controller();

        assert!(!controller.save().await);
        assert_eq!(controller.export_bytes().await.unwrap(), None);
        assert!(controller.current_handle().await.is_none());
        assert!(matches!(
            controller.database().await,
            Err(DbError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let controller = controller();

        let first = controller.initialize().await.unwrap();
        first
            .customers()
            .save(&Customer::new("Asha Traders").unwrap())
            .await
            .unwrap();

        let second = controller.initialize().await.unwrap();
        assert_eq!(second.customers().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_closes_handle() {
        let controller = controller();
        let db = controller.initialize().await.unwrap();

        controller.shutdown().await;

        assert!(controller.current_handle().await.is_none());
        assert!(matches!(
            db.customers().get_all().await,
            Err(DbError::NotInitialized)
        ));
    }
}
