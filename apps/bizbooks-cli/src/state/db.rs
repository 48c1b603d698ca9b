//! # Database State
//!
//! Wraps the [`LifecycleController`] for use in commands.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! async fn list(db: &DbState) -> Result<Vec<Customer>, ApiError> {
//!     let database = db.database().await?;
//!     Ok(database.customers().get_all().await?)
//! }
//! ```
//!
//! Commands borrow the live database per call through
//! [`DbState::database`]; none keeps a handle, since an import replaces it.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLockReadGuard;
use tracing::{info, warn};

use bizbooks_db::{
    Database, DbConfig, DirectoryObjectStore, HostDialogs, JsonFileLegacyStore, LegacyStore,
    LifecycleController, StorageAdapter,
};

use crate::error::ApiError;
use crate::state::AppConfig;

/// Owner of the lifecycle controller for one run.
#[derive(Debug)]
pub struct DbState {
    controller: LifecycleController,
}

impl DbState {
    /// Builds the controller for the configured backend and loads the
    /// database.
    ///
    /// `dialogs` answers user-driven export and import picks.
    pub async fn open(config: &AppConfig, dialogs: Arc<dyn HostDialogs>) -> Result<Self, ApiError> {
        let store = Arc::new(DirectoryObjectStore::new(config.object_root()));
        let adapter: Arc<dyn StorageAdapter> = config.backend().into_adapter(store, dialogs);

        let mut db_config =
            DbConfig::new().connect_timeout(Duration::from_secs(config.storage.connect_timeout_secs));
        if let Some(dir) = &config.storage.scratch_dir {
            db_config = db_config.scratch_dir(dir);
        }

        let mut controller = LifecycleController::new(adapter, db_config);
        if let Some(legacy) = load_legacy(config).await {
            controller = controller.with_legacy(legacy);
        }

        let state = DbState::new(controller);
        state.controller.initialize().await?;

        let identity = state.controller.identity();
        info!(mode = %identity.mode, location = %identity.location, "Database ready");
        Ok(state)
    }

    /// Wraps an already built controller.
    pub fn new(controller: LifecycleController) -> Self {
        DbState { controller }
    }

    /// Borrows the live database for one command.
    pub async fn database(&self) -> Result<RwLockReadGuard<'_, Database>, ApiError> {
        Ok(self.controller.database().await?)
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }
}

/// The legacy dump, when configured and readable.
///
/// It is only consulted if storage has no database yet, so an unreadable
/// dump is logged and ignored rather than blocking startup.
async fn load_legacy(config: &AppConfig) -> Option<Arc<dyn LegacyStore>> {
    let path = config.legacy.file.as_ref()?;
    match JsonFileLegacyStore::open(path).await {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Legacy dump unreadable, ignored");
            None
        }
    }
}
