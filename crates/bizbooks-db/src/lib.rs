//! # bizbooks-db: Persistence Layer for BizBooks
//!
//! Keeps the whole book of records in one private embedded SQLite engine,
//! and moves it to and from storage as a single snapshot.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BizBooks Data Flow                               │
//! │                                                                         │
//! │  Host command (list, stock, import, ...)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    bizbooks-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────────────┐   ┌───────────────┐   ┌──────────────┐   │   │
//! │  │  │ LifecycleControl │   │ Repositories  │   │  Migrations  │   │   │
//! │  │  │ (controller.rs)  │   │ (repository/) │   │ (legacy k/v) │   │   │
//! │  │  │                  │   │               │   │              │   │   │
//! │  │  │ live Database ───┼──►│ Table<T>      │   │ schema.rs    │   │   │
//! │  │  │ save / import    │   │ Product/Inv.  │   │              │   │   │
//! │  │  └────────┬─────────┘   └───────────────┘   └──────────────┘   │   │
//! │  │           │                                                     │   │
//! │  │           ▼                                                     │   │
//! │  │  ┌──────────────────────────────────────────────────────────┐  │   │
//! │  │  │ StorageAdapter: NativeFileAdapter | ObjectStoreAdapter    │  │   │
//! │  │  └──────────────────────────────────────────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  One file (bizbooks.db) or one blob (<namespace>/database)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - In-memory engine, snapshot export and import
//! - [`schema`] - Table definitions
//! - [`migrations`] - One-time legacy key-value import
//! - [`controller`] - Owner of the live handle
//! - [`demo`] - Demo records for development
//! - [`storage`] - Where snapshots are kept
//! - [`repository`] - Per-entity access
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bizbooks_db::{LifecycleController, DbConfig, StorageBackend};
//!
//! let adapter = StorageBackend::NativeFile(path).into_adapter(store, dialogs);
//! let controller = LifecycleController::new(adapter, DbConfig::default());
//!
//! let db = controller.initialize().await?;
//! let customers = db.customers().get_all().await?;
//!
//! // Repositories never flush; persist explicitly.
//! controller.save().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod controller;
pub mod demo;
pub mod engine;
pub mod error;
pub mod migrations;
pub mod repository;
pub mod schema;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use controller::{LifecycleController, UserImport};
pub use demo::{seed_demo, DemoOptions, DemoSummary};
pub use engine::{Database, DbConfig};
pub use error::{DbError, DbResult, StorageError, StorageResult};
pub use migrations::{
    migrate_legacy, JsonFileLegacyStore, LegacyStore, MemoryLegacyStore, MigrationReport,
};
pub use storage::{
    resolve_native_location, suggested_export_name, DirectoryObjectStore, HostDialogs,
    LocationCandidates, MemoryObjectStore, NativeFileAdapter, NoDialogs, ObjectStore,
    ObjectStoreAdapter, PresetDialogs, StorageAdapter, StorageBackend, StorageIdentity,
    StorageMode,
};

// Repository re-exports for convenience
pub use repository::{
    ChallanRepository, CompanyRepository, CustomerRepository, InventoryRepository,
    InvoiceRepository, ProductRepository, QuotationRepository, Table, VoucherRepository,
};
