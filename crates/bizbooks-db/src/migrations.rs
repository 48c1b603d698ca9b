//! # Legacy Import
//!
//! One-time import of the old key-value representation into the tables.
//!
//! ## How The Import Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Legacy Import Process                              │
//! │                                                                         │
//! │  Fresh engine (no snapshot found in storage)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  For each legacy key, in order:                                        │
//! │       │                                                                 │
//! │       ├── companies   → companies                                      │
//! │       ├── customers   → customers                                      │
//! │       ├── products    → products (+ nested batches → product_batches)  │
//! │       ├── invoices    → invoices   (items/taxes → JSON columns)        │
//! │       ├── quotations  → quotations (items/taxes → JSON columns)        │
//! │       ├── challans    → challans   (items → JSON column)               │
//! │       ├── vouchers    → vouchers                                       │
//! │       └── inventory   → inventory_transactions (stock NOT re-applied)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Key missing        → nothing to do                                    │
//! │  Not a JSON array   → whole key skipped                                │
//! │  Record won't parse → that record skipped, the rest continue           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MigrationReport (imported / skipped per key)                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The controller persists the engine right after the import, so the legacy
//! source is never read again.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::engine::Database;
use crate::error::{DbResult, StorageError, StorageResult};
use crate::repository::RecordWriter;
use bizbooks_core::{
    Company, Customer, DeliveryChallan, InventoryTransaction, Invoice, Product, Quotation, Voucher,
};

/// Legacy keys, in import order.
pub const LEGACY_KEYS: &[&str] = &[
    "companies",
    "customers",
    "products",
    "invoices",
    "quotations",
    "challans",
    "vouchers",
    "inventory",
];

// =============================================================================
// Legacy Sources
// =============================================================================

/// Read access to the old key-value store.
///
/// Each value is the JSON text of a list of records.
pub trait LegacyStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Legacy entries held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLegacyStore {
    entries: HashMap<String, String>,
}

impl MemoryLegacyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw text under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Stores `records` as JSON under `key`.
    pub fn insert_records<T: Serialize>(&mut self, key: &str, records: &[T]) -> StorageResult<()> {
        let text = serde_json::to_string(records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.insert(key, text);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LegacyStore for MemoryLegacyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Legacy entries dumped to a JSON file: `{ "companies": [...], ... }`.
///
/// A value may also be a string holding the JSON, the way the browser
/// store kept it.
#[derive(Debug, Clone)]
pub struct JsonFileLegacyStore {
    inner: MemoryLegacyStore,
}

impl JsonFileLegacyStore {
    /// Loads the dump at `path`.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        let store = Self::from_json(&text)?;

        info!(path = %path.display(), keys = store.inner.entries.len(), "Loaded legacy dump");
        Ok(store)
    }

    /// Parses a dump from text.
    pub fn from_json(text: &str) -> StorageResult<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)
            .map_err(|e| StorageError::Serialization(format!("legacy dump: {}", e)))?;

        let mut inner = MemoryLegacyStore::new();
        for (key, value) in object {
            match value {
                serde_json::Value::String(text) => inner.insert(key, text),
                serde_json::Value::Null => {}
                other => inner.insert(key, other.to_string()),
            }
        }
        Ok(JsonFileLegacyStore { inner })
    }
}

impl LegacyStore for JsonFileLegacyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }
}

// =============================================================================
// Report
// =============================================================================

/// Outcome of importing one legacy key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyReport {
    pub key: String,
    pub imported: usize,
    pub skipped: usize,
    /// The value was present but not a JSON list.
    pub unreadable: bool,
}

/// Outcome of a whole legacy import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub keys: Vec<KeyReport>,
}

impl MigrationReport {
    pub fn total_imported(&self) -> usize {
        self.keys.iter().map(|k| k.imported).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.keys.iter().map(|k| k.skipped).sum()
    }

    /// Report for `key`, if it was present in the legacy store.
    pub fn key(&self, key: &str) -> Option<&KeyReport> {
        self.keys.iter().find(|k| k.key == key)
    }
}

// =============================================================================
// Import
// =============================================================================

/// Imports every legacy key into `db`.
///
/// Only malformed payloads are skipped; an engine failure aborts the import.
pub async fn migrate_legacy(db: &Database, legacy: &dyn LegacyStore) -> DbResult<MigrationReport> {
    info!("Importing legacy data");

    let mut report = MigrationReport::default();

    import_key::<Company>(legacy, "companies", &db.companies(), &mut report).await?;
    import_key::<Customer>(legacy, "customers", &db.customers(), &mut report).await?;
    import_key::<Product>(legacy, "products", &db.products(), &mut report).await?;
    import_key::<Invoice>(legacy, "invoices", &db.invoices(), &mut report).await?;
    import_key::<Quotation>(legacy, "quotations", &db.quotations(), &mut report).await?;
    import_key::<DeliveryChallan>(legacy, "challans", &db.challans(), &mut report).await?;
    import_key::<Voucher>(legacy, "vouchers", &db.vouchers(), &mut report).await?;
    import_key::<InventoryTransaction>(legacy, "inventory", &db.inventory(), &mut report).await?;

    info!(
        imported = report.total_imported(),
        skipped = report.total_skipped(),
        "Legacy import finished"
    );
    Ok(report)
}

/// Records carry their id in a top-level `id` field.
fn record_id(value: &serde_json::Value) -> Option<&str> {
    value
        .get("id")
        .and_then(|id| id.as_str())
        .filter(|id| !id.trim().is_empty())
}

async fn import_key<T>(
    legacy: &dyn LegacyStore,
    key: &str,
    writer: &dyn RecordWriter<T>,
    report: &mut MigrationReport,
) -> DbResult<()>
where
    T: DeserializeOwned + Send + Sync,
{
    let Some(raw) = legacy.get(key) else {
        debug!(key = %key, "Legacy key absent");
        return Ok(());
    };

    let mut entry = KeyReport {
        key: key.to_string(),
        imported: 0,
        skipped: 0,
        unreadable: false,
    };

    let values = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Array(values)) => values,
        Ok(_) | Err(_) => {
            warn!(key = %key, "Legacy value is not a JSON list, key skipped");
            entry.unreadable = true;
            report.keys.push(entry);
            return Ok(());
        }
    };

    for (index, value) in values.into_iter().enumerate() {
        if record_id(&value).is_none() {
            warn!(key = %key, index = index, "Legacy record has no id, skipped");
            entry.skipped += 1;
            continue;
        }

        match serde_json::from_value::<T>(value) {
            Ok(record) => {
                writer.save(&record).await?;
                entry.imported += 1;
            }
            Err(e) => {
                warn!(key = %key, index = index, error = %e, "Malformed legacy record, skipped");
                entry.skipped += 1;
            }
        }
    }

    debug!(key = %key, imported = entry.imported, skipped = entry.skipped, "Imported legacy key");
    report.keys.push(entry);
    Ok(())
}
