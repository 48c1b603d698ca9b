//! Controller and repository behavior against in-memory storage.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use bizbooks_core::{
    Customer, InventoryTransaction, Invoice, InvoiceStatus, LineItem, MovementType, Product,
    Quotation,
};
use bizbooks_db::{
    Database, DbConfig, DbError, LegacyStore, LifecycleController, MemoryLegacyStore,
    NativeFileAdapter, PresetDialogs, StorageAdapter, StorageError, StorageIdentity, StorageMode,
    StorageResult, UserImport,
};

// =============================================================================
// Test Doubles
// =============================================================================

/// Adapter that keeps one blob in memory and counts calls.
#[derive(Default)]
struct CountingAdapter {
    bytes: Mutex<Option<Vec<u8>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: bool,
    fail_writes: bool,
    picked: Option<Vec<u8>>,
}

impl CountingAdapter {
    fn with_bytes(bytes: Vec<u8>) -> Self {
        CountingAdapter {
            bytes: Mutex::new(Some(bytes)),
            ..CountingAdapter::default()
        }
    }

    fn failing_reads() -> Self {
        CountingAdapter {
            fail_reads: true,
            ..CountingAdapter::default()
        }
    }

    /// Every write fails; `picked` answers the user's open pick.
    fn failing_writes(picked: Option<Vec<u8>>) -> Self {
        CountingAdapter {
            fail_writes: true,
            picked,
            ..CountingAdapter::default()
        }
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn stored(&self) -> Option<Vec<u8>> {
        self.bytes.lock().await.clone()
    }
}

#[async_trait]
impl StorageAdapter for CountingAdapter {
    async fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(StorageError::Unavailable("disk on fire".to_string()));
        }
        Ok(self.bytes.lock().await.clone())
    }

    async fn write(&self, bytes: &[u8]) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        *self.bytes.lock().await = Some(bytes.to_vec());
        Ok(())
    }

    async fn pick_and_read(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.picked.clone())
    }

    async fn pick_and_write(&self, _bytes: &[u8]) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn identity(&self) -> StorageIdentity {
        StorageIdentity {
            mode: StorageMode::ObjectStore,
            location: "memory/database".to_string(),
        }
    }
}

/// Legacy source that counts lookups.
struct CountingLegacy {
    inner: MemoryLegacyStore,
    gets: AtomicUsize,
}

impl CountingLegacy {
    fn new(inner: MemoryLegacyStore) -> Self {
        CountingLegacy {
            inner,
            gets: AtomicUsize::new(0),
        }
    }

    fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

impl LegacyStore for CountingLegacy {
    fn get(&self, key: &str) -> Option<String> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }
}

fn controller_on(adapter: Arc<CountingAdapter>) -> LifecycleController {
    LifecycleController::new(adapter, DbConfig::default())
}

fn customer(name: &str) -> Customer {
    Customer::new(name).unwrap()
}

fn sample_invoice(number: &str, company_id: Option<&str>) -> Invoice {
    let mut invoice = Invoice::new(number, company_id.map(str::to_string)).unwrap();
    invoice.items = vec![
        LineItem::new(1, "Ball Valve", 2.0, 100.0).with_discount(10.0),
        LineItem::new(2, "PVC Pipe", 3.5, 42.25),
    ];
    invoice.apply_totals();
    invoice
}

async fn names(db: &Database) -> Vec<String> {
    db.customers()
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect()
}

// =============================================================================
// Snapshots
// =============================================================================

#[tokio::test]
async fn test_export_then_import_reproduces_every_record() {
    let source = controller_on(Arc::new(CountingAdapter::default()));
    let db = source.initialize().await.unwrap();

    let mut product = Product::new("Hex Bolt M8", 2.5, "Nos").unwrap();
    product.stock = 40.0;
    product.add_batch("B0001", 40.0).mfg_date = "2024-01-15".to_string();

    let mut quotation = Quotation::new("QT-7", None).unwrap();
    quotation.items = vec![LineItem::new(1, "Gate Valve", 1.0, 850.0)];
    quotation.apply_totals();

    db.customers().save(&customer("Sharma Works")).await.unwrap();
    db.customers().save(&customer("Patel Stores")).await.unwrap();
    db.products().save(&product).await.unwrap();
    db.invoices().save(&sample_invoice("1", None)).await.unwrap();
    db.quotations().save(&quotation).await.unwrap();

    let bytes = source.export_bytes().await.unwrap().unwrap();

    let target = controller_on(Arc::new(CountingAdapter::default()));
    target.initialize().await.unwrap();
    target.import_bytes(&bytes).await.unwrap();
    let copy = target.database().await.unwrap();

    assert_eq!(
        copy.customers().get_all().await.unwrap(),
        db.customers().get_all().await.unwrap()
    );
    assert_eq!(
        copy.products().get_all().await.unwrap(),
        db.products().get_all().await.unwrap()
    );
    assert_eq!(
        copy.invoices().get_all().await.unwrap(),
        db.invoices().get_all().await.unwrap()
    );
    assert_eq!(
        copy.quotations().get_all().await.unwrap(),
        db.quotations().get_all().await.unwrap()
    );

    let invoice = &copy.invoices().get_all().await.unwrap()[0];
    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.taxes.len(), 2);
}

#[tokio::test]
async fn test_import_replaces_and_never_merges() {
    let adapter = Arc::new(CountingAdapter::default());
    let controller = controller_on(adapter.clone());
    let db = controller.initialize().await.unwrap();
    db.customers().save(&customer("Old One")).await.unwrap();
    db.customers().save(&customer("Old Two")).await.unwrap();

    let other = Database::open_empty(&DbConfig::default()).await.unwrap();
    other.customers().save(&customer("Imported")).await.unwrap();
    let bytes = other.to_bytes().await.unwrap();

    let writes_before = adapter.writes();
    assert!(controller.import_bytes(&bytes).await.unwrap());

    let live = controller.database().await.unwrap();
    assert_eq!(names(&live).await, vec!["Imported"]);
    assert_eq!(adapter.writes(), writes_before + 1);
    assert_eq!(adapter.stored().await.map(|b| b.is_empty()), Some(false));
}

#[tokio::test]
async fn test_invalid_import_keeps_previous_handle() {
    let adapter = Arc::new(CountingAdapter::default());
    let controller = controller_on(adapter.clone());
    let db = controller.initialize().await.unwrap();
    db.customers().save(&customer("Keeper")).await.unwrap();
    let writes_before = adapter.writes();

    let result = controller.import_bytes(b"definitely not a database").await;

    assert!(matches!(result, Err(DbError::InvalidSnapshot(_))));
    assert!(result.unwrap_err().is_recoverable());
    let live = controller.database().await.unwrap();
    assert_eq!(names(&live).await, vec!["Keeper"]);
    assert_eq!(adapter.writes(), writes_before);
}

#[tokio::test]
async fn test_replaced_handle_is_closed() {
    let controller = controller_on(Arc::new(CountingAdapter::default()));
    let stale = controller.initialize().await.unwrap();

    let bytes = Database::open_empty(&DbConfig::default())
        .await
        .unwrap()
        .to_bytes()
        .await
        .unwrap();
    controller.import_bytes(&bytes).await.unwrap();

    assert!(matches!(
        stale.customers().get_all().await,
        Err(DbError::NotInitialized)
    ));
}

// =============================================================================
// Initialization & Legacy Import
// =============================================================================

#[tokio::test]
async fn test_migration_runs_once_with_one_write() {
    let mut legacy = MemoryLegacyStore::new();
    legacy
        .insert_records("customers", &[customer("Legacy Customer")])
        .unwrap();
    let legacy = Arc::new(CountingLegacy::new(legacy));

    let adapter = Arc::new(CountingAdapter::default());
    let controller = controller_on(adapter.clone()).with_legacy(legacy.clone());

    let db = controller.initialize().await.unwrap();
    assert_eq!(names(&db).await, vec!["Legacy Customer"]);
    assert_eq!(adapter.writes(), 1);
    assert_eq!(legacy.gets(), bizbooks_db::migrations::LEGACY_KEYS.len());

    controller.initialize().await.unwrap();
    assert_eq!(adapter.writes(), 1);
    assert_eq!(legacy.gets(), bizbooks_db::migrations::LEGACY_KEYS.len());
}

#[tokio::test]
async fn test_stored_database_skips_migration() {
    let adapter = Arc::new(CountingAdapter::default());
    let first = controller_on(adapter.clone());
    first
        .initialize()
        .await
        .unwrap()
        .customers()
        .save(&customer("Persisted"))
        .await
        .unwrap();
    assert!(first.save().await);

    let legacy = Arc::new(CountingLegacy::new(MemoryLegacyStore::new()));
    let second = controller_on(adapter.clone()).with_legacy(legacy.clone());
    let db = second.initialize().await.unwrap();

    assert_eq!(names(&db).await, vec!["Persisted"]);
    assert_eq!(legacy.gets(), 0);
    assert_eq!(adapter.writes(), 2);
}

#[tokio::test]
async fn test_corrupt_stored_bytes_start_fresh() {
    let adapter = Arc::new(CountingAdapter::with_bytes(b"garbage".to_vec()));
    let controller = controller_on(adapter.clone());

    let db = controller.initialize().await.unwrap();

    assert_eq!(db.customers().count().await.unwrap(), 0);
    assert_eq!(adapter.writes(), 1);
}

#[tokio::test]
async fn test_read_failure_starts_fresh() {
    let adapter = Arc::new(CountingAdapter::failing_reads());
    let controller = controller_on(adapter.clone());

    let db = controller.initialize().await.unwrap();

    assert!(db.health_check().await);
    assert_eq!(adapter.reads.load(Ordering::SeqCst), 1);
    assert_eq!(adapter.writes(), 1);
}

// =============================================================================
// Repositories
// =============================================================================

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let db = Database::open_empty(&DbConfig::default()).await.unwrap();
    let first = customer("Noor Pumps");
    let second = customer("Krishna Fabricators");

    db.customers().save(&first).await.unwrap();
    db.customers().save(&second).await.unwrap();
    let before = db.customers().get_all().await.unwrap();

    db.customers().save(&first).await.unwrap();
    assert_eq!(db.customers().get_all().await.unwrap(), before);

    // Overwrite keeps storage order.
    let mut renamed = first.clone();
    renamed.name = "Noor Pumps & Motors".to_string();
    db.customers().save(&renamed).await.unwrap();
    assert_eq!(names(&db).await, vec!["Noor Pumps & Motors", "Krishna Fabricators"]);
}

#[tokio::test]
async fn test_stock_follows_movements_in_order() {
    let db = Database::open_empty(&DbConfig::default()).await.unwrap();
    let mut product = Product::new("Cutting Oil", 180.0, "Ltr").unwrap();
    product.stock = 10.0;
    db.products().save(&product).await.unwrap();

    let received = InventoryTransaction::new(&product, MovementType::In, 5.0, "GRN-1").unwrap();
    let issued = InventoryTransaction::new(&product, MovementType::Out, 3.0, "1").unwrap();
    assert!(db.inventory().record_transaction(&received).await.unwrap());
    assert!(db.inventory().record_transaction(&issued).await.unwrap());

    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock, 12.0);
    assert_eq!(db.inventory().list_for_product(&product.id).await.unwrap().len(), 2);

    // Negative stock is kept.
    let big = InventoryTransaction::new(&product, MovementType::Out, 20.0, "2").unwrap();
    db.inventory().record_transaction(&big).await.unwrap();
    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock, -8.0);
}

#[tokio::test]
async fn test_movement_for_missing_product_is_still_recorded() {
    let db = Database::open_empty(&DbConfig::default()).await.unwrap();
    let ghost = Product::new("Deleted Item", 1.0, "Nos").unwrap();
    let movement = InventoryTransaction::new(&ghost, MovementType::In, 4.0, "GRN-9").unwrap();

    assert!(!db.inventory().record_transaction(&movement).await.unwrap());
    assert_eq!(db.inventory().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_failed_writes_keep_the_session_usable() {
    let adapter = Arc::new(CountingAdapter::failing_writes(None));
    let controller = controller_on(adapter.clone());

    let db = controller.initialize().await.unwrap();
    assert_eq!(adapter.writes(), 1);
    assert!(adapter.stored().await.is_none());

    db.customers().save(&customer("Unsaved")).await.unwrap();
    assert!(!controller.save().await);
    assert_eq!(adapter.writes(), 2);

    let live = controller.database().await.unwrap();
    assert!(live.health_check().await);
    assert_eq!(names(&live).await, vec!["Unsaved".to_string()]);
    drop(live);

    let other = Database::open_empty(&DbConfig::default()).await.unwrap();
    other.customers().save(&customer("Imported")).await.unwrap();
    let bytes = other.to_bytes().await.unwrap();

    assert!(!controller.import_bytes(&bytes).await.unwrap());
    let live = controller.database().await.unwrap();
    assert_eq!(names(&live).await, vec!["Imported".to_string()]);
}

#[tokio::test]
async fn test_user_import_reports_unsaved_result() {
    let source = Database::open_empty(&DbConfig::default()).await.unwrap();
    source.customers().save(&customer("Picked")).await.unwrap();
    let bytes = source.to_bytes().await.unwrap();

    let adapter = Arc::new(CountingAdapter::failing_writes(Some(bytes)));
    let controller = controller_on(adapter.clone());
    controller.initialize().await.unwrap();

    assert_eq!(
        controller.import_from_user().await.unwrap(),
        UserImport::Imported { saved: false }
    );
    let live = controller.database().await.unwrap();
    assert_eq!(names(&live).await, vec!["Picked".to_string()]);
}

#[tokio::test]
async fn test_unknown_document_status_keeps_listing() {
    let db = Database::open_empty(&DbConfig::default()).await.unwrap();
    let paid = {
        let mut invoice = sample_invoice("1", None);
        invoice.status = InvoiceStatus::Paid;
        invoice
    };
    let odd = sample_invoice("2", None);
    db.invoices().save(&paid).await.unwrap();
    db.invoices().save(&odd).await.unwrap();

    sqlx::query("UPDATE invoices SET status = 'cancelled' WHERE id = ?1")
        .bind(&odd.id)
        .execute(db.pool())
        .await
        .unwrap();

    let all = db.invoices().get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].status, InvoiceStatus::Paid);
    assert_eq!(all[1].status, InvoiceStatus::Draft);
    assert_eq!(all[1].invoice_number, "2");
}

#[tokio::test]
async fn test_malformed_blob_returns_record_with_empty_lists() {
    let db = Database::open_empty(&DbConfig::default()).await.unwrap();
    let good = sample_invoice("1", None);
    let broken = sample_invoice("2", None);
    db.invoices().save(&good).await.unwrap();
    db.invoices().save(&broken).await.unwrap();

    sqlx::query("UPDATE invoices SET items = '{not json', taxes = '42' WHERE id = ?1")
        .bind(&broken.id)
        .execute(db.pool())
        .await
        .unwrap();

    let all = db.invoices().get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].items.len(), 2);
    assert!(all[1].items.is_empty());
    assert!(all[1].taxes.is_empty());
    assert_eq!(all[1].total, broken.total);
}

#[tokio::test]
async fn test_next_number_scans_existing_documents() {
    let db = Database::open_empty(&DbConfig::default()).await.unwrap();

    assert_eq!(db.invoices().next_number(None).await.unwrap(), "1");
    assert_eq!(db.quotations().next_number(None).await.unwrap(), "QT-1");
    assert_eq!(db.challans().next_number(None).await.unwrap(), "DC-1");

    for number in ["1", "3", "abc", "5"] {
        db.invoices()
            .save(&sample_invoice(number, Some("c1")))
            .await
            .unwrap();
    }
    db.invoices()
        .save(&sample_invoice("99", Some("c2")))
        .await
        .unwrap();

    assert_eq!(db.invoices().next_number(Some("c1")).await.unwrap(), "6");
    assert_eq!(db.invoices().next_number(Some("c3")).await.unwrap(), "1");
    assert_eq!(db.invoices().next_number(None).await.unwrap(), "100");
    assert_eq!(db.invoices().list_for_company("c1").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_product_delete_cascades_to_batches() {
    let db = Database::open_empty(&DbConfig::default()).await.unwrap();
    let mut kept = Product::new("Gear Oil 90", 210.0, "Ltr").unwrap();
    kept.add_batch("G1", 5.0);
    let mut doomed = Product::new("Hex Nut M8", 1.2, "Nos").unwrap();
    doomed.add_batch("N1", 100.0);
    doomed.add_batch("N2", 50.0);

    db.products().save(&kept).await.unwrap();
    db.products().save(&doomed).await.unwrap();

    assert!(db.products().delete_by_id(&doomed.id).await.unwrap());
    assert!(!db.products().delete_by_id(&doomed.id).await.unwrap());

    let counts = db.table_counts().await.unwrap();
    let batches = counts
        .iter()
        .find(|(table, _)| table == "product_batches")
        .map(|(_, n)| *n);
    assert_eq!(batches, Some(1));
    assert_eq!(db.products().get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_saving_product_replaces_its_batches() {
    let db = Database::open_empty(&DbConfig::default()).await.unwrap();
    let mut product = Product::new("Braided Hose", 95.0, "Mtr").unwrap();
    product.add_batch("H1", 10.0);
    product.add_batch("H2", 20.0);
    db.products().save(&product).await.unwrap();

    product.batches.remove(0);
    db.products().save(&product).await.unwrap();

    let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
    assert_eq!(stored.batches.len(), 1);
    assert_eq!(stored.batches[0].batch_number, "H2");
}

// =============================================================================
// Native File & User Picks
// =============================================================================

#[tokio::test]
async fn test_native_file_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bizbooks.db");

    let first = LifecycleController::new(
        Arc::new(NativeFileAdapter::new(&path, Arc::new(PresetDialogs::default()))),
        DbConfig::default(),
    );
    let db = first.initialize().await.unwrap();
    db.customers().save(&customer("On Disk")).await.unwrap();
    assert!(first.save().await);
    first.shutdown().await;

    let second = LifecycleController::new(
        Arc::new(NativeFileAdapter::new(&path, Arc::new(PresetDialogs::default()))),
        DbConfig::default(),
    );
    let db = second.initialize().await.unwrap();
    assert_eq!(names(&db).await, vec!["On Disk"]);
    assert_eq!(second.identity().mode, StorageMode::NativeFile);
}

#[tokio::test]
async fn test_user_export_and_import_through_dialogs() {
    let dir = tempfile::tempdir().unwrap();

    let exporter = LifecycleController::new(
        Arc::new(NativeFileAdapter::new(
            dir.path().join("a.db"),
            Arc::new(PresetDialogs::save(dir.path())),
        )),
        DbConfig::default(),
    );
    exporter
        .initialize()
        .await
        .unwrap()
        .customers()
        .save(&customer("Exported"))
        .await
        .unwrap();
    let location = exporter.export_to_user().await.unwrap().unwrap();
    assert!(location.contains("bizbooks-backup-"));

    let importer = LifecycleController::new(
        Arc::new(NativeFileAdapter::new(
            dir.path().join("b.db"),
            Arc::new(PresetDialogs::open(&location)),
        )),
        DbConfig::default(),
    );
    importer.initialize().await.unwrap();
    assert_eq!(
        importer.import_from_user().await.unwrap(),
        UserImport::Imported { saved: true }
    );

    let live = importer.database().await.unwrap();
    assert_eq!(names(&live).await, vec!["Exported"]);
    assert!(dir.path().join("b.db").exists());
}

#[tokio::test]
async fn test_cancelled_picks_change_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let controller = LifecycleController::new(
        Arc::new(NativeFileAdapter::new(
            dir.path().join("bizbooks.db"),
            Arc::new(PresetDialogs::default()),
        )),
        DbConfig::default(),
    );

    assert!(matches!(
        controller.export_to_user().await,
        Err(DbError::NotInitialized)
    ));

    controller.initialize().await.unwrap();
    assert_eq!(controller.export_to_user().await.unwrap(), None);
    assert_eq!(
        controller.import_from_user().await.unwrap(),
        UserImport::Cancelled
    );
}
