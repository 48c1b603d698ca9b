//! # Inventory Repository
//!
//! Stock movements and the product stock they drive.
//!
//! ## Recording A Movement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 record_transaction(tx)  (one transaction)               │
//! │                                                                         │
//! │  1. UPSERT inventory_transactions (tx)                                 │
//! │  2. UPDATE products SET stock = stock ± quantity WHERE id = productId  │
//! │       │                                                                 │
//! │       ├── product exists  → stock adjusted                             │
//! │       └── product missing → no-op, movement row still kept             │
//! │  3. COMMIT                                                             │
//! │                                                                         │
//! │  The engine has a single connection, so no other caller can observe   │
//! │  the movement without the stock change.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;
use crate::repository::{Record, RecordWriter, SqliteQuery, Table};
use crate::schema;
use bizbooks_core::InventoryTransaction;

impl Record for InventoryTransaction {
    const ENTITY: &'static str = "InventoryTransaction";
    const TABLE: &'static str = schema::INVENTORY;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "product_id",
        "product_name",
        "movement_type",
        "quantity",
        "date",
        "reference",
        "notes",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> DbResult<SqliteQuery<'q>> {
        Ok(query
            .bind(&self.id)
            .bind(&self.product_id)
            .bind(&self.product_name)
            .bind(self.movement_type)
            .bind(self.quantity)
            .bind(&self.date)
            .bind(&self.reference)
            .bind(&self.notes)
            .bind(self.created_at))
    }

    fn decode_row(row: &SqliteRow) -> DbResult<Self> {
        <InventoryTransaction as sqlx::FromRow<'_, SqliteRow>>::from_row(row).map_err(DbError::from)
    }
}

/// Repository for stock movements.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    transactions: Table<InventoryTransaction>,
}

impl InventoryRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        InventoryRepository {
            transactions: Table::new(pool),
        }
    }

    /// Saves the movement and applies it to the product's stock.
    ///
    /// ## Returns
    /// * `Ok(true)` - movement saved, stock adjusted
    /// * `Ok(false)` - movement saved, product missing so stock untouched
    ///
    /// Calling this twice with the same movement adjusts stock twice; use
    /// [`InventoryRepository::save`] to edit a movement without touching stock.
    pub async fn record_transaction(&self, tx: &InventoryTransaction) -> DbResult<bool> {
        let mut db_tx = self.transactions.pool().begin().await?;

        Table::<InventoryTransaction>::upsert_on(tx, &mut db_tx).await?;
        let adjusted =
            ProductRepository::adjust_stock_on(&tx.product_id, tx.stock_delta(), &mut db_tx).await?;

        db_tx.commit().await?;

        if adjusted {
            debug!(
                product_id = %tx.product_id,
                movement = %tx.movement_type,
                quantity = tx.quantity,
                "Recorded stock movement"
            );
        } else {
            warn!(
                product_id = %tx.product_id,
                id = %tx.id,
                "Stock movement references a missing product, stock not adjusted"
            );
        }

        Ok(adjusted)
    }

    /// Every movement, in storage order.
    pub async fn get_all(&self) -> DbResult<Vec<InventoryTransaction>> {
        self.transactions.get_all().await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryTransaction>> {
        self.transactions.get_by_id(id).await
    }

    /// Movements of one product, in storage order.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<InventoryTransaction>> {
        self.transactions.list_where("product_id", product_id).await
    }

    /// Upserts the movement row only. Stock is not touched.
    pub async fn save(&self, tx: &InventoryTransaction) -> DbResult<()> {
        self.transactions.save(tx).await
    }

    /// Removes the movement row. Stock is not reverted.
    pub async fn delete_by_id(&self, id: &str) -> DbResult<bool> {
        self.transactions.delete_by_id(id).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        self.transactions.count().await
    }
}

/// Legacy rows already carry their effect in the product's stock, so the
/// import writes movements without re-applying them.
#[async_trait]
impl RecordWriter<InventoryTransaction> for InventoryRepository {
    async fn save(&self, record: &InventoryTransaction) -> DbResult<()> {
        InventoryRepository::save(self, record).await
    }
}
