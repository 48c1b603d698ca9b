//! # Product Repository
//!
//! Database operations for products and their batches.
//!
//! ## Batches As Child Rows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    save(product)  (one transaction)                     │
//! │                                                                         │
//! │  1. UPSERT products         (id, name, rate, stock, ...)                │
//! │  2. DELETE product_batches WHERE product_id = ?                        │
//! │  3. INSERT product_batches  one row per product.batches[i]             │
//! │                                                                         │
//! │  The batch list on the record is the whole truth: batches removed      │
//! │  from it disappear, new ones appear.                                   │
//! │                                                                         │
//! │                    delete_by_id(id)  (one transaction)                  │
//! │                                                                         │
//! │  DELETE product_batches WHERE product_id = ?   ← cascade               │
//! │  DELETE products WHERE id = ?                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock
//! `stock` is changed with a delta update (`stock = stock + ?`), never by
//! writing an absolute value read earlier. Inventory movements go through
//! [`ProductRepository::adjust_stock`] or its transactional twin.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{Record, RecordWriter, SqliteQuery, Table};
use crate::schema;
use bizbooks_core::{Product, ProductBatch};

impl Record for Product {
    const ENTITY: &'static str = "Product";
    const TABLE: &'static str = schema::PRODUCTS;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "hsn_sac",
        "rate",
        "unit",
        "stock",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> DbResult<SqliteQuery<'q>> {
        Ok(query
            .bind(&self.id)
            .bind(&self.name)
            .bind(&self.description)
            .bind(&self.hsn_sac)
            .bind(self.rate)
            .bind(&self.unit)
            .bind(self.stock)
            .bind(self.created_at))
    }

    fn decode_row(row: &SqliteRow) -> DbResult<Self> {
        <Product as sqlx::FromRow<'_, SqliteRow>>::from_row(row).map_err(DbError::from)
    }
}

impl Record for ProductBatch {
    const ENTITY: &'static str = "ProductBatch";
    const TABLE: &'static str = schema::PRODUCT_BATCHES;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "product_id",
        "batch_number",
        "mfg_date",
        "quantity",
        "expiry_date",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> DbResult<SqliteQuery<'q>> {
        Ok(query
            .bind(&self.id)
            .bind(&self.product_id)
            .bind(&self.batch_number)
            .bind(&self.mfg_date)
            .bind(self.quantity)
            .bind(&self.expiry_date))
    }

    fn decode_row(row: &SqliteRow) -> DbResult<Self> {
        <ProductBatch as sqlx::FromRow<'_, SqliteRow>>::from_row(row).map_err(DbError::from)
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let mut product = Product::new("Steel Bolt", 2.5, "Nos")?;
/// product.add_batch("B-1", 100.0);
/// repo.save(&product).await?;
///
/// repo.adjust_stock(&product.id, -3.0).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    products: Table<Product>,
    batches: Table<ProductBatch>,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository {
            products: Table::new(pool.clone()),
            batches: Table::new(pool),
        }
    }

    /// Every product with its batches, in storage order.
    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        let mut products = self.products.get_all().await?;

        let mut by_product: HashMap<String, Vec<ProductBatch>> = HashMap::new();
        for batch in self.batches.get_all().await? {
            by_product.entry(batch.product_id.clone()).or_default().push(batch);
        }

        for product in &mut products {
            product.batches = by_product.remove(&product.id).unwrap_or_default();
        }

        if !by_product.is_empty() {
            debug!(orphans = by_product.len(), "Batches without a product ignored");
        }

        Ok(products)
    }

    /// Gets a product (with batches) by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let Some(mut product) = self.products.get_by_id(id).await? else {
            return Ok(None);
        };
        product.batches = self.batches.list_where("product_id", id).await?;
        Ok(Some(product))
    }

    /// Upserts the product and replaces its batch rows.
    ///
    /// Batches are re-parented to `product.id`; a batch without an id gets one.
    pub async fn save(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, batches = product.batches.len(), "Saving product");

        let mut tx = self.products.pool().begin().await?;

        Table::<Product>::upsert_on(product, &mut tx).await?;

        sqlx::query("DELETE FROM product_batches WHERE product_id = ?1")
            .bind(&product.id)
            .execute(&mut *tx)
            .await?;

        for batch in &product.batches {
            let mut batch = batch.clone();
            batch.product_id = product.id.clone();
            if batch.id.trim().is_empty() {
                batch.id = bizbooks_core::new_id();
            }
            Table::<ProductBatch>::upsert_on(&batch, &mut tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deletes the product together with its batches.
    ///
    /// Returns whether the product existed.
    pub async fn delete_by_id(&self, id: &str) -> DbResult<bool> {
        let mut tx = self.products.pool().begin().await?;

        let batches = sqlx::query("DELETE FROM product_batches WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let existed = Table::<Product>::delete_on(id, &mut tx).await?;

        tx.commit().await?;

        debug!(id = %id, batches = batches, existed = existed, "Deleted product");
        Ok(existed)
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        self.products.count().await
    }

    /// Applies a signed stock change.
    ///
    /// ## Returns
    /// * `Ok(true)` - stock updated
    /// * `Ok(false)` - no such product; nothing changed
    ///
    /// Negative results are kept, not clamped.
    pub async fn adjust_stock(&self, id: &str, delta: f64) -> DbResult<bool> {
        let mut conn = self.products.pool().acquire().await?;
        Self::adjust_stock_on(id, delta, &mut conn).await
    }

    pub(crate) async fn adjust_stock_on(
        id: &str,
        delta: f64,
        conn: &mut SqliteConnection,
    ) -> DbResult<bool> {
        debug!(id = %id, delta = delta, "Adjusting stock");

        let result = sqlx::query("UPDATE products SET stock = COALESCE(stock, 0) + ?2 WHERE id = ?1")
            .bind(id)
            .bind(delta)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecordWriter<Product> for ProductRepository {
    async fn save(&self, record: &Product) -> DbResult<()> {
        ProductRepository::save(self, record).await
    }
}
