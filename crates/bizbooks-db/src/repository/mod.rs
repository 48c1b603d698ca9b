//! # Repository Module
//!
//! Typed read/write/delete per entity over the live engine handle.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Uniform Repository Contract                          │
//! │                                                                         │
//! │  Host command                                                          │
//! │       │                                                                 │
//! │       │  controller.database().await?.customers().get_all()            │
//! │       ▼                                                                 │
//! │  Table<Customer>                                                       │
//! │  ├── get_all()        rows in storage (rowid) order                    │
//! │  ├── get_by_id(id)                                                     │
//! │  ├── save(record)     upsert by id, full overwrite                     │
//! │  ├── delete_by_id(id)                                                  │
//! │  └── count()                                                           │
//! │       │                                                                 │
//! │       │  Record::bind_columns / Record::decode_row                     │
//! │       ▼                                                                 │
//! │  In-memory SQLite                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `save` never flushes to storage. Callers decide when to invoke
//! `LifecycleController::save`.
//!
//! ## Available Repositories
//!
//! - [`CompanyRepository`] - companies plus default/selected resolution
//! - [`CustomerRepository`] - customers
//! - [`ProductRepository`] - products with their batch child rows
//! - [`InvoiceRepository`], [`QuotationRepository`], [`ChallanRepository`] -
//!   documents with embedded items/taxes and next-number computation
//! - [`VoucherRepository`] - vouchers
//! - [`InventoryRepository`] - stock movements that keep product stock in step

pub mod company;
pub mod customer;
pub mod document;
pub mod embedded;
pub mod inventory;
pub mod product;
pub mod voucher;

pub use company::CompanyRepository;
pub use customer::CustomerRepository;
pub use document::{ChallanRepository, InvoiceRepository, QuotationRepository};
pub use inventory::InventoryRepository;
pub use product::ProductRepository;
pub use voucher::VoucherRepository;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

use crate::error::DbResult;
use crate::schema::quote_ident;

/// A query with positional arguments, as built by [`Record::bind_columns`].
pub type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

// =============================================================================
// Record Mapping
// =============================================================================

/// Mapping between an entity and its table row.
///
/// `bind_columns` must bind values in exactly the order of `COLUMNS`, and
/// `COLUMNS` must start with `id`.
pub trait Record: Sized + Send + Sync + Unpin {
    /// Entity name used in logs and NotFound errors.
    const ENTITY: &'static str;
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> DbResult<SqliteQuery<'q>>;

    fn decode_row(row: &SqliteRow) -> DbResult<Self>;
}

/// Anything that can upsert records of type `T`.
///
/// Used by the legacy import, which writes every entity the same way.
#[async_trait]
pub trait RecordWriter<T: Sync>: Send + Sync {
    async fn save(&self, record: &T) -> DbResult<()>;
}

// =============================================================================
// SQL Builders
// =============================================================================

/// `INSERT ... ON CONFLICT(id) DO UPDATE` over every column.
///
/// Updating in place keeps the row's rowid, so storage order survives
/// overwrites.
pub(crate) fn upsert_sql(table: &str, columns: &[&str]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    let updates: Vec<String> = names
        .iter()
        .filter(|name| name.as_str() != "\"id\"")
        .map(|name| format!("{name} = excluded.{name}"))
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(\"id\") DO UPDATE SET {}",
        quote_ident(table),
        names.join(", "),
        placeholders.join(", "),
        updates.join(", ")
    )
}

/// `SELECT <columns> FROM <table>` without a WHERE clause.
pub(crate) fn select_sql(table: &str, columns: &[&str]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    format!("SELECT {} FROM {}", names.join(", "), quote_ident(table))
}

// =============================================================================
// Generic Table
// =============================================================================

/// Generic repository over one table.
///
/// Holds a clone of the engine's pool; borrow a fresh one per call from the
/// controller rather than keeping it across an import.
pub struct Table<T> {
    pool: SqlitePool,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Table {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table").field("table", &T::TABLE).finish()
    }
}

impl<T: Record> Table<T> {
    pub fn new(pool: SqlitePool) -> Self {
        Table {
            pool,
            _record: PhantomData,
        }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Every row, in storage order.
    pub async fn get_all(&self) -> DbResult<Vec<T>> {
        let sql = format!("{} ORDER BY rowid", select_sql(T::TABLE, T::COLUMNS));
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let records = rows.iter().map(T::decode_row).collect::<DbResult<Vec<T>>>()?;

        debug!(table = T::TABLE, count = records.len(), "Loaded records");
        Ok(records)
    }

    /// Gets a record by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(T))` - Record found
    /// * `Ok(None)` - No row with that id
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<T>> {
        let sql = format!("{} WHERE \"id\" = ?1", select_sql(T::TABLE, T::COLUMNS));
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(T::decode_row).transpose()
    }

    /// Rows whose `column` equals `value`, in storage order.
    pub(crate) async fn list_where(&self, column: &str, value: &str) -> DbResult<Vec<T>> {
        let sql = format!(
            "{} WHERE {} = ?1 ORDER BY rowid",
            select_sql(T::TABLE, T::COLUMNS),
            quote_ident(column)
        );
        let rows = sqlx::query(&sql).bind(value).fetch_all(&self.pool).await?;
        rows.iter().map(T::decode_row).collect()
    }

    /// Text values of one column, optionally filtered by another.
    pub(crate) async fn column_values(
        &self,
        column: &str,
        filter: Option<(&str, &str)>,
    ) -> DbResult<Vec<String>> {
        let mut sql = format!("SELECT {} FROM {}", quote_ident(column), quote_ident(T::TABLE));
        if let Some((filter_column, _)) = filter {
            sql.push_str(&format!(" WHERE {} = ?1", quote_ident(filter_column)));
        }

        let mut query = sqlx::query_scalar::<_, Option<String>>(&sql);
        if let Some((_, value)) = filter {
            query = query.bind(value);
        }

        let values = query.fetch_all(&self.pool).await?;
        Ok(values.into_iter().flatten().collect())
    }

    /// Upserts by id: inserts when absent, overwrites every column when present.
    pub async fn save(&self, record: &T) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::upsert_on(record, &mut conn).await
    }

    /// Upsert on an explicit connection (or transaction).
    pub(crate) async fn upsert_on(record: &T, conn: &mut SqliteConnection) -> DbResult<()> {
        debug!(table = T::TABLE, id = %record.id(), "Upserting record");

        let sql = upsert_sql(T::TABLE, T::COLUMNS);
        let query = record.bind_columns(sqlx::query(&sql))?;
        query.execute(&mut *conn).await?;
        Ok(())
    }

    /// Removes the row. Returns whether a row existed.
    pub async fn delete_by_id(&self, id: &str) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        Self::delete_on(id, &mut conn).await
    }

    pub(crate) async fn delete_on(id: &str, conn: &mut SqliteConnection) -> DbResult<bool> {
        debug!(table = T::TABLE, id = %id, "Deleting record");

        let sql = format!("DELETE FROM {} WHERE \"id\" = ?1", quote_ident(T::TABLE));
        let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Counts rows (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(T::TABLE));
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[async_trait]
impl<T: Record> RecordWriter<T> for Table<T> {
    async fn save(&self, record: &T) -> DbResult<()> {
        Table::save(self, record).await
    }
}
