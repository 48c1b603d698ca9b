//! # Embedded Engine
//!
//! One private SQLite database, loaded and exported as a whole.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Snapshot-Based Engine                              │
//! │                                                                         │
//! │  Database::open_empty(config)     fresh schema, no rows                │
//! │  Database::from_bytes(bytes)      snapshot ──► new private engine      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │  SqlitePool (max 1 connection)          │                           │
//! │  │  ┌───────────────────────────────────┐  │                           │
//! │  │  │ Conn ── <tempdir>/engine.db        │  │  never idles out,        │
//! │  │  └───────────────────────────────────┘  │  never recycled          │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.to_bytes()   VACUUM INTO <scratch>/snapshot.db ──► Vec<u8>         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Engine File
//! The engine's pages live in a file inside a private temp directory that is
//! removed with the last clone of the handle. It is scratch space, never the
//! durable copy: storage only ever sees bytes from [`Database::to_bytes`].
//! The engine must not be a `sqlite::memory:` connection: SQLite opens every
//! `ATTACH` and `VACUUM INTO` target of one in memory as well.
//!
//! ## Loading A Snapshot
//! SQLite cannot open a byte buffer directly through sqlx, so `from_bytes`
//! writes the bytes to a scratch file, `ATTACH`es it, checks it with
//! `quick_check`, and copies every table into a fresh engine. Columns present
//! in both schemas are copied; tables unknown to this build are recreated
//! from the snapshot's own DDL. A buffer that is not a SQLite database fails
//! before any handle is returned.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Connection, SqliteConnection, SqlitePool};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{
    ChallanRepository, CompanyRepository, CustomerRepository, InventoryRepository,
    InvoiceRepository, ProductRepository, QuotationRepository, Table, VoucherRepository,
};
use crate::schema::{self, quote_ident, quote_literal};

/// First 16 bytes of every SQLite database file.
pub const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Size of the SQLite file header; nothing shorter is a database.
const HEADER_LEN: usize = 100;

const ENGINE_FILE: &str = "engine.db";

// =============================================================================
// Configuration
// =============================================================================

/// Engine configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new()
///     .connect_timeout(Duration::from_secs(5))
///     .scratch_dir("/var/tmp/bizbooks");
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Where snapshot scratch files go. `None` uses the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            connect_timeout: Duration::from_secs(30),
            scratch_dir: None,
        }
    }
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the scratch directory for snapshot files.
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    fn scratch(&self) -> DbResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("bizbooks-");
        let dir = match &self.scratch_dir {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };
        dir.map_err(|e| DbError::Internal(format!("cannot create scratch dir: {}", e)))
    }
}

// =============================================================================
// Database
// =============================================================================

/// A live database.
///
/// Cloning is cheap and shares the same engine. Handles are owned by the
/// [`crate::LifecycleController`]; repositories borrow one per call.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    config: DbConfig,
    // Holds the engine file; deleted when the last clone drops.
    _files: Arc<TempDir>,
}

impl Database {
    /// Starts an empty engine with the schema applied.
    ///
    /// ## Errors
    /// `DbError::EngineUnavailable` if the engine cannot start. Nothing else
    /// can be done with the process at that point.
    pub async fn open_empty(config: &DbConfig) -> DbResult<Self> {
        let db = Self::connect(config).await?;
        schema::create_tables(&db.pool)
            .await
            .map_err(|e| DbError::EngineUnavailable(format!("schema creation failed: {}", e)))?;

        info!("Opened empty database");
        Ok(db)
    }

    /// Builds a new engine from a snapshot produced by [`Database::to_bytes`].
    ///
    /// ## Errors
    /// `DbError::InvalidSnapshot` when `bytes` is not a readable SQLite
    /// database. No engine is left behind in that case.
    pub async fn from_bytes(bytes: &[u8], config: &DbConfig) -> DbResult<Self> {
        if bytes.len() < HEADER_LEN || !bytes.starts_with(SQLITE_HEADER) {
            return Err(DbError::InvalidSnapshot(
                "missing SQLite header".to_string(),
            ));
        }

        let scratch = config.scratch()?;
        let path = scratch.path().join("import.db");
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DbError::Internal(format!("cannot stage snapshot: {}", e)))?;

        let db = Self::open_empty(config).await?;

        let copied = match db.pool.acquire().await {
            Ok(mut conn) => copy_snapshot(&mut conn, &path.to_string_lossy()).await,
            Err(e) => {
                db.close().await;
                return Err(e.into());
            }
        };

        match copied {
            Ok(tables) => {
                info!(bytes = bytes.len(), tables = tables, "Loaded database snapshot");
                Ok(db)
            }
            Err(e) => {
                db.close().await;
                Err(match e {
                    DbError::InvalidSnapshot(_) => e,
                    other => DbError::InvalidSnapshot(other.to_string()),
                })
            }
        }
    }

    /// Serializes the whole database.
    pub async fn to_bytes(&self) -> DbResult<Vec<u8>> {
        let scratch = self.config.scratch()?;
        let path = scratch.path().join("snapshot.db");

        let sql = format!("VACUUM INTO {}", quote_literal(&path.to_string_lossy()));
        sqlx::query(&sql).persistent(false).execute(&self.pool).await?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| DbError::Internal(format!("cannot read snapshot: {}", e)))?;

        debug!(bytes = bytes.len(), "Exported database snapshot");
        Ok(bytes)
    }

    async fn connect(config: &DbConfig) -> DbResult<Self> {
        let files = config
            .scratch()
            .map_err(|e| DbError::EngineUnavailable(e.to_string()))?;

        let options = SqliteConnectOptions::new()
            .filename(files.path().join(ENGINE_FILE))
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Memory)
            .synchronous(SqliteSynchronous::Off);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::EngineUnavailable(e.to_string()))?;

        debug!(dir = %files.path().display(), "Engine file created");
        Ok(Database {
            pool,
            config: config.clone(),
            _files: Arc::new(files),
        })
    }

    /// Returns a reference to the connection pool.
    ///
    /// Prefer repository methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn companies(&self) -> CompanyRepository {
        Table::new(self.pool.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        Table::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn invoices(&self) -> InvoiceRepository {
        Table::new(self.pool.clone())
    }

    pub fn quotations(&self) -> QuotationRepository {
        Table::new(self.pool.clone())
    }

    pub fn challans(&self) -> ChallanRepository {
        Table::new(self.pool.clone())
    }

    pub fn vouchers(&self) -> VoucherRepository {
        Table::new(self.pool.clone())
    }

    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new(self.pool.clone())
    }

    /// Releases the engine. Later calls through clones of this handle fail
    /// with `DbError::NotInitialized`.
    pub async fn close(&self) {
        debug!("Closing database");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Row count of every known table, in schema order.
    pub async fn table_counts(&self) -> DbResult<Vec<(String, i64)>> {
        let mut counts = Vec::with_capacity(schema::TABLES.len());
        for table in schema::TABLES {
            let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
            let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
            counts.push((table.to_string(), count));
        }
        Ok(counts)
    }
}

// =============================================================================
// Snapshot Copy
// =============================================================================

/// Copies every table of the file at `path` into the connection's main schema.
///
/// Returns the number of tables copied.
async fn copy_snapshot(conn: &mut SqliteConnection, path: &str) -> DbResult<usize> {
    let attach = format!("ATTACH DATABASE {} AS snapshot", quote_literal(path));
    sqlx::query(&attach).persistent(false).execute(&mut *conn).await?;

    let copied = match check_snapshot(conn).await {
        Ok(()) => copy_tables(conn).await,
        Err(e) => Err(e),
    };

    if let Err(e) = sqlx::query("DETACH DATABASE snapshot")
        .persistent(false)
        .execute(&mut *conn)
        .await
    {
        warn!(error = %e, "Failed to detach snapshot");
    }

    copied
}

/// Rejects an attached file that SQLite cannot read end to end.
async fn check_snapshot(conn: &mut SqliteConnection) -> DbResult<()> {
    let problems: Vec<String> = sqlx::query_scalar("PRAGMA snapshot.quick_check")
        .persistent(false)
        .fetch_all(&mut *conn)
        .await?;

    match problems.as_slice() {
        [ok] if ok == "ok" => Ok(()),
        [] => Err(DbError::InvalidSnapshot("integrity check returned nothing".to_string())),
        [first, ..] => Err(DbError::InvalidSnapshot(first.clone())),
    }
}

async fn copy_tables(conn: &mut SqliteConnection) -> DbResult<usize> {
    let tables: Vec<(String, Option<String>)> = sqlx::query_as(
        "SELECT name, sql FROM snapshot.sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY rowid",
    )
    .persistent(false)
    .fetch_all(&mut *conn)
    .await?;

    let mut tx = conn.begin().await?;

    for (name, ddl) in &tables {
        let known: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM main.sqlite_master WHERE type = 'table' AND name = ?1",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        if known == 0 {
            let Some(ddl) = ddl else { continue };
            debug!(table = %name, "Recreating table from snapshot");
            sqlx::query(ddl).persistent(false).execute(&mut *tx).await?;
        }

        let columns: Vec<String> = sqlx::query_scalar(
            "SELECT s.name FROM pragma_table_info(?1, 'snapshot') AS s \
             WHERE s.name IN (SELECT m.name FROM pragma_table_info(?1, 'main') AS m) \
             ORDER BY s.cid",
        )
        .bind(name)
        .persistent(false)
        .fetch_all(&mut *tx)
        .await?;

        if columns.is_empty() {
            continue;
        }

        let list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let table = quote_ident(name);
        let copy = format!(
            "INSERT INTO main.{table} ({list}) SELECT {list} FROM snapshot.{table} ORDER BY rowid"
        );
        let rows = sqlx::query(&copy)
            .persistent(false)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        debug!(table = %name, rows = rows, "Copied table from snapshot");
    }

    tx.commit().await?;
    Ok(tables.len())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bizbooks_core::Customer;

    #[tokio::test]
    async fn test_open_empty_has_schema() {
        let db = Database::open_empty(&DbConfig::default()).await.unwrap();
        assert!(db.health_check().await);

        let counts = db.table_counts().await.unwrap();
        assert_eq!(counts.len(), schema::TABLES.len());
        assert!(counts.iter().all(|(_, n)| *n == 0));
    }

    #[tokio::test]
    async fn test_engines_are_independent() {
        let a = Database::open_empty(&DbConfig::default()).await.unwrap();
        let b = Database::open_empty(&DbConfig::default()).await.unwrap();

        a.customers().save(&Customer::new("Only in A").unwrap()).await.unwrap();

        assert_eq!(a.customers().count().await.unwrap(), 1);
        assert_eq!(b.customers().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let config = DbConfig::default();
        let db = Database::open_empty(&config).await.unwrap();
        let first = Customer::new("First").unwrap();
        let second = Customer::new("Second").unwrap();
        db.customers().save(&first).await.unwrap();
        db.customers().save(&second).await.unwrap();

        let bytes = db.to_bytes().await.unwrap();
        assert!(bytes.starts_with(SQLITE_HEADER));

        let restored = Database::from_bytes(&bytes, &config).await.unwrap();
        let customers = restored.customers().get_all().await.unwrap();
        assert_eq!(customers, vec![first, second]);
    }

    #[tokio::test]
    async fn test_from_bytes_rejects_garbage() {
        let config = DbConfig::default();

        let err = Database::from_bytes(b"definitely not sqlite", &config).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidSnapshot(_)));

        let mut truncated = SQLITE_HEADER.to_vec();
        truncated.resize(4096, 0xAB);
        let err = Database::from_bytes(&truncated, &config).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidSnapshot(_)));
    }

    #[tokio::test]
    async fn test_loads_database_file_written_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Delete),
            )
            .await
            .unwrap();
        schema::create_tables(&pool).await.unwrap();
        let stored = Customer::new("Written Elsewhere").unwrap();
        Table::<Customer>::new(pool.clone()).save(&stored).await.unwrap();
        pool.close().await;

        let bytes = tokio::fs::read(&path).await.unwrap();
        let db = Database::from_bytes(&bytes, &DbConfig::default()).await.unwrap();
        assert_eq!(db.customers().get_all().await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_snapshot_files_do_not_outlive_handles() {
        let scratch = tempfile::tempdir().unwrap();
        let config = DbConfig::new().scratch_dir(scratch.path());

        let db = Database::open_empty(&config).await.unwrap();
        db.customers().save(&Customer::new("Transient").unwrap()).await.unwrap();
        let bytes = db.to_bytes().await.unwrap();
        assert!(bytes.len() >= HEADER_LEN);

        db.close().await;
        drop(db);
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_from_bytes_rejects_damaged_snapshot() {
        let config = DbConfig::default();
        let db = Database::open_empty(&config).await.unwrap();
        db.customers().save(&Customer::new("Damaged").unwrap()).await.unwrap();
        let mut bytes = db.to_bytes().await.unwrap();

        // Page size field: not a power of two.
        bytes[16] = 0x12;
        bytes[17] = 0x34;
        let err = Database::from_bytes(&bytes, &config).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidSnapshot(_)));
    }

    #[tokio::test]
    async fn test_closed_handle_reports_not_initialized() {
        let db = Database::open_empty(&DbConfig::default()).await.unwrap();
        db.close().await;

        let err = db.customers().count().await.unwrap_err();
        assert!(matches!(err, DbError::NotInitialized));
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new()
            .connect_timeout(Duration::from_secs(5))
            .scratch_dir("/tmp/bizbooks-scratch");

        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.scratch_dir, Some(PathBuf::from("/tmp/bizbooks-scratch")));
    }
}
