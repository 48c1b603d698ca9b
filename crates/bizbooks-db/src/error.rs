//! # Database Error Types
//!
//! Error types for engine, storage and repository operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        Adapter I/O (std::io::Error)         │
//! │       │                                  │                              │
//! │       │                                  ▼                              │
//! │       │                            StorageError                         │
//! │       │                                  │                              │
//! │       ▼                                  ▼                              │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in host shell) ← code + readable message                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  User sees a named message, never a raw engine error                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bizbooks_core::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Storage Errors
// =============================================================================

/// Failures of a storage adapter or one of its collaborators.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File system operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing store cannot be reached at all.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Stored content could not be encoded or decoded.
    #[error("Storage serialization failed: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

// =============================================================================
// Database Errors
// =============================================================================

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// The embedded engine could not be started.
    ///
    /// ## When This Occurs
    /// - In-memory connection cannot be opened
    /// - Schema creation fails on a fresh engine
    ///
    /// Fatal: the host can only offer a full restart.
    #[error("Database engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Supplied bytes are not a usable database snapshot.
    ///
    /// ## When This Occurs
    /// - Missing SQLite header
    /// - Truncated or corrupt file
    #[error("Invalid database snapshot: {0}")]
    InvalidSnapshot(String),

    /// A repository or export was used before `initialize()`.
    #[error("Database has not been initialized")]
    NotInitialized,

    /// Adapter read/write failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Embedded JSON or legacy payload could not be encoded/decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A record failed validation before it reached the engine.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True for errors that leave the previous state intact and may be retried.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DbError::EngineUnavailable(_))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → DbError::QueryFailed (engine message)
/// sqlx::Error::PoolClosed     → DbError::NotInitialized (handle was replaced)
/// sqlx::Error::ColumnDecode   → DbError::Serialization
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),

            sqlx::Error::PoolClosed => DbError::NotInitialized,

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::Serialization(format!("column {}: {}", index, source))
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Result type for storage adapter operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Product", "p-1");
        assert_eq!(err.to_string(), "Product not found: p-1");
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err: DbError = StorageError::Unavailable("namespace locked".to_string()).into();
        assert_eq!(err.to_string(), "Storage unavailable: namespace locked");
        assert!(err.is_recoverable());
        assert!(!DbError::EngineUnavailable("x".to_string()).is_recoverable());
    }

    #[test]
    fn test_pool_closed_maps_to_not_initialized() {
        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, DbError::NotInitialized));
    }
}
