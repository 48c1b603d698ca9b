//! # API Error Type
//!
//! The one error shape a user ever sees.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in BizBooks                               │
//! │                                                                         │
//! │  Command Function                                                       │
//! │  Result<T, ApiError>                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Engine / storage? ─── DbError::InvalidSnapshot("...") ──┐             │
//! │         │                                                │             │
//! │         ▼                                                ▼             │
//! │  Validation? ──────── ValidationError::Required ──────► ApiError ────► │
//! │         │                                                │             │
//! │         ▼                                                │             │
//! │  Config? ──────────── ConfigError::Invalid ──────────────┘             │
//! │                                                                         │
//! │  stderr: {"code":"INVALID_SNAPSHOT","message":"Invalid database ..."}  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Engine details are logged, never shown.

use serde::Serialize;
use bizbooks_core::{CoreError, ValidationError};
use bizbooks_db::{DbError, StorageError};

use crate::state::ConfigError;

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 6f1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Engine could not start; only a restart helps
    EngineUnavailable,

    /// Supplied bytes are not a database
    InvalidSnapshot,

    /// Used before the database was loaded
    NotInitialized,

    /// Storage read/write failed
    StorageError,

    /// Database operation failed
    DatabaseError,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Validation(e) => ApiError::validation(e.to_string()),
            DbError::EngineUnavailable(e) => {
                tracing::error!("Engine unavailable: {}", e);
                ApiError::new(
                    ErrorCode::EngineUnavailable,
                    "The database engine could not start. Restart BizBooks to try again.",
                )
            }
            DbError::InvalidSnapshot(e) => ApiError::new(
                ErrorCode::InvalidSnapshot,
                format!("The file is not a BizBooks database ({})", e),
            ),
            DbError::NotInitialized => {
                ApiError::new(ErrorCode::NotInitialized, "The database is not loaded")
            }
            DbError::Storage(e) => ApiError::from(e),
            DbError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "A stored record could not be read")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts storage errors to API errors.
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::warn!("Storage error: {}", err);
        ApiError::new(ErrorCode::StorageError, err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownVariant { field, value } => {
                ApiError::validation(format!("Unknown {}: '{}'", field, value))
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(format!("Could not encode output: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_details_are_not_shown() {
        let err = ApiError::from(DbError::QueryFailed("no such column: secret".to_string()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("secret"));
    }

    #[test]
    fn test_serializes_code_and_message() {
        let err = ApiError::from(DbError::InvalidSnapshot("missing SQLite header".to_string()));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INVALID_SNAPSHOT");
        assert!(json["message"].as_str().unwrap().contains("missing SQLite header"));
    }

    #[test]
    fn test_not_found_keeps_entity() {
        let err = ApiError::from(DbError::not_found("Product", "p-9"));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: p-9");
    }
}
