//! # Database Commands
//!
//! Identity, save, export and import of the whole database.
//!
//! ## Import Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bizbooks import --from backup.db                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PresetDialogs::open(backup.db) answers the pick                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  controller.import_from_user()                                         │
//! │       ├── not a database → INVALID_SNAPSHOT, current data untouched    │
//! │       └── ok → live handle replaced, then saved (`saved` reports it)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{info, warn};

use bizbooks_core::Company;
use bizbooks_db::{Database, StorageIdentity, UserImport};

use crate::error::ApiError;
use crate::state::{AppConfig, DbState};

/// Row count of one table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}

/// Selected company, as shown in `info`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    pub gstin: Option<String>,
}

impl From<Company> for CompanySummary {
    fn from(c: Company) -> Self {
        CompanySummary {
            id: c.id,
            name: c.name,
            gstin: c.gstin,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoDto {
    pub storage: StorageIdentity,
    pub healthy: bool,
    pub selected_company: Option<CompanySummary>,
    pub tables: Vec<TableCount>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDto {
    pub saved: bool,
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDto {
    /// Where the copy was written; `None` when cancelled.
    pub exported_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDto {
    pub imported: bool,
    /// False when the imported data is live but only in memory.
    pub saved: bool,
    pub tables: Vec<TableCount>,
}

/// Backend, location, health and row counts.
pub async fn info(db: &DbState, config: &AppConfig) -> Result<InfoDto, ApiError> {
    let database = db.database().await?;

    let selected = database
        .companies()
        .resolve_selected(config.session.company_id.as_deref())
        .await?;

    Ok(InfoDto {
        storage: db.controller().identity(),
        healthy: database.health_check().await,
        selected_company: selected.map(CompanySummary::from),
        tables: table_counts(&database).await?,
    })
}

/// Writes the live database to storage.
pub async fn save(db: &DbState) -> Result<SaveDto, ApiError> {
    let saved = db.controller().save().await;
    Ok(SaveDto {
        saved,
        location: db.controller().identity().location,
    })
}

/// Writes a copy where the host's save pick points.
pub async fn export(db: &DbState) -> Result<ExportDto, ApiError> {
    let exported_to = db.controller().export_to_user().await?;
    if let Some(location) = &exported_to {
        info!(location = %location, "Database exported");
    }
    Ok(ExportDto { exported_to })
}

/// Replaces the database with the file the host's open pick points at.
pub async fn import(db: &DbState) -> Result<ImportDto, ApiError> {
    match db.controller().import_from_user().await? {
        UserImport::Cancelled => Ok(ImportDto {
            imported: false,
            saved: false,
            tables: Vec::new(),
        }),
        UserImport::Imported { saved } => {
            if !saved {
                warn!("Import applied but not saved");
            }
            Ok(ImportDto {
                imported: true,
                saved,
                tables: table_counts(&*db.database().await?).await?,
            })
        }
    }
}

async fn table_counts(database: &Database) -> Result<Vec<TableCount>, ApiError> {
    Ok(database
        .table_counts()
        .await?
        .into_iter()
        .map(|(table, rows)| TableCount { table, rows })
        .collect())
}
