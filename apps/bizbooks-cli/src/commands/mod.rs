//! # Commands Module
//!
//! One function per subcommand, each returning a serializable DTO.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (dispatch)
//! ├── database.rs   ◄─── info, save, export, import
//! ├── records.rs    ◄─── list, next-number
//! ├── inventory.rs  ◄─── stock movements
//! └── seed.rs       ◄─── demo data
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  main.rs parses Cli                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  dialogs_for(&command)   export/import paths become host picks          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  DbState::open           load, or create fresh and migrate              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  execute(command) ──► DTO ──► serde_json::Value ──► stdout              │
//! │         │                                                               │
//! │         └── Err(ApiError) ──► {"code": "...", "message": "..."} stderr  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands that change records save before returning and report it as
//! `saved` in their output.

pub mod database;
pub mod inventory;
pub mod records;
pub mod seed;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use bizbooks_db::{DemoOptions, HostDialogs, NoDialogs, PresetDialogs};

use crate::cli::Command;
use crate::error::ApiError;
use crate::state::{AppConfig, DbState};

/// Host picks implied by the command line.
///
/// `export` without `--to` writes into the current directory; `import`
/// without `--from` is a cancelled pick.
pub fn dialogs_for(command: &Command) -> Arc<dyn HostDialogs> {
    match command {
        Command::Export { to } => Arc::new(PresetDialogs::save(
            to.clone().unwrap_or_else(|| ".".into()),
        )),
        Command::Import { from: Some(path) } => Arc::new(PresetDialogs::open(path.clone())),
        _ => Arc::new(NoDialogs),
    }
}

/// Runs one command against an opened database.
pub async fn execute(
    command: Command,
    db: &DbState,
    config: &AppConfig,
) -> Result<Value, ApiError> {
    match command {
        Command::Info => to_value(database::info(db, config).await?),
        Command::Save => to_value(database::save(db).await?),
        Command::Export { .. } => to_value(database::export(db).await?),
        Command::Import { .. } => to_value(database::import(db).await?),
        Command::List { entity, company } => records::list(db, entity, company.as_deref()).await,
        Command::NextNumber { kind, company } => {
            to_value(records::next_number(db, config, kind, company).await?)
        }
        Command::Stock {
            product_id,
            direction,
            quantity,
            reference,
        } => to_value(
            inventory::record_movement(db, &product_id, direction, quantity, reference).await?,
        ),
        Command::Seed { products, invoices } => {
            to_value(seed::seed(db, DemoOptions { products, invoices }).await?)
        }
    }
}

fn to_value<T: Serialize>(dto: T) -> Result<Value, ApiError> {
    Ok(serde_json::to_value(dto)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizbooks_core::{DocumentKind, MovementType, Product};
    use bizbooks_db::{
        DbConfig, LifecycleController, MemoryObjectStore, ObjectStoreAdapter, StorageAdapter,
    };

    use crate::cli::EntityKind;

    async fn open_memory() -> DbState {
        let adapter: Arc<dyn StorageAdapter> = Arc::new(ObjectStoreAdapter::new(
            Arc::new(MemoryObjectStore::new()),
            "test",
            Arc::new(NoDialogs),
        ));
        let controller = LifecycleController::new(adapter, DbConfig::new());
        controller.initialize().await.unwrap();
        DbState::new(controller)
    }

    #[tokio::test]
    async fn test_seed_then_list_and_number() {
        let db = open_memory().await;
        let config = AppConfig::default();

        let seeded = execute(
            Command::Seed {
                products: 4,
                invoices: 2,
            },
            &db,
            &config,
        )
        .await
        .unwrap();
        assert_eq!(seeded["invoices"], 2);
        assert_eq!(seeded["saved"], true);

        let invoices = execute(
            Command::List {
                entity: EntityKind::Invoices,
                company: None,
            },
            &db,
            &config,
        )
        .await
        .unwrap();
        assert_eq!(invoices.as_array().unwrap().len(), 2);

        let next = execute(
            Command::NextNumber {
                kind: DocumentKind::Invoice,
                company: None,
            },
            &db,
            &config,
        )
        .await
        .unwrap();
        assert_eq!(next["number"], "3");
    }

    #[tokio::test]
    async fn test_company_filter_rejected_for_flat_tables() {
        let db = open_memory().await;
        let err = execute(
            Command::List {
                entity: EntityKind::Products,
                company: Some("c-1".into()),
            },
            &db,
            &AppConfig::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_stock_movement_updates_product() {
        let db = open_memory().await;
        let product = Product::new("Bolt", 2.5, "pcs").unwrap();
        {
            let database = db.database().await.unwrap();
            database.products().save(&product).await.unwrap();
        }

        let out = execute(
            Command::Stock {
                product_id: product.id.clone(),
                direction: MovementType::In,
                quantity: 7.0,
                reference: "PO-1".into(),
            },
            &db,
            &AppConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(out["stock"], 7.0);
        assert_eq!(out["transaction"]["productName"], "Bolt");
    }

    #[tokio::test]
    async fn test_stock_for_unknown_product_is_not_found() {
        let db = open_memory().await;
        let err = execute(
            Command::Stock {
                product_id: "nope".into(),
                direction: MovementType::Out,
                quantity: 1.0,
                reference: String::new(),
            },
            &db,
            &AppConfig::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_import_without_path_is_cancelled() {
        let db = open_memory().await;
        let out = execute(Command::Import { from: None }, &db, &AppConfig::default())
            .await
            .unwrap();
        assert_eq!(out["imported"], false);
    }
}
