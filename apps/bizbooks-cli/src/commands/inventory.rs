//! # Inventory Commands
//!
//! Records stock movements.
//!
//! ## Stock Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bizbooks stock <product-id> out 3 --reference 42                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  products().get_by_id ──── missing ──► NOT_FOUND                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InventoryTransaction::new (quantity must be > 0)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  inventory().record_transaction   row + stock delta, one transaction   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  controller.save()                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::info;

use bizbooks_core::{InventoryTransaction, MovementType};

use crate::error::ApiError;
use crate::state::DbState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDto {
    pub transaction: InventoryTransaction,
    /// Product stock after the movement.
    pub stock: f64,
    pub saved: bool,
}

/// Records one movement against an existing product and saves.
pub async fn record_movement(
    db: &DbState,
    product_id: &str,
    direction: MovementType,
    quantity: f64,
    reference: String,
) -> Result<StockDto, ApiError> {
    let (transaction, stock) = {
        let database = db.database().await?;

        let product = database
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", product_id))?;

        let transaction = InventoryTransaction::new(&product, direction, quantity, reference)?;
        database.inventory().record_transaction(&transaction).await?;

        let stock = database
            .products()
            .get_by_id(product_id)
            .await?
            .map(|p| p.stock)
            .unwrap_or(product.stock);

        (transaction, stock)
    };

    info!(
        product_id = %product_id,
        movement = %direction,
        quantity = quantity,
        stock = stock,
        "Stock movement recorded"
    );

    let saved = db.controller().save().await;
    Ok(StockDto {
        transaction,
        stock,
        saved,
    })
}
