//! # Record Commands
//!
//! Listings and document numbering.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use bizbooks_core::DocumentKind;
use bizbooks_db::Database;

use crate::cli::EntityKind;
use crate::error::ApiError;
use crate::state::{AppConfig, DbState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberDto {
    pub kind: DocumentKind,
    pub company_id: Option<String>,
    pub number: String,
}

/// Every record of `entity`, in storage order.
///
/// `company` narrows documents and vouchers to one company.
pub async fn list(
    db: &DbState,
    entity: EntityKind,
    company: Option<&str>,
) -> Result<Value, ApiError> {
    let database = db.database().await?;
    debug!(entity = ?entity, company = ?company, "Listing records");

    let records = match (entity, company) {
        (EntityKind::Invoices, Some(id)) => {
            to_json(database.invoices().list_for_company(id).await?)
        }
        (EntityKind::Quotations, Some(id)) => {
            to_json(database.quotations().list_for_company(id).await?)
        }
        (EntityKind::Challans, Some(id)) => {
            to_json(database.challans().list_for_company(id).await?)
        }
        (EntityKind::Vouchers, Some(id)) => {
            to_json(database.vouchers().list_for_company(id).await?)
        }
        (_, Some(_)) => {
            return Err(ApiError::validation(format!(
                "{:?} are not kept per company",
                entity
            )))
        }
        (_, None) => list_all(&database, entity).await?,
    };

    Ok(records?)
}

async fn list_all(
    database: &Database,
    entity: EntityKind,
) -> Result<serde_json::Result<Value>, ApiError> {
    Ok(match entity {
        EntityKind::Companies => to_json(database.companies().get_all().await?),
        EntityKind::Customers => to_json(database.customers().get_all().await?),
        EntityKind::Products => to_json(database.products().get_all().await?),
        EntityKind::Invoices => to_json(database.invoices().get_all().await?),
        EntityKind::Quotations => to_json(database.quotations().get_all().await?),
        EntityKind::Challans => to_json(database.challans().get_all().await?),
        EntityKind::Vouchers => to_json(database.vouchers().get_all().await?),
        EntityKind::Inventory => to_json(database.inventory().get_all().await?),
    })
}

fn to_json<T: Serialize>(records: Vec<T>) -> serde_json::Result<Value> {
    serde_json::to_value(records)
}

/// Next number for `kind`.
///
/// Without `company`, numbers follow the selected company (or the first
/// company when none is selected).
pub async fn next_number(
    db: &DbState,
    config: &AppConfig,
    kind: DocumentKind,
    company: Option<String>,
) -> Result<NextNumberDto, ApiError> {
    let database = db.database().await?;

    let company_id = match company {
        Some(id) => Some(id),
        None => database
            .companies()
            .resolve_selected(config.session.company_id.as_deref())
            .await?
            .map(|c| c.id),
    };
    let scope = company_id.as_deref();

    let number = match kind {
        DocumentKind::Invoice => database.invoices().next_number(scope).await?,
        DocumentKind::Quotation => database.quotations().next_number(scope).await?,
        DocumentKind::Challan => database.challans().next_number(scope).await?,
    };

    Ok(NextNumberDto {
        kind,
        company_id,
        number,
    })
}
