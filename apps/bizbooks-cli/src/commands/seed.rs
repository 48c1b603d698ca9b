//! Demo data command.

use serde::Serialize;

use bizbooks_db::{seed_demo, DemoOptions, DemoSummary};

use crate::error::ApiError;
use crate::state::DbState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDto {
    #[serde(flatten)]
    pub summary: DemoSummary,
    pub saved: bool,
}

/// Seeds demo records into an empty database and saves.
pub async fn seed(db: &DbState, options: DemoOptions) -> Result<SeedDto, ApiError> {
    let summary = {
        let database = db.database().await?;
        seed_demo(&database, &options).await?
    };

    let saved = !summary.skipped && db.controller().save().await;
    Ok(SeedDto { summary, saved })
}
