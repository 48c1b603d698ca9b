//! # Company Repository
//!
//! Companies plus resolution of the active one.
//!
//! ```text
//! resolve_selected(Some("c-2"))   c-2 exists?  ── yes ──► c-2
//!                                      │
//!                                      no
//!                                      ▼
//!                              default_company()   first by storage order
//! ```

use sqlx::sqlite::SqliteRow;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{Record, SqliteQuery, Table};
use crate::schema;
use bizbooks_core::Company;

/// Repository for companies.
pub type CompanyRepository = Table<Company>;

impl Record for Company {
    const ENTITY: &'static str = "Company";
    const TABLE: &'static str = schema::COMPANIES;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "address",
        "phone",
        "email",
        "gstin",
        "state",
        "bank_name",
        "account_number",
        "ifsc_code",
        "branch",
        "logo",
        "stamp",
        "signature",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> DbResult<SqliteQuery<'q>> {
        Ok(query
            .bind(&self.id)
            .bind(&self.name)
            .bind(&self.address)
            .bind(&self.phone)
            .bind(&self.email)
            .bind(&self.gstin)
            .bind(&self.state)
            .bind(&self.bank_name)
            .bind(&self.account_number)
            .bind(&self.ifsc_code)
            .bind(&self.branch)
            .bind(&self.logo)
            .bind(&self.stamp)
            .bind(&self.signature)
            .bind(self.created_at))
    }

    fn decode_row(row: &SqliteRow) -> DbResult<Self> {
        <Company as sqlx::FromRow<'_, SqliteRow>>::from_row(row).map_err(DbError::from)
    }
}

impl Table<Company> {
    /// The first company in insertion order, if any.
    pub async fn default_company(&self) -> DbResult<Option<Company>> {
        let first_id: Option<String> = sqlx::query_scalar(
            "SELECT id FROM companies ORDER BY rowid LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await?;

        match first_id {
            Some(id) => self.get_by_id(&id).await,
            None => Ok(None),
        }
    }

    /// The selected company when it still exists, else the default one.
    pub async fn resolve_selected(&self, selected_id: Option<&str>) -> DbResult<Option<Company>> {
        if let Some(id) = selected_id.filter(|id| !id.is_empty()) {
            if let Some(company) = self.get_by_id(id).await? {
                return Ok(Some(company));
            }
            debug!(id = %id, "Selected company no longer exists, using default");
        }
        self.default_company().await
    }
}
