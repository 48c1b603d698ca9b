//! # Customer Repository

use sqlx::sqlite::SqliteRow;

use crate::error::{DbError, DbResult};
use crate::repository::{Record, SqliteQuery, Table};
use crate::schema;
use bizbooks_core::Customer;

/// Repository for customers.
pub type CustomerRepository = Table<Customer>;

impl Record for Customer {
    const ENTITY: &'static str = "Customer";
    const TABLE: &'static str = schema::CUSTOMERS;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "party_name",
        "address",
        "phone",
        "email",
        "gstin",
        "state",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> DbResult<SqliteQuery<'q>> {
        Ok(query
            .bind(&self.id)
            .bind(&self.name)
            .bind(&self.party_name)
            .bind(&self.address)
            .bind(&self.phone)
            .bind(&self.email)
            .bind(&self.gstin)
            .bind(&self.state)
            .bind(self.created_at))
    }

    fn decode_row(row: &SqliteRow) -> DbResult<Self> {
        <Customer as sqlx::FromRow<'_, SqliteRow>>::from_row(row).map_err(DbError::from)
    }
}
