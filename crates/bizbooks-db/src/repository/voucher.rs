//! # Voucher Repository

use sqlx::sqlite::SqliteRow;

use crate::error::{DbError, DbResult};
use crate::repository::{Record, SqliteQuery, Table};
use crate::schema;
use bizbooks_core::Voucher;

/// Repository for vouchers.
pub type VoucherRepository = Table<Voucher>;

impl Record for Voucher {
    const ENTITY: &'static str = "Voucher";
    const TABLE: &'static str = schema::VOUCHERS;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "voucher_number",
        "company_id",
        "voucher_type",
        "date",
        "amount",
        "payment_mode",
        "narration",
        "party",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> DbResult<SqliteQuery<'q>> {
        Ok(query
            .bind(&self.id)
            .bind(&self.voucher_number)
            .bind(&self.company_id)
            .bind(self.voucher_type)
            .bind(&self.date)
            .bind(self.amount)
            .bind(&self.payment_mode)
            .bind(&self.narration)
            .bind(&self.party)
            .bind(self.created_at))
    }

    fn decode_row(row: &SqliteRow) -> DbResult<Self> {
        <Voucher as sqlx::FromRow<'_, SqliteRow>>::from_row(row).map_err(DbError::from)
    }
}

impl Table<Voucher> {
    /// Vouchers of one company, in storage order.
    pub async fn list_for_company(&self, company_id: &str) -> DbResult<Vec<Voucher>> {
        self.list_where("company_id", company_id).await
    }
}
