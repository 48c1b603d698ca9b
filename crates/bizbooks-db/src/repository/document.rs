//! # Document Repositories
//!
//! Invoices, quotations and delivery challans.
//!
//! Customer snapshot and dispatch fields are flat columns. Line items and
//! taxes are JSON text columns handled by [`super::embedded`]; a malformed
//! blob comes back as an empty list, the document itself is still listed.
//!
//! ## Next Number
//! ```text
//! invoices.next_number(Some("c-1"))
//!     SELECT invoice_number FROM invoices WHERE company_id = 'c-1'
//!         ["1", "3", "abc", "5"]
//!     bizbooks_core::sequence::next_number  ──►  "6"
//! ```

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::DbResult;
use crate::repository::embedded::{decode_list, decode_variant, encode_list};
use crate::repository::{Record, SqliteQuery, Table};
use crate::schema;
use bizbooks_core::sequence::{self, DocumentKind};
use bizbooks_core::{CustomerSnapshot, DeliveryChallan, DispatchDetails, Invoice, Quotation};

/// Repository for invoices.
pub type InvoiceRepository = Table<Invoice>;

/// Repository for quotations.
pub type QuotationRepository = Table<Quotation>;

/// Repository for delivery challans.
pub type ChallanRepository = Table<DeliveryChallan>;

// =============================================================================
// Row Helpers
// =============================================================================

fn text(row: &SqliteRow, column: &str) -> DbResult<String> {
    Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
}

fn opt_text(row: &SqliteRow, column: &str) -> DbResult<Option<String>> {
    Ok(row.try_get::<Option<String>, _>(column)?)
}

fn real(row: &SqliteRow, column: &str) -> DbResult<f64> {
    Ok(row.try_get::<Option<f64>, _>(column)?.unwrap_or_default())
}

fn customer_from_row(row: &SqliteRow) -> DbResult<CustomerSnapshot> {
    Ok(CustomerSnapshot {
        customer_name: text(row, "customer_name")?,
        customer_address: text(row, "customer_address")?,
        customer_gstin: opt_text(row, "customer_gstin")?,
        customer_email: opt_text(row, "customer_email")?,
        customer_mobile: opt_text(row, "customer_mobile")?,
        customer_state: opt_text(row, "customer_state")?,
    })
}

fn dispatch_from_row(row: &SqliteRow) -> DbResult<DispatchDetails> {
    Ok(DispatchDetails {
        buyer_order_number: opt_text(row, "buyer_order_number")?,
        dispatch_doc_number: opt_text(row, "dispatch_doc_number")?,
        dispatched_through: opt_text(row, "dispatched_through")?,
        destination: opt_text(row, "destination")?,
        vehicle_number: opt_text(row, "vehicle_number")?,
        terms_of_delivery: opt_text(row, "terms_of_delivery")?,
    })
}

fn bind_customer<'q>(query: SqliteQuery<'q>, customer: &'q CustomerSnapshot) -> SqliteQuery<'q> {
    query
        .bind(&customer.customer_name)
        .bind(&customer.customer_address)
        .bind(&customer.customer_gstin)
        .bind(&customer.customer_email)
        .bind(&customer.customer_mobile)
        .bind(&customer.customer_state)
}

fn bind_dispatch<'q>(query: SqliteQuery<'q>, dispatch: &'q DispatchDetails) -> SqliteQuery<'q> {
    query
        .bind(&dispatch.buyer_order_number)
        .bind(&dispatch.dispatch_doc_number)
        .bind(&dispatch.dispatched_through)
        .bind(&dispatch.destination)
        .bind(&dispatch.vehicle_number)
        .bind(&dispatch.terms_of_delivery)
}

// =============================================================================
// Invoice
// =============================================================================

impl Record for Invoice {
    const ENTITY: &'static str = "Invoice";
    const TABLE: &'static str = schema::INVOICES;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "invoice_number",
        "company_id",
        "customer_name",
        "customer_address",
        "customer_gstin",
        "customer_email",
        "customer_mobile",
        "customer_state",
        "date",
        "due_date",
        "buyer_order_number",
        "dispatch_doc_number",
        "dispatched_through",
        "destination",
        "vehicle_number",
        "terms_of_delivery",
        "items",
        "total_qty",
        "subtotal",
        "taxes",
        "tax_percent",
        "tax_amount",
        "round_off",
        "total",
        "declaration",
        "status",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> DbResult<SqliteQuery<'q>> {
        let items = encode_list(&self.items)?;
        let taxes = encode_list(&self.taxes)?;

        let query = query
            .bind(&self.id)
            .bind(&self.invoice_number)
            .bind(&self.company_id);
        let query = bind_customer(query, &self.customer)
            .bind(&self.date)
            .bind(&self.due_date);
        let query = bind_dispatch(query, &self.dispatch);

        Ok(query
            .bind(items)
            .bind(self.total_qty)
            .bind(self.subtotal)
            .bind(taxes)
            .bind(self.tax_percent)
            .bind(self.tax_amount)
            .bind(self.round_off)
            .bind(self.total)
            .bind(&self.declaration)
            .bind(self.status)
            .bind(self.created_at))
    }

    fn decode_row(row: &SqliteRow) -> DbResult<Self> {
        let id = text(row, "id")?;
        let items = opt_text(row, "items")?;
        let taxes = opt_text(row, "taxes")?;

        Ok(Invoice {
            invoice_number: text(row, "invoice_number")?,
            company_id: opt_text(row, "company_id")?,
            customer: customer_from_row(row)?,
            date: text(row, "date")?,
            due_date: opt_text(row, "due_date")?,
            dispatch: dispatch_from_row(row)?,
            items: decode_list(items.as_deref(), Self::TABLE, &id, "items"),
            total_qty: real(row, "total_qty")?,
            subtotal: real(row, "subtotal")?,
            taxes: decode_list(taxes.as_deref(), Self::TABLE, &id, "taxes"),
            tax_percent: real(row, "tax_percent")?,
            tax_amount: real(row, "tax_amount")?,
            round_off: real(row, "round_off")?,
            total: real(row, "total")?,
            declaration: opt_text(row, "declaration")?,
            status: decode_variant(
                opt_text(row, "status")?.as_deref(),
                Self::TABLE,
                &id,
                "status",
            ),
            created_at: row.try_get("created_at")?,
            id,
        })
    }
}

impl Table<Invoice> {
    /// Invoices of one company, in storage order.
    pub async fn list_for_company(&self, company_id: &str) -> DbResult<Vec<Invoice>> {
        self.list_where("company_id", company_id).await
    }

    /// Next invoice number, scoped to `company_id` when given.
    pub async fn next_number(&self, company_id: Option<&str>) -> DbResult<String> {
        let numbers = self
            .column_values("invoice_number", company_id.map(|id| ("company_id", id)))
            .await?;
        Ok(sequence::next_number(DocumentKind::Invoice, numbers))
    }
}

// =============================================================================
// Quotation
// =============================================================================

impl Record for Quotation {
    const ENTITY: &'static str = "Quotation";
    const TABLE: &'static str = schema::QUOTATIONS;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "quotation_number",
        "company_id",
        "customer_name",
        "customer_address",
        "customer_gstin",
        "customer_email",
        "customer_mobile",
        "customer_state",
        "date",
        "valid_until",
        "buyer_order_number",
        "dispatch_doc_number",
        "dispatched_through",
        "destination",
        "vehicle_number",
        "terms_of_delivery",
        "subject",
        "items",
        "total_qty",
        "subtotal",
        "taxes",
        "tax_percent",
        "tax_amount",
        "round_off",
        "total",
        "terms_and_conditions",
        "notes",
        "declaration",
        "status",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> DbResult<SqliteQuery<'q>> {
        let items = encode_list(&self.items)?;
        let taxes = encode_list(&self.taxes)?;

        let query = query
            .bind(&self.id)
            .bind(&self.quotation_number)
            .bind(&self.company_id);
        let query = bind_customer(query, &self.customer)
            .bind(&self.date)
            .bind(&self.valid_until);
        let query = bind_dispatch(query, &self.dispatch);

        Ok(query
            .bind(&self.subject)
            .bind(items)
            .bind(self.total_qty)
            .bind(self.subtotal)
            .bind(taxes)
            .bind(self.tax_percent)
            .bind(self.tax_amount)
            .bind(self.round_off)
            .bind(self.total)
            .bind(&self.terms_and_conditions)
            .bind(&self.notes)
            .bind(&self.declaration)
            .bind(self.status)
            .bind(self.created_at))
    }

    fn decode_row(row: &SqliteRow) -> DbResult<Self> {
        let id = text(row, "id")?;
        let items = opt_text(row, "items")?;
        let taxes = opt_text(row, "taxes")?;

        Ok(Quotation {
            quotation_number: text(row, "quotation_number")?,
            company_id: opt_text(row, "company_id")?,
            customer: customer_from_row(row)?,
            date: text(row, "date")?,
            valid_until: opt_text(row, "valid_until")?,
            dispatch: dispatch_from_row(row)?,
            subject: opt_text(row, "subject")?,
            items: decode_list(items.as_deref(), Self::TABLE, &id, "items"),
            total_qty: real(row, "total_qty")?,
            subtotal: real(row, "subtotal")?,
            taxes: decode_list(taxes.as_deref(), Self::TABLE, &id, "taxes"),
            tax_percent: real(row, "tax_percent")?,
            tax_amount: real(row, "tax_amount")?,
            round_off: real(row, "round_off")?,
            total: real(row, "total")?,
            terms_and_conditions: opt_text(row, "terms_and_conditions")?,
            notes: opt_text(row, "notes")?,
            declaration: opt_text(row, "declaration")?,
            status: decode_variant(
                opt_text(row, "status")?.as_deref(),
                Self::TABLE,
                &id,
                "status",
            ),
            created_at: row.try_get("created_at")?,
            id,
        })
    }
}

impl Table<Quotation> {
    /// Quotations of one company, in storage order.
    pub async fn list_for_company(&self, company_id: &str) -> DbResult<Vec<Quotation>> {
        self.list_where("company_id", company_id).await
    }

    /// Next `QT-` number, scoped to `company_id` when given.
    pub async fn next_number(&self, company_id: Option<&str>) -> DbResult<String> {
        let numbers = self
            .column_values("quotation_number", company_id.map(|id| ("company_id", id)))
            .await?;
        Ok(sequence::next_number(DocumentKind::Quotation, numbers))
    }
}

// =============================================================================
// Delivery Challan
// =============================================================================

impl Record for DeliveryChallan {
    const ENTITY: &'static str = "DeliveryChallan";
    const TABLE: &'static str = schema::CHALLANS;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "challan_number",
        "company_id",
        "customer_name",
        "customer_address",
        "customer_gstin",
        "customer_email",
        "customer_mobile",
        "customer_state",
        "date",
        "buyer_order_number",
        "dispatch_doc_number",
        "dispatched_through",
        "destination",
        "vehicle_number",
        "terms_of_delivery",
        "reason_for_transfer",
        "items",
        "total_qty",
        "approx_value",
        "remarks",
        "status",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> DbResult<SqliteQuery<'q>> {
        let items = encode_list(&self.items)?;

        let query = query
            .bind(&self.id)
            .bind(&self.challan_number)
            .bind(&self.company_id);
        let query = bind_customer(query, &self.customer).bind(&self.date);
        let query = bind_dispatch(query, &self.dispatch);

        Ok(query
            .bind(self.reason_for_transfer)
            .bind(items)
            .bind(self.total_qty)
            .bind(self.approx_value)
            .bind(&self.remarks)
            .bind(self.status)
            .bind(self.created_at))
    }

    fn decode_row(row: &SqliteRow) -> DbResult<Self> {
        let id = text(row, "id")?;
        let items = opt_text(row, "items")?;

        Ok(DeliveryChallan {
            challan_number: text(row, "challan_number")?,
            company_id: opt_text(row, "company_id")?,
            customer: customer_from_row(row)?,
            date: text(row, "date")?,
            dispatch: dispatch_from_row(row)?,
            reason_for_transfer: decode_variant(
                opt_text(row, "reason_for_transfer")?.as_deref(),
                Self::TABLE,
                &id,
                "reason_for_transfer",
            ),
            items: decode_list(items.as_deref(), Self::TABLE, &id, "items"),
            total_qty: real(row, "total_qty")?,
            approx_value: row.try_get::<Option<f64>, _>("approx_value")?,
            remarks: opt_text(row, "remarks")?,
            status: decode_variant(
                opt_text(row, "status")?.as_deref(),
                Self::TABLE,
                &id,
                "status",
            ),
            created_at: row.try_get("created_at")?,
            id,
        })
    }
}

impl Table<DeliveryChallan> {
    /// Challans of one company, in storage order.
    pub async fn list_for_company(&self, company_id: &str) -> DbResult<Vec<DeliveryChallan>> {
        self.list_where("company_id", company_id).await
    }

    /// Next `DC-` number, scoped to `company_id` when given.
    pub async fn next_number(&self, company_id: Option<&str>) -> DbResult<String> {
        let numbers = self
            .column_values("challan_number", company_id.map(|id| ("company_id", id)))
            .await?;
        Ok(sequence::next_number(DocumentKind::Challan, numbers))
    }
}
