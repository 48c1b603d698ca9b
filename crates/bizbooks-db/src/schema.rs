//! # Schema
//!
//! The fixed table set, created on every fresh engine and before a
//! snapshot is copied in.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  companies ─┐                                                           │
//! │             │ company_id (advisory, no FK)                              │
//! │             ├──── invoices      items / taxes as JSON text              │
//! │             ├──── quotations    items / taxes as JSON text              │
//! │             ├──── challans      items as JSON text                      │
//! │             └──── vouchers                                              │
//! │                                                                         │
//! │  customers       (snapshotted into documents, never joined)             │
//! │                                                                         │
//! │  products ────── product_batches   true child rows                      │
//! │      │                                                                  │
//! │      └────────── inventory_transactions                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every column is nullable except `id` and the name-like fields. Amounts are
//! `REAL`; timestamps are RFC 3339 `TEXT`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

pub const COMPANIES: &str = "companies";
pub const CUSTOMERS: &str = "customers";
pub const PRODUCTS: &str = "products";
pub const PRODUCT_BATCHES: &str = "product_batches";
pub const INVOICES: &str = "invoices";
pub const QUOTATIONS: &str = "quotations";
pub const CHALLANS: &str = "challans";
pub const VOUCHERS: &str = "vouchers";
pub const INVENTORY: &str = "inventory_transactions";

/// Every table, in creation order.
pub const TABLES: &[&str] = &[
    COMPANIES,
    CUSTOMERS,
    PRODUCTS,
    PRODUCT_BATCHES,
    INVOICES,
    QUOTATIONS,
    CHALLANS,
    VOUCHERS,
    INVENTORY,
];

const CREATE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        address TEXT,
        phone TEXT,
        email TEXT,
        gstin TEXT,
        state TEXT,
        bank_name TEXT,
        account_number TEXT,
        ifsc_code TEXT,
        branch TEXT,
        logo TEXT,
        stamp TEXT,
        signature TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        party_name TEXT,
        address TEXT,
        phone TEXT,
        email TEXT,
        gstin TEXT,
        state TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        hsn_sac TEXT,
        rate REAL,
        unit TEXT,
        stock REAL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS product_batches (
        id TEXT PRIMARY KEY NOT NULL,
        product_id TEXT NOT NULL,
        batch_number TEXT NOT NULL,
        mfg_date TEXT,
        quantity REAL,
        expiry_date TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_product_batches_product ON product_batches(product_id)",
    r#"
    CREATE TABLE IF NOT EXISTS invoices (
        id TEXT PRIMARY KEY NOT NULL,
        invoice_number TEXT NOT NULL,
        company_id TEXT,
        customer_name TEXT,
        customer_address TEXT,
        customer_gstin TEXT,
        customer_email TEXT,
        customer_mobile TEXT,
        customer_state TEXT,
        date TEXT,
        due_date TEXT,
        buyer_order_number TEXT,
        dispatch_doc_number TEXT,
        dispatched_through TEXT,
        destination TEXT,
        vehicle_number TEXT,
        terms_of_delivery TEXT,
        items TEXT,
        total_qty REAL,
        subtotal REAL,
        taxes TEXT,
        tax_percent REAL,
        tax_amount REAL,
        round_off REAL,
        total REAL,
        declaration TEXT,
        status TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quotations (
        id TEXT PRIMARY KEY NOT NULL,
        quotation_number TEXT NOT NULL,
        company_id TEXT,
        customer_name TEXT,
        customer_address TEXT,
        customer_gstin TEXT,
        customer_email TEXT,
        customer_mobile TEXT,
        customer_state TEXT,
        date TEXT,
        valid_until TEXT,
        buyer_order_number TEXT,
        dispatch_doc_number TEXT,
        dispatched_through TEXT,
        destination TEXT,
        vehicle_number TEXT,
        terms_of_delivery TEXT,
        subject TEXT,
        items TEXT,
        total_qty REAL,
        subtotal REAL,
        taxes TEXT,
        tax_percent REAL,
        tax_amount REAL,
        round_off REAL,
        total REAL,
        terms_and_conditions TEXT,
        notes TEXT,
        declaration TEXT,
        status TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS challans (
        id TEXT PRIMARY KEY NOT NULL,
        challan_number TEXT NOT NULL,
        company_id TEXT,
        customer_name TEXT,
        customer_address TEXT,
        customer_gstin TEXT,
        customer_email TEXT,
        customer_mobile TEXT,
        customer_state TEXT,
        date TEXT,
        buyer_order_number TEXT,
        dispatch_doc_number TEXT,
        dispatched_through TEXT,
        destination TEXT,
        vehicle_number TEXT,
        terms_of_delivery TEXT,
        reason_for_transfer TEXT,
        items TEXT,
        total_qty REAL,
        approx_value REAL,
        remarks TEXT,
        status TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vouchers (
        id TEXT PRIMARY KEY NOT NULL,
        voucher_number TEXT NOT NULL,
        company_id TEXT,
        voucher_type TEXT,
        date TEXT,
        amount REAL,
        payment_mode TEXT,
        narration TEXT,
        party TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_transactions (
        id TEXT PRIMARY KEY NOT NULL,
        product_id TEXT NOT NULL,
        product_name TEXT,
        movement_type TEXT,
        quantity REAL,
        date TEXT,
        reference TEXT,
        notes TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_inventory_product ON inventory_transactions(product_id)",
];

/// Creates any missing table or index. Idempotent.
pub async fn create_tables(pool: &SqlitePool) -> DbResult<()> {
    for statement in CREATE_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!(tables = TABLES.len(), "Schema ready");
    Ok(())
}

/// Quotes an identifier for interpolation into SQL text.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a string literal for statements that take no bound parameters.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        assert_eq!(quote_ident("products"), "\"products\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_literal("/tmp/it's.db"), "'/tmp/it''s.db'");
    }

    #[test]
    fn test_every_table_has_a_create_statement() {
        for table in TABLES {
            let needle = format!("CREATE TABLE IF NOT EXISTS {} (", table);
            assert!(
                CREATE_STATEMENTS.iter().any(|s| s.contains(&needle)),
                "missing table {}",
                table
            );
        }
    }
}
