//! # bizbooks-core: Pure Business Logic for BizBooks
//!
//! This crate holds the record types and the arithmetic of the BizBooks
//! small-business accounting tool. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BizBooks Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host shell (desktop / web / CLI)                │   │
//! │  │     forms ──► records ──► save ──► export / import              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ bizbooks-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ document  │  │ sequence  │  │ validation│  │   │
//! │  │   │  Company  │  │ LineItem  │  │ INV / QT- │  │   rules   │  │   │
//! │  │   │  Product  │  │ TaxLine   │  │   / DC-   │  │  checks   │  │   │
//! │  │   │  Voucher  │  │ Totals    │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bizbooks-db (Persistence Layer)                 │   │
//! │  │      embedded SQLite, storage adapters, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Flat entities (Company, Customer, Product, Voucher, ...)
//! - [`document`] - Invoices, quotations, challans and their line/tax math
//! - [`money`] - Currency rounding helpers
//! - [`sequence`] - Next document number computation
//! - [`lenient`] - Tolerant serde readers for legacy form data
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation used by the record factories
//!
//! ## Example Usage
//!
//! ```rust
//! use bizbooks_core::document::{DocumentTotals, LineItem, TaxLine};
//!
//! let mut items = vec![LineItem::new(1, "Widget", 2.0, 100.0).with_discount(10.0)];
//! let mut taxes = TaxLine::gst_pair(9.0);
//! let totals = DocumentTotals::compute(&mut items, &mut taxes);
//!
//! assert_eq!(items[0].final_amount, 180.0);
//! assert_eq!(totals.tax_amount, 32.4);
//! assert_eq!(totals.total, 212.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod lenient;
pub mod money;
pub mod sequence;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use document::{
    ChallanStatus, CustomerSnapshot, DeliveryChallan, DispatchDetails, DocumentTotals, Invoice,
    InvoiceStatus, LineItem, Quotation, QuotationStatus, TaxLine, TransferReason,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use sequence::DocumentKind;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default GST rate applied to each half (CGST / SGST) of a new document.
pub const DEFAULT_GST_HALF_PERCENT: f64 = 9.0;

/// Unit used when a product or line item does not name one.
pub const DEFAULT_UNIT: &str = "Nos";

/// Generates a fresh entity id.
///
/// Ids are caller-generated, globally unique, and never reused.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
