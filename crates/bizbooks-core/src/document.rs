//! # Documents
//!
//! Invoices, quotations and delivery challans, plus the line-item and tax
//! arithmetic they share.
//!
//! ## Totals Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Document Totals                                    │
//! │                                                                         │
//! │  LineItem                                                              │
//! │    amount       = rate × quantity                    200.00            │
//! │    finalAmount  = amount − amount × discount% / 100  180.00 (10%)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal       = Σ finalAmount                      180.00            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TaxLine.amount = subtotal × percent / 100           CGST 9% = 16.20   │
//! │                                                      SGST 9% = 16.20   │
//! │  taxAmount      = Σ TaxLine.amount                    32.40            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total          = round(subtotal + taxAmount)        212               │
//! │  roundOff       = total − (subtotal + taxAmount)      −0.40            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Fields
//! Documents copy customer details at creation time ([`CustomerSnapshot`])
//! instead of joining the live customer row, so printed history stays stable
//! when the customer record is edited later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{percent_of, round_currency, round_to_unit};
use crate::types::{Company, Customer};
use crate::validation::{validate_required, ValidationResult};
use crate::{DEFAULT_GST_HALF_PERCENT, DEFAULT_UNIT};

// =============================================================================
// Line Items
// =============================================================================

/// One row of a document's item table.
///
/// Stored inside its parent document as part of a serialized list; not
/// independently queryable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct LineItem {
    #[serde(deserialize_with = "crate::lenient::whole")]
    pub sl_no: u32,
    pub description: String,
    pub product_id: Option<String>,
    #[serde(deserialize_with = "crate::lenient::opt_text")]
    pub batch_number: Option<String>,
    pub mfg_date: Option<String>,
    #[serde(deserialize_with = "crate::lenient::opt_number")]
    pub cases: Option<f64>,
    #[serde(deserialize_with = "crate::lenient::text")]
    pub hsn_sac: String,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub quantity: f64,
    pub unit: String,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub rate: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub amount: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub discount_percent: f64,
    #[serde(deserialize_with = "crate::lenient::text")]
    pub discount_per: String,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub final_amount: f64,
}

impl LineItem {
    /// Creates a priced line with no discount.
    pub fn new(sl_no: u32, description: impl Into<String>, quantity: f64, rate: f64) -> Self {
        let mut item = LineItem {
            sl_no,
            description: description.into(),
            quantity,
            rate,
            unit: DEFAULT_UNIT.to_string(),
            ..LineItem::default()
        };
        item.recompute();
        item
    }

    /// Sets the discount percentage and recomputes the line.
    pub fn with_discount(mut self, discount_percent: f64) -> Self {
        self.discount_percent = discount_percent;
        self.recompute();
        self
    }

    /// Recomputes `amount` and `final_amount` from rate, quantity and discount.
    pub fn recompute(&mut self) {
        self.amount = round_currency(self.rate * self.quantity);
        self.final_amount = round_currency(self.amount - self.amount * self.discount_percent / 100.0);
    }
}

// =============================================================================
// Tax Lines
// =============================================================================

/// One tax applied to a document subtotal (e.g. CGST 9%).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct TaxLine {
    pub name: String,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub percent: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub amount: f64,
}

impl TaxLine {
    /// Creates a tax line with no amount yet.
    pub fn new(name: impl Into<String>, percent: f64) -> Self {
        TaxLine {
            name: name.into(),
            percent,
            amount: 0.0,
        }
    }

    /// The intra-state GST pair: CGST and SGST at `half_percent` each.
    pub fn gst_pair(half_percent: f64) -> Vec<TaxLine> {
        vec![
            TaxLine::new("CGST", half_percent),
            TaxLine::new("SGST", half_percent),
        ]
    }

    /// Recomputes `amount` against `subtotal`.
    pub fn recompute(&mut self, subtotal: f64) {
        self.amount = percent_of(subtotal, self.percent);
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Derived totals of a taxed document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DocumentTotals {
    pub total_qty: f64,
    pub subtotal: f64,
    pub tax_percent: f64,
    pub tax_amount: f64,
    pub round_off: f64,
    pub total: f64,
}

impl DocumentTotals {
    /// Recomputes every line and tax in place and returns the totals.
    ///
    /// ## Example
    /// ```rust
    /// use bizbooks_core::document::{DocumentTotals, LineItem, TaxLine};
    ///
    /// let mut items = vec![LineItem::new(1, "Widget", 2.0, 100.0).with_discount(10.0)];
    /// let mut taxes = TaxLine::gst_pair(9.0);
    /// let totals = DocumentTotals::compute(&mut items, &mut taxes);
    ///
    /// assert_eq!(totals.subtotal, 180.0);
    /// assert_eq!(taxes[0].amount, 16.2);
    /// assert_eq!(totals.round_off, -0.4);
    /// ```
    pub fn compute(items: &mut [LineItem], taxes: &mut [TaxLine]) -> Self {
        let mut total_qty = 0.0;
        let mut subtotal = 0.0;
        for item in items.iter_mut() {
            item.recompute();
            total_qty += item.quantity;
            subtotal += item.final_amount;
        }
        let subtotal = round_currency(subtotal);

        let mut tax_percent = 0.0;
        let mut tax_amount = 0.0;
        for tax in taxes.iter_mut() {
            tax.recompute(subtotal);
            tax_percent += tax.percent;
            tax_amount += tax.amount;
        }
        let tax_amount = round_currency(tax_amount);

        let before_round = subtotal + tax_amount;
        let total = round_to_unit(before_round);

        DocumentTotals {
            total_qty,
            subtotal,
            tax_percent,
            tax_amount,
            round_off: round_currency(total - before_round),
            total,
        }
    }
}

// =============================================================================
// Shared Document Parts
// =============================================================================

/// Customer details copied into a document when it is created.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CustomerSnapshot {
    pub customer_name: String,
    pub customer_address: String,
    pub customer_gstin: Option<String>,
    pub customer_email: Option<String>,
    #[serde(deserialize_with = "crate::lenient::opt_text")]
    pub customer_mobile: Option<String>,
    pub customer_state: Option<String>,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(customer: &Customer) -> Self {
        CustomerSnapshot {
            customer_name: customer
                .party_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| customer.name.clone()),
            customer_address: customer.address.clone().unwrap_or_default(),
            customer_gstin: customer.gstin.clone(),
            customer_email: customer.email.clone(),
            customer_mobile: customer.phone.clone(),
            customer_state: customer.state.clone(),
        }
    }
}

/// Transport details printed on a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct DispatchDetails {
    pub buyer_order_number: Option<String>,
    pub dispatch_doc_number: Option<String>,
    pub dispatched_through: Option<String>,
    pub destination: Option<String>,
    pub vehicle_number: Option<String>,
    pub terms_of_delivery: Option<String>,
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

// =============================================================================
// Invoice
// =============================================================================

/// Lifecycle of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
}

/// A tax invoice.
///
/// Invoice numbers are per-company increasing integers rendered as strings
/// (see [`crate::sequence`]). Uniqueness is advisory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    #[serde(deserialize_with = "crate::lenient::text")]
    pub invoice_number: String,
    pub company_id: Option<String>,
    #[serde(flatten)]
    pub customer: CustomerSnapshot,
    pub date: String,
    pub due_date: Option<String>,
    #[serde(flatten)]
    pub dispatch: DispatchDetails,
    pub items: Vec<LineItem>,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub total_qty: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub subtotal: f64,
    pub taxes: Vec<TaxLine>,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub tax_percent: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub tax_amount: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub round_off: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub total: f64,
    pub declaration: Option<String>,
    pub status: InvoiceStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a draft invoice dated today with the default GST pair.
    pub fn new(invoice_number: impl Into<String>, company_id: Option<String>) -> ValidationResult<Self> {
        let invoice_number = invoice_number.into();
        validate_required("invoiceNumber", &invoice_number)?;
        Ok(Invoice {
            id: crate::new_id(),
            invoice_number,
            company_id,
            date: today(),
            taxes: TaxLine::gst_pair(DEFAULT_GST_HALF_PERCENT),
            created_at: Utc::now(),
            ..Invoice::default()
        })
    }

    /// Copies the customer's details into the snapshot fields.
    pub fn apply_customer(&mut self, customer: &Customer) {
        self.customer = CustomerSnapshot::from(customer);
    }

    /// Attaches the document to `company`.
    pub fn apply_company(&mut self, company: &Company) {
        self.company_id = Some(company.id.clone());
    }

    /// Recomputes items, taxes and the derived totals.
    pub fn apply_totals(&mut self) -> DocumentTotals {
        let totals = DocumentTotals::compute(&mut self.items, &mut self.taxes);
        self.total_qty = totals.total_qty;
        self.subtotal = totals.subtotal;
        self.tax_percent = totals.tax_percent;
        self.tax_amount = totals.tax_amount;
        self.round_off = totals.round_off;
        self.total = totals.total;
        totals
    }
}

// =============================================================================
// Quotation
// =============================================================================

/// Lifecycle of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuotationStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

/// A price quotation. Same shape as an invoice plus offer terms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Quotation {
    pub id: String,
    #[serde(deserialize_with = "crate::lenient::text")]
    pub quotation_number: String,
    pub company_id: Option<String>,
    #[serde(flatten)]
    pub customer: CustomerSnapshot,
    pub date: String,
    pub valid_until: Option<String>,
    #[serde(flatten)]
    pub dispatch: DispatchDetails,
    pub subject: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub total_qty: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub subtotal: f64,
    pub taxes: Vec<TaxLine>,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub tax_percent: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub tax_amount: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub round_off: f64,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub total: f64,
    pub terms_and_conditions: Option<String>,
    pub notes: Option<String>,
    pub declaration: Option<String>,
    pub status: QuotationStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    /// Creates a draft quotation dated today with the default GST pair.
    pub fn new(quotation_number: impl Into<String>, company_id: Option<String>) -> ValidationResult<Self> {
        let quotation_number = quotation_number.into();
        validate_required("quotationNumber", &quotation_number)?;
        Ok(Quotation {
            id: crate::new_id(),
            quotation_number,
            company_id,
            date: today(),
            taxes: TaxLine::gst_pair(DEFAULT_GST_HALF_PERCENT),
            created_at: Utc::now(),
            ..Quotation::default()
        })
    }

    /// Copies the customer's details into the snapshot fields.
    pub fn apply_customer(&mut self, customer: &Customer) {
        self.customer = CustomerSnapshot::from(customer);
    }

    /// Attaches the document to `company`.
    pub fn apply_company(&mut self, company: &Company) {
        self.company_id = Some(company.id.clone());
    }

    /// Recomputes items, taxes and the derived totals.
    pub fn apply_totals(&mut self) -> DocumentTotals {
        let totals = DocumentTotals::compute(&mut self.items, &mut self.taxes);
        self.total_qty = totals.total_qty;
        self.subtotal = totals.subtotal;
        self.tax_percent = totals.tax_percent;
        self.tax_amount = totals.tax_amount;
        self.round_off = totals.round_off;
        self.total = totals.total;
        totals
    }
}

// =============================================================================
// Delivery Challan
// =============================================================================

/// Lifecycle of a delivery challan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ChallanStatus {
    #[default]
    Draft,
    Dispatched,
    Delivered,
}

/// Why goods leave the premises under a challan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TransferReason {
    #[default]
    Supply,
    JobWork,
    Exhibition,
    Personal,
    Other,
}

/// A delivery challan: goods movement without tax computation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct DeliveryChallan {
    pub id: String,
    #[serde(deserialize_with = "crate::lenient::text")]
    pub challan_number: String,
    pub company_id: Option<String>,
    #[serde(flatten)]
    pub customer: CustomerSnapshot,
    pub date: String,
    #[serde(flatten)]
    pub dispatch: DispatchDetails,
    pub reason_for_transfer: TransferReason,
    pub items: Vec<LineItem>,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub total_qty: f64,
    #[serde(deserialize_with = "crate::lenient::opt_number")]
    pub approx_value: Option<f64>,
    pub remarks: Option<String>,
    pub status: ChallanStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl DeliveryChallan {
    /// Creates a draft challan dated today for supply.
    pub fn new(challan_number: impl Into<String>, company_id: Option<String>) -> ValidationResult<Self> {
        let challan_number = challan_number.into();
        validate_required("challanNumber", &challan_number)?;
        Ok(DeliveryChallan {
            id: crate::new_id(),
            challan_number,
            company_id,
            date: today(),
            created_at: Utc::now(),
            ..DeliveryChallan::default()
        })
    }

    /// Copies the customer's details into the snapshot fields.
    pub fn apply_customer(&mut self, customer: &Customer) {
        self.customer = CustomerSnapshot::from(customer);
    }

    /// Attaches the document to `company`.
    pub fn apply_company(&mut self, company: &Company) {
        self.company_id = Some(company.id.clone());
    }

    /// Recomputes items, the total quantity and the approximate value.
    pub fn apply_totals(&mut self) {
        let totals = DocumentTotals::compute(&mut self.items, &mut []);
        self.total_qty = totals.total_qty;
        self.approx_value = Some(totals.subtotal);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_amounts() {
        let item = LineItem::new(1, "Widget", 2.0, 100.0).with_discount(10.0);
        assert_eq!(item.amount, 200.0);
        assert_eq!(item.final_amount, 180.0);
    }

    #[test]
    fn test_invoice_totals_with_gst_pair() {
        let mut invoice = Invoice::new("1", None).unwrap();
        invoice
            .items
            .push(LineItem::new(1, "Widget", 2.0, 100.0).with_discount(10.0));

        let totals = invoice.apply_totals();

        assert_eq!(invoice.taxes.len(), 2);
        assert_eq!(invoice.taxes[0].amount, 16.2);
        assert_eq!(invoice.taxes[1].amount, 16.2);
        assert_eq!(totals.subtotal, 180.0);
        assert_eq!(totals.tax_amount, 32.4);
        assert_eq!(totals.tax_percent, 18.0);
        assert_eq!(totals.total, 212.0);
        assert_eq!(totals.round_off, -0.4);
        assert_eq!(invoice.total, 212.0);
        assert_eq!(invoice.total_qty, 2.0);
    }

    #[test]
    fn test_tax_lines_follow_subtotal_changes() {
        let mut invoice = Invoice::new("2", None).unwrap();
        invoice.items.push(LineItem::new(1, "A", 1.0, 100.0));
        invoice.apply_totals();
        assert_eq!(invoice.taxes[0].amount, 9.0);

        invoice.items[0].quantity = 3.0;
        invoice.taxes[1].percent = 6.0;
        invoice.apply_totals();
        assert_eq!(invoice.taxes[0].amount, 27.0);
        assert_eq!(invoice.taxes[1].amount, 18.0);
        assert_eq!(invoice.total, 345.0);
        assert_eq!(invoice.round_off, 0.0);
    }

    #[test]
    fn test_empty_document_totals() {
        let totals = DocumentTotals::compute(&mut [], &mut TaxLine::gst_pair(9.0));
        assert_eq!(totals, DocumentTotals {
            total_qty: 0.0,
            subtotal: 0.0,
            tax_percent: 18.0,
            tax_amount: 0.0,
            round_off: 0.0,
            total: 0.0,
        });
    }

    #[test]
    fn test_challan_totals_have_no_tax() {
        let mut challan = DeliveryChallan::new("DC-1", None).unwrap();
        challan.items.push(LineItem::new(1, "Crate", 4.0, 25.0));
        challan.items.push(LineItem::new(2, "Pallet", 1.0, 300.0));
        challan.apply_totals();
        assert_eq!(challan.total_qty, 5.0);
        assert_eq!(challan.approx_value, Some(400.0));
    }

    #[test]
    fn test_customer_snapshot_prefers_party_name() {
        let mut customer = Customer::new("R. Sharma").unwrap();
        customer.party_name = Some("Sharma Hardware".to_string());
        customer.phone = Some("9876543210".to_string());

        let mut quotation = Quotation::new("QT-1", None).unwrap();
        quotation.apply_customer(&customer);

        assert_eq!(quotation.customer.customer_name, "Sharma Hardware");
        assert_eq!(quotation.customer.customer_mobile.as_deref(), Some("9876543210"));

        customer.name = "Renamed".to_string();
        assert_eq!(quotation.customer.customer_name, "Sharma Hardware");
    }

    #[test]
    fn test_factories_require_numbers() {
        assert!(Invoice::new("", None).is_err());
        assert!(Quotation::new(" ", None).is_err());
        assert!(DeliveryChallan::new("", None).is_err());
    }

    #[test]
    fn test_invoice_json_is_flat_camel_case() {
        let mut invoice = Invoice::new("7", Some("c1".to_string())).unwrap();
        invoice.customer.customer_name = "Acme".to_string();
        invoice.dispatch.destination = Some("Pune".to_string());

        let value = serde_json::to_value(&invoice).unwrap();
        assert_eq!(value["invoiceNumber"], "7");
        assert_eq!(value["customerName"], "Acme");
        assert_eq!(value["destination"], "Pune");
        assert_eq!(value["status"], "draft");

        let back: Invoice = serde_json::from_value(value).unwrap();
        assert_eq!(back, invoice);
    }

    #[test]
    fn test_transfer_reason_serializes_snake_case() {
        let value = serde_json::to_value(TransferReason::JobWork).unwrap();
        assert_eq!(value, "job_work");
    }
}
