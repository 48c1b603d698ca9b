//! # Domain Types
//!
//! Flat entities of BizBooks. Document types (invoice, quotation, challan)
//! live in [`crate::document`].
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Company      │   │    Customer     │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name, address  │   │  name           │   │  name, hsnSac   │       │
//! │  │  bank fields    │   │  gstin, state   │   │  rate, unit     │       │
//! │  │  logo/stamp/sig │   │                 │   │  stock          │       │
//! │  └─────────────────┘   └─────────────────┘   │  batches[] ─────┼──┐    │
//! │                                              └─────────────────┘  │    │
//! │  ┌─────────────────┐   ┌──────────────────────┐  ┌──────────────▼─┐  │
//! │  │    Voucher      │   │ InventoryTransaction │  │ ProductBatch   │  │
//! │  │  payment/receipt│   │  in / out × quantity │  │ (child rows)   │  │
//! │  │  journal/contra │   │  adjusts stock       │  └────────────────┘  │
//! │  └─────────────────┘   └──────────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity carries an opaque string `id` generated on the client
//! ([`crate::new_id`]) and a `created_at` timestamp. Writes are upserts keyed
//! by `id`.
//!
//! ## JSON Shape
//! Field names serialize in camelCase. That is the shape the web front end
//! and the legacy key-value payloads use, so legacy records decode directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::validation::{validate_name, validate_quantity, validate_required, ValidationResult};
use crate::DEFAULT_UNIT;

// =============================================================================
// Company
// =============================================================================

/// A business that issues documents.
///
/// Several companies coexist; documents reference one by `company_id`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(deserialize_with = "crate::lenient::opt_text")]
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub state: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub branch: Option<String>,
    /// Encoded image (data URL).
    pub logo: Option<String>,
    /// Encoded image (data URL).
    pub stamp: Option<String>,
    /// Encoded image (data URL).
    pub signature: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Creates a company with a fresh id and timestamp.
    pub fn new(name: impl Into<String>) -> ValidationResult<Self> {
        let name = name.into();
        validate_name("name", &name)?;
        Ok(Company {
            id: crate::new_id(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
            ..Company::default()
        })
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A party that documents are addressed to.
///
/// Customers are independent of companies and reused across documents.
/// Documents copy customer fields at creation time (see
/// [`crate::document::CustomerSnapshot`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub party_name: Option<String>,
    pub address: Option<String>,
    #[serde(deserialize_with = "crate::lenient::opt_text")]
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub state: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a customer with a fresh id and timestamp.
    pub fn new(name: impl Into<String>) -> ValidationResult<Self> {
        let name = name.into();
        validate_name("name", &name)?;
        Ok(Customer {
            id: crate::new_id(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
            ..Customer::default()
        })
    }
}

// =============================================================================
// Product & Batches
// =============================================================================

/// A stock item.
///
/// `stock` is a running total. It changes through inventory transactions
/// (see `InventoryRepository::record_transaction` in bizbooks-db).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "crate::lenient::text")]
    pub hsn_sac: String,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub rate: f64,
    pub unit: String,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub stock: f64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Stored as child rows, not as a column.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub batches: Vec<ProductBatch>,
}

impl Product {
    /// Creates a product with a fresh id, zero stock and no batches.
    pub fn new(name: impl Into<String>, rate: f64, unit: impl Into<String>) -> ValidationResult<Self> {
        let name = name.into();
        validate_name("name", &name)?;
        if !rate.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "rate".to_string(),
            });
        }
        let unit = unit.into();
        let unit = if unit.trim().is_empty() {
            DEFAULT_UNIT.to_string()
        } else {
            unit.trim().to_string()
        };
        Ok(Product {
            id: crate::new_id(),
            name: name.trim().to_string(),
            rate,
            unit,
            created_at: Utc::now(),
            ..Product::default()
        })
    }

    /// Adds a batch owned by this product and returns it for further edits.
    pub fn add_batch(&mut self, batch_number: impl Into<String>, quantity: f64) -> &mut ProductBatch {
        let mut batch = ProductBatch::new(&self.id, batch_number);
        batch.quantity = quantity;
        self.batches.push(batch);
        let last = self.batches.len() - 1;
        &mut self.batches[last]
    }
}

/// A manufacturing batch of a product.
///
/// Owned by exactly one product; removed together with it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ProductBatch {
    pub id: String,
    pub product_id: String,
    pub batch_number: String,
    pub mfg_date: String,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub quantity: f64,
    pub expiry_date: Option<String>,
}

impl ProductBatch {
    /// Creates an empty batch for `product_id`.
    pub fn new(product_id: impl Into<String>, batch_number: impl Into<String>) -> Self {
        ProductBatch {
            id: crate::new_id(),
            product_id: product_id.into(),
            batch_number: batch_number.into(),
            ..ProductBatch::default()
        }
    }
}

// =============================================================================
// Voucher
// =============================================================================

/// Accounting voucher kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum VoucherType {
    #[default]
    Payment,
    Receipt,
    Journal,
    Contra,
}

/// A payment, receipt, journal or contra entry. No derived totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Voucher {
    pub id: String,
    #[serde(deserialize_with = "crate::lenient::text")]
    pub voucher_number: String,
    pub company_id: Option<String>,
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    pub date: String,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub amount: f64,
    pub payment_mode: String,
    pub narration: String,
    pub party: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Voucher {
    /// Creates a voucher dated today.
    pub fn new(
        voucher_number: impl Into<String>,
        voucher_type: VoucherType,
        amount: f64,
    ) -> ValidationResult<Self> {
        let voucher_number = voucher_number.into();
        validate_required("voucherNumber", &voucher_number)?;
        if !amount.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "amount".to_string(),
            });
        }
        let now = Utc::now();
        Ok(Voucher {
            id: crate::new_id(),
            voucher_number,
            voucher_type,
            date: now.format("%Y-%m-%d").to_string(),
            amount,
            payment_mode: "cash".to_string(),
            created_at: now,
            ..Voucher::default()
        })
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MovementType {
    /// Goods received: stock goes up.
    #[default]
    In,
    /// Goods issued: stock goes down.
    Out,
}

impl MovementType {
    /// Signed stock change for `quantity` units moving in this direction.
    ///
    /// ## Example
    /// ```rust
    /// use bizbooks_core::MovementType;
    ///
    /// assert_eq!(MovementType::In.signed(5.0), 5.0);
    /// assert_eq!(MovementType::Out.signed(3.0), -3.0);
    /// ```
    pub fn signed(self, quantity: f64) -> f64 {
        match self {
            MovementType::In => quantity,
            MovementType::Out => -quantity,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementType::In => write!(f, "in"),
            MovementType::Out => write!(f, "out"),
        }
    }
}

impl FromStr for MovementType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" | "receive" | "purchase" => Ok(MovementType::In),
            "out" | "issue" | "sale" => Ok(MovementType::Out),
            other => Err(CoreError::unknown("movement type", other)),
        }
    }
}

/// A stock movement against one product.
///
/// `product_name` is a snapshot taken when the movement was recorded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct InventoryTransaction {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    #[serde(deserialize_with = "crate::lenient::number")]
    pub quantity: f64,
    pub date: String,
    pub reference: String,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl InventoryTransaction {
    /// Creates a movement of `quantity` units of `product`, dated today.
    pub fn new(
        product: &Product,
        movement_type: MovementType,
        quantity: f64,
        reference: impl Into<String>,
    ) -> ValidationResult<Self> {
        validate_required("productId", &product.id)?;
        validate_quantity("quantity", quantity)?;
        let now = Utc::now();
        Ok(InventoryTransaction {
            id: crate::new_id(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            movement_type,
            quantity,
            date: now.format("%Y-%m-%d").to_string(),
            reference: reference.into(),
            notes: None,
            created_at: now,
        })
    }

    /// Signed change this movement applies to the product's stock.
    pub fn stock_delta(&self) -> f64 {
        self.movement_type.signed(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
