//! # Document Numbering
//!
//! Next-number computation for invoices, quotations and delivery challans.
//!
//! The rule is deliberately forgiving: every existing number is reduced to
//! its digits (`"QT-12"` → `12`, `"abc"` → `0`), the maximum is taken and one
//! is added. The result carries the kind's prefix.
//!
//! ```rust
//! use bizbooks_core::sequence::{next_number, DocumentKind};
//!
//! assert_eq!(next_number(DocumentKind::Invoice, ["1", "3", "abc", "5"]), "6");
//! assert_eq!(next_number(DocumentKind::Quotation, Vec::<String>::new()), "QT-1");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Which numbered document series a number belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    Quotation,
    Challan,
}

impl DocumentKind {
    /// Fixed prefix of the series (empty for invoices).
    pub const fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "",
            DocumentKind::Quotation => "QT-",
            DocumentKind::Challan => "DC-",
        }
    }

    /// Number handed out when the series is empty.
    pub fn seed(self) -> String {
        format!("{}1", self.prefix())
    }

    /// Formats `n` with the series prefix.
    pub fn format(self, n: u64) -> String {
        format!("{}{}", self.prefix(), n)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Quotation => "quotation",
            DocumentKind::Challan => "challan",
        };
        f.write_str(name)
    }
}

impl FromStr for DocumentKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invoice" | "invoices" | "inv" => Ok(DocumentKind::Invoice),
            "quotation" | "quotations" | "qt" => Ok(DocumentKind::Quotation),
            "challan" | "challans" | "dc" => Ok(DocumentKind::Challan),
            _ => Err(CoreError::unknown("documentKind", s)),
        }
    }
}

/// Extracts the numeric value of a document number.
///
/// Non-digit characters are stripped; no digits at all counts as zero.
/// Digit runs too long for `u64` saturate at `u64::MAX`.
pub fn numeric_part(number: &str) -> u64 {
    number
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit))
        })
}

/// Returns the number that follows the highest of `existing`.
pub fn next_number<I, S>(kind: DocumentKind, existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let highest = existing
        .into_iter()
        .map(|number| numeric_part(number.as_ref()))
        .max();

    match highest {
        Some(n) => kind.format(n.saturating_add(1)),
        None => kind.seed(),
    }
}
