//! Encode/decode of list fields stored as JSON text inside a row
//! (document `items` and `taxes`), and of enum columns stored as text.
//!
//! Both directions live here so the read and write paths cannot drift.
//! A blob that fails to decode yields an empty list and a warning; an
//! unknown enum value yields the default variant and a warning. Either way
//! the owning row is still returned.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::DbResult;

/// Serializes a list field for storage.
pub fn encode_list<T: Serialize>(values: &[T]) -> DbResult<String> {
    Ok(serde_json::to_string(values)?)
}

/// Parses a stored list field.
///
/// `NULL`, blank and malformed text all produce an empty list.
pub fn decode_list<T: DeserializeOwned>(
    raw: Option<&str>,
    table: &str,
    id: &str,
    column: &str,
) -> Vec<T> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<T>>(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(
                table = %table,
                id = %id,
                column = %column,
                error = %e,
                "Malformed embedded list, returning it empty"
            );
            Vec::new()
        }
    }
}

/// Parses a stored enum column (`status`, `reason_for_transfer`).
///
/// `NULL` and blank text are the default variant without a warning.
pub fn decode_variant<T: DeserializeOwned + Default>(
    raw: Option<&str>,
    table: &str,
    id: &str,
    column: &str,
) -> T {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return T::default();
    };

    match serde_json::from_value::<T>(serde_json::Value::String(raw.to_string())) {
        Ok(value) => value,
        Err(_) => {
            warn!(
                table = %table,
                id = %id,
                column = %column,
                value = %raw,
                "Unknown enum value, using the default"
            );
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizbooks_core::{ChallanStatus, InvoiceStatus, LineItem, TaxLine, TransferReason};

    #[test]
    fn test_round_trip_keeps_every_field() {
        let items = vec![LineItem::new(1, "Widget", 2.0, 100.0).with_discount(10.0)];
        let text = encode_list(&items).unwrap();
        let back: Vec<LineItem> = decode_list(Some(&text), "invoices", "i-1", "items");
        assert_eq!(back, items);
    }

    #[test]
    fn test_malformed_and_missing_blobs_are_empty() {
        let broken: Vec<TaxLine> = decode_list(Some("[{\"name\":"), "invoices", "i-1", "taxes");
        assert!(broken.is_empty());

        let missing: Vec<TaxLine> = decode_list(None, "invoices", "i-1", "taxes");
        assert!(missing.is_empty());

        let blank: Vec<TaxLine> = decode_list(Some("  "), "invoices", "i-1", "taxes");
        assert!(blank.is_empty());
    }

    #[test]
    fn test_legacy_form_values_decode() {
        let raw = r#"[{"slNo":"1","description":"Bolt","quantity":"4","rate":"2.5","amount":10,"discountPercent":"","finalAmount":10}]"#;
        let items: Vec<LineItem> = decode_list(Some(raw), "challans", "c-1", "items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 4.0);
        assert_eq!(items[0].discount_percent, 0.0);
    }

    #[test]
    fn test_enum_columns_fall_back_to_default() {
        let paid: InvoiceStatus = decode_variant(Some("paid"), "invoices", "i-1", "status");
        assert_eq!(paid, InvoiceStatus::Paid);

        let unknown: InvoiceStatus = decode_variant(Some("cancelled"), "invoices", "i-1", "status");
        assert_eq!(unknown, InvoiceStatus::Draft);

        let reason: TransferReason =
            decode_variant(Some("job_work"), "challans", "c-1", "reason_for_transfer");
        assert_eq!(reason, TransferReason::JobWork);

        let missing: ChallanStatus = decode_variant(None, "challans", "c-1", "status");
        assert_eq!(missing, ChallanStatus::Draft);
    }
}
