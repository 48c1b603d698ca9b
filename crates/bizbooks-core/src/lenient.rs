//! # Lenient Readers
//!
//! Serde `deserialize_with` helpers for numeric fields that were typed into
//! HTML form inputs. Legacy payloads carry `"rate": "100"` as often as
//! `"rate": 100`, and an untouched input arrives as `""` or `null`.
//!
//! | Input            | `number` | `opt_number` | `whole` |
//! |------------------|----------|--------------|---------|
//! | `12.5`           | 12.5     | Some(12.5)   | 12      |
//! | `"12.5"`         | 12.5     | Some(12.5)   | 12      |
//! | `""` / `null`    | 0.0      | None         | 0       |
//! | `"abc"`          | error    | error        | error   |
//!
//! Text fields that users often type as digits (HSN codes, phone numbers,
//! document numbers) go through [`text`] / [`opt_text`], which accept either
//! a string or a number.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Number(f64),
    Text(String),
}

fn parse_raw<E: de::Error>(raw: Option<Raw>) -> Result<Option<f64>, E> {
    match raw {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("expected a number, got '{}'", text)))
        }
    }
}

/// Reads a number or numeric string; blank or null becomes `0.0`.
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(parse_raw::<D::Error>(raw)?.unwrap_or(0.0))
}

/// Reads an optional number or numeric string; blank or null becomes `None`.
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    parse_raw::<D::Error>(raw)
}

/// Reads a non-negative whole number (serial numbers); fractions truncate.
pub fn whole<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    let value = parse_raw::<D::Error>(raw)?.unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(de::Error::custom(format!(
            "expected a non-negative whole number, got {}",
            value
        )));
    }
    Ok(value.trunc().min(u32::MAX as f64) as u32)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Number(f64),
    Flag(bool),
}

fn raw_to_string(raw: RawText) -> String {
    match raw {
        RawText::Text(text) => text,
        RawText::Number(n) => n.to_string(),
        RawText::Flag(b) => b.to_string(),
    }
}

/// Reads a string or number as text; null becomes an empty string.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawText>::deserialize(deserializer)?;
    Ok(raw.map(raw_to_string).unwrap_or_default())
}

/// Reads an optional string or number as text; null or blank becomes `None`.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawText>::deserialize(deserializer)?;
    Ok(raw
        .map(raw_to_string)
        .filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "number")]
        rate: f64,
        #[serde(default, deserialize_with = "opt_number")]
        approx: Option<f64>,
        #[serde(default, deserialize_with = "whole")]
        sl: u32,
        #[serde(default, deserialize_with = "text")]
        hsn: String,
        #[serde(default, deserialize_with = "opt_text")]
        phone: Option<String>,
    }

    fn probe(json: &str) -> Result<Probe, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        let p = probe(r#"{"rate": "100.5", "approx": 7, "sl": "3"}"#).unwrap();
        assert_eq!(p.rate, 100.5);
        assert_eq!(p.approx, Some(7.0));
        assert_eq!(p.sl, 3);
    }

    #[test]
    fn test_blank_and_missing() {
        let p = probe(r#"{"rate": "", "approx": null}"#).unwrap();
        assert_eq!(p.rate, 0.0);
        assert_eq!(p.approx, None);
        assert_eq!(p.sl, 0);

        let p = probe("{}").unwrap();
        assert_eq!(p.rate, 0.0);
    }

    #[test]
    fn test_text_accepts_numbers() {
        let p = probe(r#"{"hsn": 8471, "phone": 9876543210}"#).unwrap();
        assert_eq!(p.hsn, "8471");
        assert_eq!(p.phone.as_deref(), Some("9876543210"));

        let p = probe(r#"{"hsn": null, "phone": "  "}"#).unwrap();
        assert_eq!(p.hsn, "");
        assert_eq!(p.phone, None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(probe(r#"{"rate": "abc"}"#).is_err());
        assert!(probe(r#"{"sl": -1}"#).is_err());
    }
}
