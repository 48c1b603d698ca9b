//! # Money Module
//!
//! Currency rounding for document arithmetic.
//!
//! ## Why Round At Every Step?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    212.0 - (180.0 + 32.4) = -0.4000000000000057  ❌                     │
//! │                                                                         │
//! │  Amounts are stored as decimal major units (rupees with paise) so the  │
//! │  embedded blobs stay readable by the web front end. Every derived      │
//! │  amount is therefore snapped back to 2 decimal places:                 │
//! │                                                                         │
//! │    round_currency(-0.4000000000000057) = -0.4  ✅                       │
//! │                                                                         │
//! │  Document totals are rounded to whole units; the difference is kept   │
//! │  in `round_off` so subtotal + tax + round_off == total.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bizbooks_core::money::{percent_of, round_currency, round_to_unit};
//!
//! assert_eq!(percent_of(180.0, 9.0), 16.2);
//! assert_eq!(round_to_unit(212.4), 212.0);
//! assert_eq!(round_currency(212.0 - 212.4), -0.4);
//! ```

/// Number of minor units (paise) in one major unit.
pub const MINOR_UNITS: f64 = 100.0;

/// Rounds an amount to 2 decimal places (half away from zero).
#[inline]
pub fn round_currency(value: f64) -> f64 {
    (value * MINOR_UNITS).round() / MINOR_UNITS
}

/// Rounds an amount to the nearest whole unit (half away from zero).
#[inline]
pub fn round_to_unit(value: f64) -> f64 {
    value.round()
}

/// Returns `percent`% of `base`, rounded to 2 decimal places.
#[inline]
pub fn percent_of(base: f64, percent: f64) -> f64 {
    round_currency(base * percent / 100.0)
}

/// Formats an amount with 2 decimals and an optional currency symbol.
///
/// ## Example
/// ```rust
/// use bizbooks_core::money::format_amount;
///
/// assert_eq!(format_amount(1234.5, "₹"), "₹1234.50");
/// assert_eq!(format_amount(-0.4, ""), "-0.40");
/// ```
pub fn format_amount(value: f64, symbol: &str) -> String {
    let rounded = round_currency(value);
    if rounded < 0.0 {
        format!("-{}{:.2}", symbol, rounded.abs())
    } else {
        format!("{}{:.2}", symbol, rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(16.2), 16.2);
        assert_eq!(round_currency(0.005), 0.01);
        assert_eq!(round_currency(-0.4000000000000057), -0.4);
        assert_eq!(round_currency(10.0), 10.0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(180.0, 9.0), 16.2);
        assert_eq!(percent_of(200.0, 10.0), 20.0);
        assert_eq!(percent_of(0.0, 18.0), 0.0);
    }

    #[test]
    fn test_round_to_unit_half_away_from_zero() {
        assert_eq!(round_to_unit(212.4), 212.0);
        assert_eq!(round_to_unit(212.5), 213.0);
        assert_eq!(round_to_unit(-1.5), -2.0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0, "₹"), "₹0.00");
        assert_eq!(format_amount(99.999, ""), "100.00");
    }
}
