//! # Currency Formatting
//!
//! Renders Rupiah amounts the way Indonesian receipts print them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  id-ID number convention                                               │
//! │                                                                         │
//! │    thousands separator   .        1.250.000                             │
//! │    decimal separator     ,        1.250.000,50                          │
//! │                                                                         │
//! │  useTwoDecimals = true   →  exactly 2 fraction digits   "23.625,00"     │
//! │  useTwoDecimals = false  →  integer, rounded            "23.625"        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The precision toggle is purely presentational: it is chosen per print
//! surface (thermal receipt, A4 invoice) and never feeds back into any
//! computed or persisted value.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::money::{decimal_from_json, Money};

/// Formats an amount with Indonesian grouping, without currency symbol.
///
/// ## Example
/// ```rust
/// use idcashier_core::format::format_currency;
/// use idcashier_core::money::Money;
///
/// assert_eq!(format_currency(Money::from_rupiah(23_625), true), "23.625,00");
/// assert_eq!(format_currency(Money::from_rupiah(23_625), false), "23.625");
/// ```
pub fn format_currency(amount: Money, use_two_decimals: bool) -> String {
    let dp = if use_two_decimals { 2 } else { 0 };
    format_decimal_id(amount.amount(), dp)
}

/// Formats an amount with the `Rp` prefix, e.g. `Rp 1.250.000`.
///
/// Negative amounts keep the sign after the symbol: `Rp -5.000`.
pub fn format_rupiah(amount: Money, use_two_decimals: bool) -> String {
    format!("Rp {}", format_currency(amount, use_two_decimals))
}

/// Formats a loosely-typed JSON value; anything non-numeric renders as zero.
///
/// ## Example
/// ```rust
/// use idcashier_core::format::format_currency_value;
///
/// assert_eq!(format_currency_value(&serde_json::json!("oops"), false), "0");
/// assert_eq!(format_currency_value(&serde_json::json!(1500), true), "1.500,00");
/// ```
pub fn format_currency_value(value: &serde_json::Value, use_two_decimals: bool) -> String {
    format_currency(Money::new(decimal_from_json(value)), use_two_decimals)
}

/// Formats a decimal with `dp` fraction digits using `.` grouping and `,`
/// as the decimal mark.
pub fn format_decimal_id(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    // Rescale so the string always carries exactly `dp` fraction digits.
    let mut abs = rounded.abs();
    abs.rescale(dp);
    let digits = abs.to_string();

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (digits, None),
    };

    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part));
    if let Some(frac) = frac_part {
        if dp > 0 {
            out.push(',');
            out.push_str(&frac);
        }
    }
    out
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_grouping() {
        assert_eq!(format_decimal_id(dec!(0), 0), "0");
        assert_eq!(format_decimal_id(dec!(999), 0), "999");
        assert_eq!(format_decimal_id(dec!(1000), 0), "1.000");
        assert_eq!(format_decimal_id(dec!(1250000), 0), "1.250.000");
        assert_eq!(format_decimal_id(dec!(123456789), 0), "123.456.789");
    }

    #[test]
    fn test_two_decimals() {
        assert_eq!(format_currency(Money::new(dec!(864.15)), true), "864,15");
        assert_eq!(format_currency(Money::new(dec!(1125)), true), "1.125,00");
        assert_eq!(format_currency(Money::new(dec!(0.005)), true), "0,01");
    }

    #[test]
    fn test_integer_mode_rounds() {
        assert_eq!(format_currency(Money::new(dec!(864.5)), false), "865");
        assert_eq!(format_currency(Money::new(dec!(864.49)), false), "864");
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(format_currency(Money::from_rupiah(-5000), false), "-5.000");
        assert_eq!(format_rupiah(Money::from_rupiah(-5000), false), "Rp -5.000");
        // Rounds to zero: no dangling minus sign
        assert_eq!(format_currency(Money::new(dec!(-0.001)), true), "0,00");
    }

    #[test]
    fn test_rupiah_prefix() {
        assert_eq!(format_rupiah(Money::from_rupiah(99_900), false), "Rp 99.900");
        assert_eq!(Money::from_rupiah(99_900).to_string(), "Rp 99.900");
    }

    #[test]
    fn test_non_numeric_value_formats_as_zero() {
        assert_eq!(format_currency_value(&serde_json::json!(null), true), "0,00");
        assert_eq!(format_currency_value(&serde_json::json!([1, 2]), false), "0");
    }
}
