//! # Money Module
//!
//! Provides the `Money` and `Percent` types for handling Rupiah amounts.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Percent discounts produce fractional Rupiah:                           │
//! │    Rp 12.345 × 7% = Rp 864,15                                           │
//! │                                                                         │
//! │  OUR SOLUTION: Exact Decimal                                            │
//! │    Every intermediate value is exact. Rounding to whole Rupiah         │
//! │    happens once, explicitly, via `round_rupiah()`                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use idcashier_core::money::{Money, Percent};
//!
//! let price = Money::from_rupiah(10_000);
//! let line = price * 3;                         // Rp 30.000
//! let discount = line.percent_of(Percent::from_int(10));
//! assert_eq!(discount, Money::from_rupiah(3_000));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

// =============================================================================
// Money Type
// =============================================================================

// Arithmetic saturates instead of overflowing: backend rows are coerced, not
// range-checked, and the calculator must stay total.

/// A Rupiah amount, kept exact until a display or persistence boundary.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──┬──► CartLine.unit_price ──► line subtotal             │
/// │                  │                                                      │
/// │                  └──► SaleLine.price (frozen at time of sale)           │
/// │                                                                         │
/// │  Σ line subtotal ──► MonetaryBreakdown ──► receipt / invoice / report   │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a whole-Rupiah amount.
    ///
    /// ## Example
    /// ```rust
    /// use idcashier_core::money::Money;
    ///
    /// let price = Money::from_rupiah(25_000);
    /// assert_eq!(price.to_string(), "Rp 25.000");
    /// ```
    #[inline]
    pub fn from_rupiah(rupiah: i64) -> Self {
        Money(Decimal::from(rupiah))
    }

    /// Parses user input, falling back to zero for anything non-numeric.
    ///
    /// Accepts a plain decimal with `.` as the fractional separator.
    ///
    /// ## Example
    /// ```rust
    /// use idcashier_core::money::Money;
    ///
    /// assert_eq!(Money::parse_lenient("1500.5").amount().to_string(), "1500.5");
    /// assert!(Money::parse_lenient("abc").is_zero());
    /// ```
    pub fn parse_lenient(input: &str) -> Self {
        Decimal::from_str(input.trim())
            .map(Money)
            .unwrap_or_default()
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity, saturating at the `Decimal` range.
    ///
    /// ## Example
    /// ```rust
    /// use idcashier_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(10_000);
    /// assert_eq!(unit_price.multiply_quantity(2), Money::from_rupiah(20_000));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(Decimal::from(qty)))
    }

    /// Applies a percentage as `value * (percent / 100)`.
    ///
    /// No rounding happens here. `Rp 25.000 × 5%` is exactly `Rp 1.250`,
    /// `Rp 333 × 10%` is exactly `Rp 33,3`.
    ///
    /// ## Example
    /// ```rust
    /// use idcashier_core::money::{Money, Percent};
    ///
    /// let taxable = Money::from_rupiah(90_000);
    /// let tax = taxable.percent_of(Percent::from_int(11));
    /// assert_eq!(tax, Money::from_rupiah(9_900));
    /// ```
    pub fn percent_of(&self, percent: Percent) -> Money {
        Money(self.0.saturating_mul(percent.fraction()))
    }

    /// Multiplies by an arbitrary ratio (used for proportional allocation).
    #[inline]
    pub fn scale(&self, ratio: Decimal) -> Money {
        Money(self.0.saturating_mul(ratio))
    }

    /// Rounds to whole Rupiah, half away from zero.
    ///
    /// ## When To Use
    /// - The persisted `totalAmount` of a sale
    /// - Export columns (discount, tax, total per line)
    ///
    /// Never inside the breakdown itself: the calculator stays exact and
    /// rounding is a display/persistence concern.
    ///
    /// ## Example
    /// ```rust
    /// use idcashier_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Money::new(Decimal::new(8645, 1)).round_rupiah(), Money::from_rupiah(865));
    /// assert_eq!(Money::new(Decimal::new(-8645, 1)).round_rupiah(), Money::from_rupiah(-865));
    /// ```
    pub fn round_rupiah(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Rounds to `dp` fractional digits, half away from zero.
    pub fn round_dp(&self, dp: u32) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

// =============================================================================
// Percent Type
// =============================================================================

/// A percentage such as the 10 in "10% discount".
///
/// Sale headers store percentages, never nominal discount/tax amounts.
/// Nominal amounts are always re-derived through [`Money::percent_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(#[ts(type = "number")] Decimal);

impl Percent {
    /// Wraps an exact percentage value.
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Percent(value)
    }

    /// Creates a whole-number percentage.
    #[inline]
    pub fn from_int(value: i64) -> Self {
        Percent(Decimal::from(value))
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(Decimal::ZERO)
    }

    /// Returns the percentage value (10 for 10%).
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Returns `value / 100`.
    #[inline]
    pub fn fraction(&self) -> Decimal {
        self.0 / ONE_HUNDRED
    }

    /// Checks if the percentage is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

// =============================================================================
// Lenient Deserialization
// =============================================================================

/// Converts a loosely-typed JSON value into a decimal.
///
/// Backend rows are not trusted to carry well-formed numbers: absent,
/// `null`, booleans, objects and unparsable strings all become zero so that
/// no downstream computation ever sees a missing amount.
pub fn decimal_from_json(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .unwrap_or_default(),
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

/// `deserialize_with` helper for [`Money`] fields on backend rows.
pub fn lenient_money<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(Money(value.as_ref().map(decimal_from_json).unwrap_or_default()))
}

/// `deserialize_with` helper for [`Percent`] fields on backend rows.
pub fn lenient_percent<'de, D>(deserializer: D) -> Result<Percent, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(Percent(value.as_ref().map(decimal_from_json).unwrap_or_default()))
}

/// `deserialize_with` helper for integer quantities and stock levels.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use rust_decimal::prelude::ToPrimitive;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .map(decimal_from_json)
        .and_then(|d| d.trunc().to_i64())
        .unwrap_or_default())
}

/// `deserialize_with` helper for optional amounts (`null` stays `None`).
pub fn lenient_optional_money<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => Some(Money(decimal_from_json(&v))),
    })
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the whole-Rupiah form, e.g. `Rp 25.000`.
///
/// ## Note
/// Receipts and invoices choose their own precision through
/// [`crate::format::format_rupiah`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::format_rupiah(*self, false))
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
