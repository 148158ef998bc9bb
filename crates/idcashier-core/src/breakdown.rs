//! # Breakdown & Allocation
//!
//! The single place where the discount-before-tax rule is encoded.
//!
//! ## Order of Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines ──► subtotal = Σ unit_price × quantity                           │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           discount = subtotal × discount% / 100                         │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           taxable  = subtotal − discount                                │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           tax      = taxable × tax% / 100      (never subtotal × tax%) │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           total    = taxable + tax                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart summary, thermal receipt, A4 invoice, report row and export row all
//! recompute from the same three inputs `(lines, discount%, tax%)` through
//! [`compute_breakdown`]; none of them trusts a cached nominal amount.
//!
//! ## Allocation
//! Report rows need a per-line discount/tax even though both are sale-level
//! percentages. [`compute_line_allocation`] splits the sale amounts by each
//! line's share of the subtotal. The result is an *allocation*, not an
//! independently computed fact about the line: per-line profit derived from
//! it is only meaningful in aggregate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Percent};

// =============================================================================
// Line Abstraction
// =============================================================================

/// Anything that contributes `unit_price × quantity` to a subtotal.
///
/// Implemented by cart lines, persisted sale lines and report rows so that
/// one calculator serves every rendering surface.
pub trait LineAmount {
    /// Price per unit at the time the line was created.
    fn unit_price(&self) -> Money;

    /// Quantity on the line.
    fn quantity(&self) -> i64;

    /// `unit_price × quantity`.
    fn line_subtotal(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity())
    }
}

impl<T: LineAmount + ?Sized> LineAmount for &T {
    fn unit_price(&self) -> Money {
        (**self).unit_price()
    }

    fn quantity(&self) -> i64 {
        (**self).quantity()
    }
}

// =============================================================================
// Monetary Breakdown
// =============================================================================

/// The derived `{subtotal, discount, tax, total}` value object.
///
/// ## Invariants
/// - `discount_amount = subtotal × discount_percent / 100`
/// - `taxable_amount  = subtotal − discount_amount`
/// - `tax_amount      = taxable_amount × tax_percent / 100`
/// - `total           = taxable_amount + tax_amount`
///
/// All fields are exact; rounding is left to the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MonetaryBreakdown {
    pub subtotal: Money,
    pub discount_percent: Percent,
    pub discount_amount: Money,
    pub taxable_amount: Money,
    pub tax_percent: Percent,
    pub tax_amount: Money,
    pub total: Money,
}

impl MonetaryBreakdown {
    /// Builds the breakdown when only the subtotal is known.
    ///
    /// ## Example
    /// ```rust
    /// use idcashier_core::breakdown::MonetaryBreakdown;
    /// use idcashier_core::money::{Money, Percent};
    ///
    /// let b = MonetaryBreakdown::from_subtotal(
    ///     Money::from_rupiah(100_000),
    ///     Percent::from_int(10),
    ///     Percent::from_int(11),
    /// );
    /// assert_eq!(b.discount_amount, Money::from_rupiah(10_000));
    /// assert_eq!(b.taxable_amount, Money::from_rupiah(90_000));
    /// assert_eq!(b.tax_amount, Money::from_rupiah(9_900));
    /// assert_eq!(b.total, Money::from_rupiah(99_900));
    /// ```
    pub fn from_subtotal(subtotal: Money, discount_percent: Percent, tax_percent: Percent) -> Self {
        let discount_amount = subtotal.percent_of(discount_percent);
        let taxable_amount = subtotal - discount_amount;
        let tax_amount = taxable_amount.percent_of(tax_percent);

        MonetaryBreakdown {
            subtotal,
            discount_percent,
            discount_amount,
            taxable_amount,
            tax_percent,
            tax_amount,
            total: taxable_amount + tax_amount,
        }
    }

    /// The total as it is persisted on a sale header (whole Rupiah).
    pub fn rounded_total(&self) -> Money {
        self.total.round_rupiah()
    }
}

/// Computes the breakdown for a set of lines and two (already clamped)
/// percentages.
///
/// Pure and total: an empty line set yields an all-zero breakdown, and out of
/// range percentages are the caller's responsibility (see
/// [`crate::validation::clamp_discount_percent`]).
///
/// ## Example
/// ```rust
/// use idcashier_core::breakdown::compute_breakdown;
/// use idcashier_core::money::{Money, Percent};
/// use idcashier_core::types::CartLine;
///
/// let lines = vec![
///     CartLine::new("p1", "Kopi", None, Money::from_rupiah(10_000), 2),
///     CartLine::new("p2", "Roti", None, Money::from_rupiah(5_000), 1),
/// ];
/// let b = compute_breakdown(&lines, Percent::from_int(10), Percent::from_int(5));
/// assert_eq!(b.subtotal, Money::from_rupiah(25_000));
/// assert_eq!(b.total, Money::from_rupiah(23_625));
/// ```
pub fn compute_breakdown<L: LineAmount>(
    lines: &[L],
    discount_percent: Percent,
    tax_percent: Percent,
) -> MonetaryBreakdown {
    let subtotal: Money = lines.iter().map(LineAmount::line_subtotal).sum();
    MonetaryBreakdown::from_subtotal(subtotal, discount_percent, tax_percent)
}

// =============================================================================
// Per-Line Allocation
// =============================================================================

/// A sale-level discount/tax distributed onto one line by subtotal share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PerLineAllocation {
    pub line_subtotal: Money,
    /// `line_subtotal / sale.subtotal`, or 0 when the sale subtotal is 0.
    #[ts(type = "number")]
    pub line_ratio: Decimal,
    pub line_discount: Money,
    pub line_tax: Money,
    pub line_total: Money,
}

/// Allocates the sale's discount and tax to one of its lines.
///
/// ## Division by Zero
/// A sale whose subtotal is zero (no valid lines, or every line filtered
/// out) gives `line_ratio = 0`, so `line_total` collapses to the line's own
/// subtotal instead of producing an error.
///
/// ## Example
/// ```rust
/// use idcashier_core::breakdown::{compute_breakdown, compute_line_allocation};
/// use idcashier_core::money::{Money, Percent};
/// use idcashier_core::types::CartLine;
///
/// let lines = vec![
///     CartLine::new("p1", "Kopi", None, Money::from_rupiah(10_000), 2),
///     CartLine::new("p2", "Roti", None, Money::from_rupiah(5_000), 1),
/// ];
/// let sale = compute_breakdown(&lines, Percent::from_int(10), Percent::from_int(5));
///
/// let first = compute_line_allocation(&lines[0], &sale);
/// assert_eq!(first.line_discount, Money::from_rupiah(2_000));
/// assert_eq!(first.line_tax, Money::from_rupiah(900));
/// assert_eq!(first.line_total, Money::from_rupiah(18_900));
/// ```
pub fn compute_line_allocation<L: LineAmount>(line: &L, sale: &MonetaryBreakdown) -> PerLineAllocation {
    allocate_subtotal(line.line_subtotal(), sale)
}

/// Same as [`compute_line_allocation`] for a bare line subtotal.
pub fn allocate_subtotal(line_subtotal: Money, sale: &MonetaryBreakdown) -> PerLineAllocation {
    let line_ratio = if sale.subtotal.is_zero() {
        Decimal::ZERO
    } else {
        line_subtotal
            .amount()
            .checked_div(sale.subtotal.amount())
            .unwrap_or_default()
    };

    let line_discount = sale.discount_amount.scale(line_ratio);
    let line_tax = sale.tax_amount.scale(line_ratio);

    PerLineAllocation {
        line_subtotal,
        line_ratio,
        line_discount,
        line_tax,
        line_total: line_subtotal - line_discount + line_tax,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
