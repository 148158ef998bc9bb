//! # Validation Module
//!
//! Input clamping, checkout rules and field validators.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Input (as the user types)                                    │
//! │  ├── clamp_discount_percent / clamp_tax_percent                        │
//! │  └── Warn, never reject                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Action (before any remote call)                              │
//! │  ├── validate_checkout: fixed rule order, first failure wins           │
//! │  └── check_stock: optimistic, may be stale                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  ├── Row-level security                                                │
//! │  └── Stock check at commit time (authoritative)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::breakdown::MonetaryBreakdown;
use crate::error::{CheckoutError, CoreError, ValidationError};
use crate::money::{Money, Percent};
use crate::types::{CartLine, Customer, Product};
use crate::{MAX_CART_ITEMS, MAX_DISCOUNT_PERCENT, MAX_ITEM_QUANTITY, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Clamping
// =============================================================================

/// Why an input value was clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ClampWarning {
    /// Discount above 100% was lowered to 100%.
    DiscountAboveMax,
    /// Negative discount was raised to 0%.
    DiscountNegative,
    /// Negative tax was raised to 0%.
    TaxNegative,
}

/// A value after clamping, plus the warning to show if it changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped<T> {
    pub value: T,
    pub warning: Option<ClampWarning>,
}

impl<T> Clamped<T> {
    fn unchanged(value: T) -> Self {
        Clamped { value, warning: None }
    }

    fn warned(value: T, warning: ClampWarning) -> Self {
        Clamped {
            value,
            warning: Some(warning),
        }
    }
}

/// Clamps a discount percentage into `[0, 100]`.
///
/// ## Example
/// ```rust
/// use idcashier_core::money::Percent;
/// use idcashier_core::validation::{clamp_discount_percent, ClampWarning};
///
/// let c = clamp_discount_percent(Percent::from_int(150));
/// assert_eq!(c.value, Percent::from_int(100));
/// assert_eq!(c.warning, Some(ClampWarning::DiscountAboveMax));
/// ```
pub fn clamp_discount_percent(input: Percent) -> Clamped<Percent> {
    let max = Decimal::from(MAX_DISCOUNT_PERCENT);
    if input.value() > max {
        Clamped::warned(Percent::new(max), ClampWarning::DiscountAboveMax)
    } else if input.value() < Decimal::ZERO {
        Clamped::warned(Percent::zero(), ClampWarning::DiscountNegative)
    } else {
        Clamped::unchanged(input)
    }
}

/// Clamps a tax percentage to `>= 0`.
pub fn clamp_tax_percent(input: Percent) -> Clamped<Percent> {
    if input.value() < Decimal::ZERO {
        Clamped::warned(Percent::zero(), ClampWarning::TaxNegative)
    } else {
        Clamped::unchanged(input)
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Everything the checkout rules look at.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutRequest<'a> {
    pub lines: &'a [CartLine],
    pub breakdown: &'a MonetaryBreakdown,
    pub payment: Money,
    /// `None` for the walk-in customer.
    pub customer_id: Option<&'a str>,
    /// Customers loaded with the page.
    pub customers: &'a [Customer],
}

/// Runs the checkout rules in their fixed order; the first failure wins.
///
/// ## Rule Order
/// 1. cart not empty
/// 2. payment ≥ total (the rounded total that will be persisted)
/// 3. discount ≤ 100%
/// 4. tax ≥ 0%
/// 5. total > 0
/// 6. every quantity > 0
/// 7. selected customer is one of the loaded customers
///
/// ## Example
/// ```rust
/// use idcashier_core::breakdown::compute_breakdown;
/// use idcashier_core::error::CheckoutError;
/// use idcashier_core::money::{Money, Percent};
/// use idcashier_core::types::CartLine;
/// use idcashier_core::validation::{validate_checkout, CheckoutRequest};
///
/// let lines = vec![CartLine::new("p1", "Kopi", None, Money::from_rupiah(10_000), 1)];
/// let b = compute_breakdown(&lines, Percent::zero(), Percent::zero());
/// let req = CheckoutRequest {
///     lines: &lines,
///     breakdown: &b,
///     payment: Money::from_rupiah(5_000),
///     customer_id: None,
///     customers: &[],
/// };
/// assert!(matches!(validate_checkout(&req), Err(CheckoutError::InsufficientPayment { .. })));
/// ```
pub fn validate_checkout(req: &CheckoutRequest<'_>) -> Result<(), CheckoutError> {
    if req.lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let total = req.breakdown.rounded_total();
    if req.payment < total {
        return Err(CheckoutError::InsufficientPayment {
            total,
            payment: req.payment,
        });
    }

    if req.breakdown.discount_percent.value() > Decimal::from(MAX_DISCOUNT_PERCENT) {
        return Err(CheckoutError::DiscountTooHigh(req.breakdown.discount_percent));
    }

    if req.breakdown.tax_percent.value() < Decimal::ZERO {
        return Err(CheckoutError::NegativeTax(req.breakdown.tax_percent));
    }

    if !total.is_positive() {
        return Err(CheckoutError::NonPositiveTotal(total));
    }

    if let Some(line) = req.lines.iter().find(|l| l.quantity <= 0) {
        return Err(CheckoutError::InvalidQuantity {
            name: line.name.clone(),
            quantity: line.quantity,
        });
    }

    if let Some(id) = req.customer_id {
        if !req.customers.iter().any(|c| c.id == id) {
            return Err(CheckoutError::InvalidCustomer(id.to_string()));
        }
    }

    Ok(())
}

/// Optimistic stock pre-check against the last-loaded product list.
///
/// Lines whose product is not in the list are skipped; the backend remains
/// the authority at commit time.
pub fn check_stock(lines: &[CartLine], products: &[Product]) -> Result<(), CoreError> {
    for line in lines {
        let Some(product) = products.iter().find(|p| p.id == line.product_id) else {
            continue;
        };
        if line.quantity > product.stock {
            return Err(CoreError::InsufficientStock {
                name: line.name.clone(),
                available: product.stock,
                requested: line.quantity,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Jumlah".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "Jumlah".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Rejects adding a new distinct line to a full cart.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "Item keranjang".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }
    Ok(())
}

/// Validates a display name (product, category, supplier, customer, user).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }
    if trimmed.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }
    Ok(())
}

/// Trims and lower-cases an email, then checks its basic shape.
///
/// ## Example
/// ```rust
/// use idcashier_core::validation::normalize_email;
///
/// assert_eq!(normalize_email("  Owner@Toko.ID ").unwrap(), "owner@toko.id");
/// assert!(normalize_email("no-at-sign").is_err());
/// ```
pub fn normalize_email(email: &str) -> ValidationResult<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ValidationError::required("Email"));
    }

    let valid = match normalized.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || normalized.contains(char::is_whitespace) {
        return Err(ValidationError::invalid_format("Email", "alamat email tidak valid"));
    }

    Ok(normalized)
}

/// Passwords must be at least [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("Password"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "Password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// A customer added at the register needs a name and a phone number.
pub fn validate_customer_input(name: &str, phone: Option<&str>) -> ValidationResult<()> {
    validate_name("Nama pelanggan", name)?;
    match phone.map(str::trim) {
        Some(p) if !p.is_empty() => Ok(()),
        _ => Err(ValidationError::required("Telepon")),
    }
}

/// Prices and costs must be non-negative.
pub fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
