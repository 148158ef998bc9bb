//! # Cart State
//!
//! The in-progress sale on the Sales page.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Multiple commands may access/modify the cart
//! 2. Only one command should modify the cart at a time
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  User Action              Command                 Cart State Change     │
//! │  ───────────              ───────                 ─────────────────     │
//! │                                                                         │
//! │  Click Product ──────────► add_to_cart() ───────► lines.push / qty+1   │
//! │  Scan Barcode ───────────► scan_barcode() ──────► lines.push / qty+1   │
//! │  Change Quantity ────────► set_quantity() ──────► qty = n (≤0 removes) │
//! │  Discount / Tax ─────────► set_discount() ──────► clamped percent      │
//! │  Pick Customer ──────────► select_customer() ───► customer_id          │
//! │  Pay ────────────────────► process_payment() ───► clear() on success   │
//! │                                                                         │
//! │  The breakdown is never stored: it is recomputed from the lines.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use idcashier_core::validation::{clamp_discount_percent, clamp_tax_percent, validate_cart_size, ClampWarning};
use idcashier_core::{
    compute_breakdown, CartLine, CoreError, CoreResult, MonetaryBreakdown, Money, Percent, Product, MAX_CART_ITEMS,
    MAX_ITEM_QUANTITY,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product increases quantity)
/// - Quantity is in `1..=999`; setting 0 or less removes the line
/// - At most 100 distinct lines
/// - `discount` is in `[0, 100]` and `tax` is `>= 0` after clamping
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub discount: Percent,
    pub tax: Percent,
    /// `None` is the walk-in customer.
    pub customer_id: Option<String>,
    pub payment: Money,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds one unit of a product at its current price.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let qty = line.quantity + 1;
            if qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = qty;
            return Ok(());
        }

        if validate_cart_size(self.lines.len()).is_err() {
            return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
        }

        self.lines.push(CartLine::from_product(product));
        Ok(())
    }

    /// Adds the product whose barcode matches exactly.
    pub fn scan_barcode(&mut self, code: &str, products: &[Product]) -> CoreResult<()> {
        let product = products
            .iter()
            .find(|p| p.matches_barcode(code))
            .ok_or_else(|| CoreError::ProductNotFound(code.trim().to_string()))?;
        self.add_product(product)
    }

    /// Sets a line's quantity. Zero or less removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return self.remove(product_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotInCart(product_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn increment(&mut self, product_id: &str) -> CoreResult<()> {
        let qty = self.quantity_of(product_id)?;
        self.set_quantity(product_id, qty + 1)
    }

    /// Decrements a line; the last unit removes it.
    pub fn decrement(&mut self, product_id: &str) -> CoreResult<()> {
        let qty = self.quantity_of(product_id)?;
        self.set_quantity(product_id, qty - 1)
    }

    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            Err(CoreError::ItemNotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Empties the cart and resets discount, tax, customer and payment.
    pub fn clear(&mut self) {
        *self = Cart::default();
    }

    fn quantity_of(&self, product_id: &str) -> CoreResult<i64> {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .ok_or_else(|| CoreError::ItemNotInCart(product_id.to_string()))
    }

    /// Stores the clamped discount and returns the warning, if any.
    pub fn set_discount(&mut self, input: Percent) -> Option<ClampWarning> {
        let clamped = clamp_discount_percent(input);
        if let Some(w) = clamped.warning {
            warn!(input = %input, applied = %clamped.value, warning = ?w, "Discount clamped");
        }
        self.discount = clamped.value;
        clamped.warning
    }

    pub fn set_tax(&mut self, input: Percent) -> Option<ClampWarning> {
        let clamped = clamp_tax_percent(input);
        if let Some(w) = clamped.warning {
            warn!(input = %input, applied = %clamped.value, warning = ?w, "Tax clamped");
        }
        self.tax = clamped.value;
        clamped.warning
    }

    pub fn set_customer(&mut self, customer_id: Option<String>) {
        self.customer_id = customer_id.filter(|id| !id.trim().is_empty());
    }

    pub fn set_payment(&mut self, payment: Money) {
        self.payment = payment;
    }

    pub fn breakdown(&self) -> MonetaryBreakdown {
        compute_breakdown(&self.lines, self.discount, self.tax)
    }

    /// `payment − total`, negative while underpaid.
    pub fn change(&self) -> Money {
        self.payment - self.breakdown().total
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Cart plus its derived amounts, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub cart: Cart,
    pub breakdown: MonetaryBreakdown,
    pub change: Money,
    pub total_quantity: i64,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        let breakdown = cart.breakdown();
        CartSummary {
            cart: cart.clone(),
            breakdown,
            change: cart.payment - breakdown.total,
            total_quantity: cart.total_quantity(),
        }
    }
}

/// Shared cart state.
///
/// Cart operations are quick and mostly writes, so a plain `Mutex` fits. A
/// poisoned lock still yields the cart: every mutation leaves it consistent.
#[derive(Debug, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
    processing: ProcessingFlag,
}

impl CartState {
    pub fn new() -> Self {
        CartState::default()
    }

    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    pub fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone)
    }

    pub fn summary(&self) -> CartSummary {
        self.with_cart(|cart| CartSummary::from(cart))
    }

    pub fn processing(&self) -> &ProcessingFlag {
        &self.processing
    }
}

// =============================================================================
// Double-Submit Guard
// =============================================================================

/// Set while a payment is in flight.
#[derive(Debug, Default)]
pub struct ProcessingFlag(AtomicBool);

impl ProcessingFlag {
    /// Claims the flag. `None` means another payment is already running.
    pub fn try_begin(&self) -> Option<ProcessingGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProcessingGuard(&self.0))
    }

    pub fn is_processing(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the flag when dropped, on success, error or panic.
#[derive(Debug)]
pub struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
