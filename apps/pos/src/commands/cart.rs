//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│  Sale +  │       │
//! │  │  Cart    │     │          │     │ entered  │     │ Receipt  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                │             │
//! │                   add_to_cart       set_payment     process_payment    │
//! │                   scan_barcode      set_discount    (sale.rs)          │
//! │                   set_quantity      set_tax              │             │
//! │                        │                                 ▼             │
//! │                   clear_cart ─────────────────────► back to empty      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use idcashier_core::permissions::Capability;
use idcashier_core::validation::ClampWarning;
use idcashier_core::{Money, Percent};
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult, Notification};
use crate::i18n::{Language, MessageKey};
use crate::state::{CartState, CartSummary, CatalogState, SessionState};

/// Cart after a discount or tax change, with the clamp warning if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateUpdate {
    pub summary: CartSummary,
    pub warning: Option<ClampWarning>,
}

/// The toast for a clamp warning.
pub fn clamp_notification(language: Language, warning: ClampWarning) -> Notification {
    let key = match warning {
        ClampWarning::DiscountAboveMax => MessageKey::DiscountClamped,
        ClampWarning::DiscountNegative => MessageKey::DiscountNegativeClamped,
        ClampWarning::TaxNegative => MessageKey::TaxClamped,
    };
    Notification::warning(language, key)
}

pub fn get_cart(cart: &CartState) -> CartSummary {
    debug!("get_cart command");
    cart.summary()
}

/// Adds one unit of a loaded product.
pub fn add_to_cart(cart: &CartState, catalog: &CatalogState, product_id: &str) -> ApiResult<CartSummary> {
    debug!(product_id, "add_to_cart command");
    let product = catalog
        .product(product_id)
        .ok_or_else(|| ApiError::not_found("Produk", product_id))?;
    cart.with_cart_mut(|c| c.add_product(&product))?;
    Ok(cart.summary())
}

pub fn scan_barcode(cart: &CartState, catalog: &CatalogState, code: &str) -> ApiResult<CartSummary> {
    debug!(code, "scan_barcode command");
    let products = catalog.products();
    cart.with_cart_mut(|c| c.scan_barcode(code, &products))?;
    Ok(cart.summary())
}

pub fn set_quantity(cart: &CartState, product_id: &str, quantity: i64) -> ApiResult<CartSummary> {
    debug!(product_id, quantity, "set_quantity command");
    cart.with_cart_mut(|c| c.set_quantity(product_id, quantity))?;
    Ok(cart.summary())
}

pub fn increment_item(cart: &CartState, product_id: &str) -> ApiResult<CartSummary> {
    cart.with_cart_mut(|c| c.increment(product_id))?;
    Ok(cart.summary())
}

pub fn decrement_item(cart: &CartState, product_id: &str) -> ApiResult<CartSummary> {
    cart.with_cart_mut(|c| c.decrement(product_id))?;
    Ok(cart.summary())
}

pub fn remove_from_cart(cart: &CartState, product_id: &str) -> ApiResult<CartSummary> {
    debug!(product_id, "remove_from_cart command");
    cart.with_cart_mut(|c| c.remove(product_id))?;
    Ok(cart.summary())
}

pub fn clear_cart(cart: &CartState) -> CartSummary {
    debug!("clear_cart command");
    cart.with_cart_mut(|c| c.clear());
    cart.summary()
}

/// Needs `canApplyDiscount`. Out-of-range input is clamped, not rejected.
pub fn set_discount(session: &SessionState, cart: &CartState, percent: Percent) -> ApiResult<RateUpdate> {
    session.require_capability(Capability::CanApplyDiscount)?;
    let warning = cart.with_cart_mut(|c| c.set_discount(percent));
    Ok(RateUpdate {
        summary: cart.summary(),
        warning,
    })
}

/// Needs `canApplyTax`.
pub fn set_tax(session: &SessionState, cart: &CartState, percent: Percent) -> ApiResult<RateUpdate> {
    session.require_capability(Capability::CanApplyTax)?;
    let warning = cart.with_cart_mut(|c| c.set_tax(percent));
    Ok(RateUpdate {
        summary: cart.summary(),
        warning,
    })
}

/// `None` selects the walk-in customer. Membership is checked at checkout.
pub fn select_customer(cart: &CartState, customer_id: Option<String>) -> CartSummary {
    cart.with_cart_mut(|c| c.set_customer(customer_id));
    cart.summary()
}

pub fn set_payment(cart: &CartState, payment: Money) -> CartSummary {
    cart.with_cart_mut(|c| c.set_payment(payment));
    cart.summary()
}
