//! # idcashier-core: Pure Business Logic for idCashier
//!
//! Everything in idCashier that computes a number (or decides whether a
//! button is enabled) lives here, as pure functions with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        idCashier Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/pos (state + commands + CLI)            │   │
//! │  │    Session ──► Cart ──► Checkout ──► Receipt ──► Reports        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ idcashier-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │ breakdown │  │permissions│  │ validation│  │   │
//! │  │   │  Money    │  │ discount  │  │  Role     │  │  clamping │  │   │
//! │  │   │  Percent  │  │ then tax  │  │ Capability│  │  checkout │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  receipt  │  │  report   │  │subscription│ │   retry   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              idcashier-client (Supabase REST/Auth/Functions)    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact Rupiah `Money` and `Percent`
//! - [`format`] - id-ID currency rendering
//! - [`breakdown`] - Discount-before-tax calculator and per-line allocation
//! - [`permissions`] - Role resolution and capability gating
//! - [`types`] - Backend rows and input payloads
//! - [`validation`] - Clamping, checkout rules, field checks
//! - [`receipt`] - Thermal receipt and A4 invoice view models
//! - [`report`] - Report rows, filters, statistics, export rows
//! - [`subscription`] - Subscription status and period math
//! - [`retry`] - Backoff schedule as a pure function
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use idcashier_core::breakdown::compute_breakdown;
//! use idcashier_core::format::format_rupiah;
//! use idcashier_core::money::{Money, Percent};
//! use idcashier_core::types::CartLine;
//!
//! let cart = vec![CartLine::new("p1", "Kopi Susu", None, Money::from_rupiah(100_000), 1)];
//! let b = compute_breakdown(&cart, Percent::from_int(10), Percent::from_int(11));
//!
//! assert_eq!(format_rupiah(b.total, false), "Rp 99.900");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod breakdown;
pub mod error;
pub mod format;
pub mod money;
pub mod permissions;
pub mod receipt;
pub mod report;
pub mod retry;
pub mod subscription;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use breakdown::{compute_breakdown, compute_line_allocation, LineAmount, MonetaryBreakdown, PerLineAllocation};
pub use error::{CheckoutError, CoreError, CoreResult, ValidationError};
pub use money::{Money, Percent};
pub use permissions::{resolve_permissions, CapabilitySet, Page, Permissions, Role};
pub use receipt::{InvoiceView, ReceiptSettings, ReceiptView, StoreSettings};
pub use report::{ReportData, ReportFilter, ReportRow, ReportStats};
pub use retry::RetryPolicy;
pub use subscription::SubscriptionStatus;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Display name of the walk-in customer (a sale with `customer_id = null`).
pub const WALK_IN_CUSTOMER_NAME: &str = "Umum";

/// Store name used until the owner configures one.
pub const DEFAULT_STORE_NAME: &str = "Toko";

/// Maximum distinct lines in a single cart
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in cart
///
/// ## Business Reason
/// Catches a mistyped quantity (1000 instead of 10) before payment.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Upper bound for a sale-level discount percentage.
pub const MAX_DISCOUNT_PERCENT: i64 = 100;

/// Minimum password length accepted by sign-up and password change.
pub const MIN_PASSWORD_LENGTH: usize = 6;
