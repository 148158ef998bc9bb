//! # Error Types
//!
//! Domain-specific error types for idcashier-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  idcashier-core errors (this file)                                     │
//! │  ├── CoreError        - Cart and stock rule violations                 │
//! │  ├── CheckoutError    - Pre-payment validation, one rule per variant  │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  idcashier-client errors (separate crate)                              │
//! │  └── ClientError      - Backend/auth/network failures                  │
//! │                                                                         │
//! │  App errors                                                             │
//! │  └── ApiError         - What the user sees (code + message)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Notification           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are Indonesian where the shop floor reads them directly.

use thiserror::Error;

use crate::money::{Money, Percent};

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and catalog rule violations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// No loaded product matches the id or barcode.
    #[error("Produk tidak ditemukan: {0}")]
    ProductNotFound(String),

    /// Optimistic stock pre-check failed.
    ///
    /// ## When This Occurs
    /// ```text
    /// Cart line (qty: 5)
    ///      │
    ///      ▼
    /// Last-known stock: 3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Kopi", available: 3, requested: 5 }
    /// ```
    /// The check uses the product list loaded with the page and may be stale.
    /// The backend re-checks at commit time.
    #[error("Stok tidak mencukupi untuk {name}. Tersedia: {available}, Diminta: {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cart has reached the maximum number of distinct lines.
    #[error("Keranjang tidak boleh lebih dari {max} item")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the per-line maximum.
    #[error("Jumlah {requested} melebihi batas maksimum ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Product is not in the cart.
    #[error("Item tidak ada di keranjang: {0}")]
    ItemNotInCart(String),

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Checkout validation failures, rejected before any remote call.
///
/// Variants are listed in the order [`crate::validation::validate_checkout`]
/// evaluates them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckoutError {
    #[error("Keranjang masih kosong")]
    EmptyCart,

    #[error("Jumlah pembayaran kurang dari total ({total})")]
    InsufficientPayment { total: Money, payment: Money },

    #[error("Diskon tidak boleh lebih dari 100% (diberikan {0})")]
    DiscountTooHigh(Percent),

    #[error("Pajak tidak boleh negatif (diberikan {0})")]
    NegativeTax(Percent),

    #[error("Total transaksi harus lebih dari nol")]
    NonPositiveTotal(Money),

    #[error("Jumlah tidak valid untuk {name}: {quantity}")]
    InvalidQuantity { name: String, quantity: i64 },

    #[error("Pelanggan yang dipilih tidak valid")]
    InvalidCustomer(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} wajib diisi")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} minimal {min} karakter")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} maksimal {max} karakter")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} harus di antara {min} dan {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} harus lebih dari nol")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("Format {field} tidak valid: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Convenience constructor for required field errors.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required { field: field.into() }
    }

    /// Convenience constructor for invalid format errors.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
