//! # API Error Type
//!
//! Unified error type for commands, plus the notification every failure
//! becomes.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in idCashier                              │
//! │                                                                         │
//! │  Front end                   Command layer                              │
//! │  ─────────                   ─────────────                              │
//! │                                                                         │
//! │  process_payment()                                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Checkout rule? ─── CheckoutError::EmptyCart ─────┐             │  │
//! │  │         │                                         │             │  │
//! │  │         ▼                                         ▼             │  │
//! │  │  Backend failure? ─ ClientError::SessionExpired ─ ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ApiError::notification(lang) ──► { title, body, variant }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! `ApiError` serializes with a machine-readable `code` and the underlying
//! message:
//! ```json
//! { "code": "SESSION_EXPIRED", "message": "Sesi telah berakhir, silakan login kembali" }
//! ```

use idcashier_client::ClientError;
use idcashier_core::{CheckoutError, CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

use crate::i18n::{translate, Language, MessageKey};

/// Result type for commands.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned from commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Catalogue entry for the notification body, when one applies
    #[serde(skip)]
    key: Option<MessageKey>,
}

/// Error codes for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Checkout rule violated before any remote call
    CheckoutError,

    /// Cart operation failed
    CartError,

    /// Stock check failed, locally or at commit time
    InsufficientStock,

    /// Backend rejected the payload as invalid
    InvalidInput,

    /// Command needs a signed-in user
    AuthRequired,

    /// Token expired or was rejected
    SessionExpired,

    /// Wrong email or password
    InvalidCredentials,

    /// Capability or role check failed
    PermissionDenied,

    /// Backend unreachable or refused the request
    ServerError,

    /// More than one row where exactly one was expected
    DataInconsistency,

    /// Local preference storage failed
    Preferences,

    /// Anything else
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            key: None,
        }
    }

    pub(crate) fn keyed(code: ErrorCode, key: MessageKey, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            key: Some(key),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::keyed(ErrorCode::NotFound, MessageKey::NotFound, format!("{resource} tidak ditemukan: {id}"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::keyed(ErrorCode::Internal, MessageKey::Unexpected, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    pub fn auth_required() -> Self {
        ApiError::keyed(
            ErrorCode::AuthRequired,
            MessageKey::AuthenticationRequired,
            "Silakan login terlebih dahulu",
        )
    }

    pub fn permission_denied(capability: &str) -> Self {
        ApiError::keyed(
            ErrorCode::PermissionDenied,
            MessageKey::PermissionDenied,
            format!("Izin diperlukan: {capability}"),
        )
    }

    /// The catalogue entry this error maps to, if any.
    pub fn message_key(&self) -> Option<MessageKey> {
        self.key
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::AuthRequired | ErrorCode::SessionExpired | ErrorCode::InvalidCredentials
        )
    }

    /// The user-facing notification for this error.
    ///
    /// Catalogued errors use the translated text. Others carry their own
    /// message verbatim.
    pub fn notification(&self, language: Language) -> Notification {
        let body = match self.key {
            Some(key) => translate(language, key).to_string(),
            None => self.message.clone(),
        };
        Notification::error(language, body)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Conversions
// =============================================================================

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let message = err.to_string();
        match err {
            ClientError::InvalidCredentials => {
                ApiError::keyed(ErrorCode::InvalidCredentials, MessageKey::LoginFailed, message)
            }
            ClientError::SessionExpired => {
                ApiError::keyed(ErrorCode::SessionExpired, MessageKey::SessionExpired, message)
            }
            ClientError::NotAuthenticated => ApiError::auth_required(),
            ClientError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            ClientError::DataInconsistency { .. } => {
                ApiError::keyed(ErrorCode::DataInconsistency, MessageKey::DataInconsistency, message)
            }
            ClientError::ServerNotResponding(detail) => {
                tracing::error!(detail = %detail, "Backend did not respond correctly");
                ApiError::keyed(ErrorCode::ServerError, MessageKey::ServerNotResponding, message)
            }
            ClientError::InsufficientStock(_) => ApiError::new(ErrorCode::InsufficientStock, message),
            ClientError::InvalidInput(_) => ApiError::new(ErrorCode::InvalidInput, message),
            ClientError::Rejected { status, .. } => {
                tracing::error!(status, message = %message, "Backend rejected request");
                ApiError::new(ErrorCode::ServerError, message)
            }
            ClientError::Config(_) => ApiError::internal(message),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Produk", &id),
            CoreError::InsufficientStock { .. } => ApiError::new(ErrorCode::InsufficientStock, message),
            CoreError::CartTooLarge { .. } | CoreError::QuantityTooLarge { .. } | CoreError::ItemNotInCart(_) => {
                ApiError::cart(message)
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let key = match &err {
            CheckoutError::EmptyCart => MessageKey::CartEmpty,
            CheckoutError::InsufficientPayment { .. } => MessageKey::InsufficientPayment,
            CheckoutError::DiscountTooHigh(_) => MessageKey::MaxDiscount,
            CheckoutError::NegativeTax(_) => MessageKey::TaxNegative,
            CheckoutError::NonPositiveTotal(_) => MessageKey::TotalMustBePositive,
            CheckoutError::InvalidQuantity { .. } => MessageKey::InvalidQuantity,
            CheckoutError::InvalidCustomer(_) => MessageKey::InvalidCustomerSelection,
        };
        ApiError::keyed(ErrorCode::CheckoutError, key, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<PreferencesError> for ApiError {
    fn from(err: PreferencesError) -> Self {
        tracing::error!(error = %err, "Preference storage failed");
        ApiError::new(ErrorCode::Preferences, err.to_string())
    }
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    #[default]
    Default,
    Destructive,
    Success,
}

/// A transient toast: short title, descriptive body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn error(language: Language, body: impl Into<String>) -> Self {
        Notification {
            title: translate(language, MessageKey::Error).to_string(),
            body: body.into(),
            variant: NotificationVariant::Destructive,
        }
    }

    pub fn success(language: Language, key: MessageKey) -> Self {
        Notification {
            title: translate(language, MessageKey::Success).to_string(),
            body: translate(language, key).to_string(),
            variant: NotificationVariant::Success,
        }
    }

    pub fn warning(language: Language, key: MessageKey) -> Self {
        Notification {
            title: translate(language, MessageKey::Warning).to_string(),
            body: translate(language, key).to_string(),
            variant: NotificationVariant::Default,
        }
    }
}

// =============================================================================
// Preferences Error
// =============================================================================

pub type PreferencesResult<T> = Result<T, PreferencesError>;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Gagal mengakses penyimpanan lokal: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data preferensi rusak: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Direktori data aplikasi tidak ditemukan")]
    NoDataDir,
}
