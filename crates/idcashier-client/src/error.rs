//! # Client Error Types
//!
//! Every failure of a remote call, classified by origin.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │ Authentication  │  │  Row Visibility │  │      Transport          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ InvalidCreds    │  │  NotFound       │  │  ServerNotResponding    │ │
//! │  │ SessionExpired  │  │  DataInconsist. │  │                         │ │
//! │  │ NotAuthenticated│  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │ Business Rules  │  │    Backend      │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │InsufficientStock│  │  Rejected       │  │  Config                 │ │
//! │  │ InvalidInput    │  │  {status, msg}  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Authentication errors are never retried. Only transport failures and
//! 5xx rejections are.

use idcashier_core::ValidationError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// PostgREST code for "zero or many rows where exactly one was requested".
pub const PGRST_SINGLE_ROW: &str = "PGRST116";

/// PostgREST code for an expired or invalid JWT.
pub const PGRST_JWT_EXPIRED: &str = "PGRST301";

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Authentication
    // =========================================================================
    #[error("Email atau password salah")]
    InvalidCredentials,

    #[error("Sesi telah berakhir, silakan login kembali")]
    SessionExpired,

    #[error("Tidak terautentikasi")]
    NotAuthenticated,

    // =========================================================================
    // Row Visibility
    // =========================================================================
    #[error("{entity} tidak ditemukan: {id}")]
    NotFound { entity: String, id: String },

    /// More than one row came back where exactly one was expected.
    #[error("Data tidak konsisten: {count} baris {entity} ditemukan")]
    DataInconsistency { entity: String, count: usize },

    // =========================================================================
    // Transport
    // =========================================================================
    /// No response, a non-JSON response or a missing body.
    #[error("Server tidak merespons dengan benar")]
    ServerNotResponding(String),

    // =========================================================================
    // Backend Business Rules
    // =========================================================================
    #[error("{0}")]
    InsufficientStock(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    // =========================================================================
    // Configuration
    // =========================================================================
    #[error("Konfigurasi tidak valid: {0}")]
    Config(String),
}

impl ClientError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ClientError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Transport failures and 5xx rejections.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::ServerNotResponding(_) => true,
            ClientError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidCredentials | ClientError::SessionExpired | ClientError::NotAuthenticated
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Classifies a failed response from a token-bound call.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed.message().unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                body.trim().to_string()
            }
        });

        if parsed.code.as_deref() == Some(PGRST_JWT_EXPIRED)
            || status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
        {
            return ClientError::SessionExpired;
        }

        Self::from_message(status.as_u16(), message)
    }

    /// Maps a backend message onto a business-rule variant when it names one.
    ///
    /// Business rules are matched before the auth wording, so a stock
    /// message is never read as an expired session.
    pub fn from_message(status: u16, message: String) -> Self {
        if message.contains("Stok tidak mencukupi") {
            ClientError::InsufficientStock(message)
        } else if message.contains("Data input tidak valid") || message.contains("Invalid input") {
            ClientError::InvalidInput(message)
        } else if is_auth_message(&message) {
            ClientError::SessionExpired
        } else {
            ClientError::Rejected { status, message }
        }
    }
}

/// Messages the backend uses for authorization failures.
pub fn is_auth_message(message: &str) -> bool {
    ["Akses tidak sah", "Invalid token", "JWT expired"]
        .iter()
        .any(|needle| message.contains(needle))
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::InvalidInput(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::ServerNotResponding(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::ServerNotResponding(format!("invalid JSON: {err}"))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

// =============================================================================
// Error Bodies
// =============================================================================

/// Union of the error shapes returned by PostgREST, GoTrue and functions.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorBody {
    pub(crate) fn message(&self) -> Option<String> {
        let error_text = self.error.as_ref().and_then(|e| match e {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(o) => o.get("message").and_then(|m| m.as_str()).map(str::to_string),
            _ => None,
        });

        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or(error_text)
            .filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::ServerNotResponding("reset".into()).is_retryable());
        assert!(ClientError::Rejected {
            status: 503,
            message: "down".into()
        }
        .is_retryable());

        assert!(!ClientError::Rejected {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!ClientError::SessionExpired.is_retryable());
        assert!(!ClientError::InvalidCredentials.is_retryable());
    }

    #[test]
    fn test_auth_status_maps_to_session_expired() {
        let err = ClientError::from_response(StatusCode::UNAUTHORIZED, r#"{"message":"JWT expired"}"#);
        assert!(matches!(err, ClientError::SessionExpired));

        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"code":"PGRST301","message":"JWSError"}"#,
        );
        assert!(err.is_auth_error());

        let err = ClientError::from_response(StatusCode::BAD_REQUEST, r#"{"error":"Akses tidak sah"}"#);
        assert!(err.is_auth_error());
    }

    #[test]
    fn test_business_messages() {
        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Stok tidak mencukupi untuk Kopi"}"#,
        );
        assert!(matches!(err, ClientError::InsufficientStock(_)));

        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Stok tidak mencukupi untuk Kopi. Tersedia: 403, Diminta: 500"}"#,
        );
        assert!(matches!(err, ClientError::InsufficientStock(_)));
        assert!(!err.is_auth_error());

        let err = ClientError::from_response(StatusCode::BAD_REQUEST, r#"{"message":"Produk Oli 4011 sudah ada"}"#);
        assert!(matches!(err, ClientError::Rejected { status: 400, .. }));

        let err = ClientError::from_response(StatusCode::BAD_REQUEST, r#"{"error":"Invalid input data"}"#);
        assert!(matches!(err, ClientError::InvalidInput(_)));

        let err = ClientError::from_response(StatusCode::CONFLICT, r#"{"message":"duplicate key"}"#);
        match err {
            ClientError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate key");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body_is_kept_as_message() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "upstream error");
        assert_eq!(err.to_string(), "upstream error");
        assert!(err.is_retryable());

        let err = ClientError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::DataInconsistency {
            entity: "users".into(),
            count: 2,
        };
        assert!(err.to_string().contains("2"));
        assert_eq!(ClientError::not_found("users", "a@b.c").to_string(), "users tidak ditemukan: a@b.c");
    }
}
