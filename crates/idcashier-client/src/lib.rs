//! # idcashier-client: Backend Client for idCashier
//!
//! Every remote call the point-of-sale makes goes through [`SupabaseClient`].
//! The backend owns persistence, authentication and row-level security;
//! this crate only shapes requests and classifies failures.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Backend Client Layout                             │
//! │                                                                         │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────┐  │
//! │  │  auth    │ │ catalog  │ │  sales   │ │  users   │ │ subscription │  │
//! │  │ sign-in  │ │ products │ │ header + │ │ staff +  │ │  dashboard   │  │
//! │  │ profile  │ │ category │ │ lines    │ │ developer│ │              │  │
//! │  └────┬─────┘ └────┬─────┘ └────┬─────┘ └────┬─────┘ └──────┬───────┘  │
//! │       └────────────┴─────┬──────┴────────────┴──────────────┘          │
//! │                          ▼                                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SupabaseClient (client.rs)                                      │   │
//! │  │  Query builder • single-row fallback • function error bodies    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  config.rs   BackendConfig: defaults → TOML → environment              │
//! │  session.rs  Session + local JWT expiry check                          │
//! │  retry.rs    retry_with_backoff for the report loader                  │
//! │  error.rs    ClientError classification                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use idcashier_client::{BackendConfig, SupabaseClient};
//!
//! let client = SupabaseClient::new(BackendConfig::load(None)?)?;
//! let session = client.login("sari@toko.id", "rahasia").await?;
//! let products = client.list_products(&session).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod retry;
pub mod sales;
pub mod session;
pub mod subscription;
pub mod users;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{AuthUser, Registration};
pub use client::{Query, SupabaseClient};
pub use config::BackendConfig;
pub use error::{ClientError, ClientResult};
pub use retry::{retry_with_backoff, RetryExhausted};
pub use session::Session;
pub use users::{AccountSubscription, ManagedAccount, OwnerRegistration};
