//! # idCashier Point of Sale
//!
//! Application layer of the idCashier client: the state container, one
//! command per user action, and localized notifications. The `idcashier`
//! binary is a thin command-line shell over this library.
//!
//! ## Module Organization
//! ```text
//! idcashier_pos/
//! ├── lib.rs          ◄─── You are here (App bundle, tracing setup)
//! ├── main.rs         ◄─── CLI entry point
//! ├── state/
//! │   ├── mod.rs         ◄─── State type exports
//! │   ├── session.rs     ◄─── Signed-in session (watch channel)
//! │   ├── cart.rs        ◄─── Cart + payment-in-flight guard
//! │   ├── catalog.rs     ◄─── Last-loaded products and customers
//! │   └── preferences.rs ◄─── Token, page, language, settings
//! ├── commands/       ◄─── auth, cart, sale, catalog, report, users, ...
//! ├── i18n.rs         ◄─── Message catalogue (id, en, zh)
//! └── error.rs        ◄─── ApiError, Notification
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()            EnvFilter, RUST_LOG overrides default     │
//! │  2. BackendConfig::load()     defaults → config.toml → environment      │
//! │  3. App::new(config)          client + empty state + preference store   │
//! │  4. restore_session()         stored token → session, or signed out     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod i18n;
pub mod state;

use idcashier_client::{BackendConfig, SupabaseClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use error::{ApiError, ApiResult, ErrorCode, Notification, NotificationVariant};
pub use i18n::{translate, Language, MessageKey};
use state::{CartState, CatalogState, Preferences, SessionState};

/// Every piece of state, owned in one place.
///
/// Commands still take the individual parts; the bundle only saves the
/// shell from wiring them up.
#[derive(Debug)]
pub struct App {
    pub client: SupabaseClient,
    pub session: SessionState,
    pub cart: CartState,
    pub catalog: CatalogState,
    pub preferences: Preferences,
}

impl App {
    /// Builds the app with file-backed preferences under the configured
    /// data directory.
    pub fn new(config: BackendConfig) -> ApiResult<Self> {
        let preferences = Preferences::open(config.data_dir().map(|dir| dir.join("preferences")))?;
        Self::with_preferences(config, preferences)
    }

    pub fn with_preferences(config: BackendConfig, preferences: Preferences) -> ApiResult<Self> {
        let client = SupabaseClient::new(config)?;
        info!(backend = client.config().base_url(), "App initialized");
        Ok(App {
            client,
            session: SessionState::new(),
            cart: CartState::new(),
            catalog: CatalogState::new(),
            preferences,
        })
    }

    pub fn developer_emails(&self) -> &[String] {
        self.client.config().developer_emails()
    }

    /// UI language, falling back to Indonesian if the store can't be read.
    pub fn language(&self) -> Language {
        self.preferences.language().unwrap_or_default()
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Everything at debug
/// - `RUST_LOG=idcashier=trace` - Trace for idcashier crates only
/// - Default: `info,idcashier=debug,reqwest=warn`
///
/// Logs go to stderr so JSON on stdout stays machine-readable.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,idcashier=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_rejects_invalid_backend_url() {
        let config = BackendConfig::new("ftp://example.com", "anon-key");
        let err = App::with_preferences(config, Preferences::in_memory()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_app_uses_configured_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BackendConfig::new("https://demo.supabase.co", "anon-key");
        config.app.data_dir = Some(dir.path().to_path_buf());

        let app = App::new(config).unwrap();
        app.preferences.set_language(Language::Zh).unwrap();
        assert_eq!(app.language(), Language::Zh);
        assert!(dir.path().join("preferences").exists());
    }
}
