//! # Backend Configuration
//!
//! Where the hosted backend lives and how to reach it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     IDCASHIER_SUPABASE_URL=https://xyz.supabase.co                     │
//! │     IDCASHIER_SUPABASE_ANON_KEY=eyJ...                                 │
//! │     IDCASHIER_DEVELOPER_EMAILS=dev@idcashier.my.id,ops@idcashier.my.id │
//! │     IDCASHIER_DATA_DIR=/var/lib/idcashier                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/idcashier/config.toml (Linux)                            │
//! │     ~/Library/Application Support/id.idcashier.idcashier (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [backend]
//! url = "https://xyz.supabase.co"
//! anon_key = "eyJ..."
//!
//! [app]
//! site_url = "https://idcashier.my.id"
//! developer_emails = ["dev@idcashier.my.id"]
//! ```
//!
//! No request timeout is configured; the transport default applies.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Backend Settings
// =============================================================================

/// Connection settings for the backend-as-a-service project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: String,

    /// Public anonymous key sent as `apikey` on every request.
    #[serde(default)]
    pub anon_key: String,
}

// =============================================================================
// App Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Base of the password-reset redirect link.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Owners allowed onto the developer page.
    #[serde(default)]
    pub developer_emails: Vec<String>,

    /// Preference storage directory. Platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_site_url() -> String {
    "https://idcashier.my.id".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            site_url: default_site_url(),
            developer_emails: Vec::new(),
            data_dir: None,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub app: AppSettings,
}

impl BackendConfig {
    /// Builds a config directly, mostly for tests and embedding.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        BackendConfig {
            backend: BackendSettings {
                url: url.into(),
                anon_key: anon_key.into(),
            },
            app: AppSettings::default(),
        }
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading backend config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Backend config saved");
        Ok(())
    }

    pub fn validate(&self) -> ClientResult<()> {
        let url = self.backend.url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "Backend URL must start with http:// or https://, got: '{}'",
                url
            )));
        }

        if self.backend.anon_key.trim().is_empty() {
            return Err(ClientError::Config("anon_key must not be empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("IDCASHIER_SUPABASE_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.url = url;
        }

        if let Ok(key) = std::env::var("IDCASHIER_SUPABASE_ANON_KEY") {
            debug!("Overriding anon key from environment");
            self.backend.anon_key = key;
        }

        if let Ok(emails) = std::env::var("IDCASHIER_DEVELOPER_EMAILS") {
            self.app.developer_emails = parse_email_list(&emails);
        }

        if let Ok(dir) = std::env::var("IDCASHIER_DATA_DIR") {
            if dir.trim().is_empty() {
                warn!("IDCASHIER_DATA_DIR is empty, ignoring");
            } else {
                self.app.data_dir = Some(PathBuf::from(dir));
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("id", "idcashier", "idcashier")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.backend.url.trim().trim_end_matches('/')
    }

    pub fn anon_key(&self) -> &str {
        &self.backend.anon_key
    }

    pub fn developer_emails(&self) -> &[String] {
        &self.app.developer_emails
    }

    pub fn reset_redirect_url(&self) -> String {
        format!("{}/reset-password", self.app.site_url.trim_end_matches('/'))
    }

    /// Directory for persisted preferences.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.app
            .data_dir
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
    }
}

/// Splits a comma separated list, dropping blanks and lower-casing.
pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
