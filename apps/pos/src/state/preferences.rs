//! # Preferences
//!
//! Client-local UI state: token, current page, language, theme and the
//! per-tenant store and receipt settings.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Preferences (typed accessors)                                          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  dyn PreferenceStore  ── get / set / remove (serde_json::Value by key) │
//! │        │                                                                │
//! │        ├── FilePreferenceStore   {data_dir}/{key}.json                  │
//! │        └── MemoryPreferenceStore HashMap (tests, ephemeral sessions)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes are read-modify-write without locking across processes. A single
//! process serializes through the inner mutex.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use idcashier_core::{Page, ReceiptSettings, StoreSettings};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PreferencesError, PreferencesResult};
use crate::i18n::Language;

// =============================================================================
// Keys
// =============================================================================

pub const TOKEN_KEY: &str = "idcashier_token";
pub const CURRENT_PAGE_KEY: &str = "idcashier_current_page";
pub const NAV_PARAMS_KEY: &str = "idcashier_nav_params";
pub const LANGUAGE_KEY: &str = "idcashier_language";
pub const THEME_KEY: &str = "idcashier_theme";
/// Legacy, non-namespaced store settings.
pub const STORE_SETTINGS_KEY: &str = "idcashier_store_settings";
/// Legacy, non-namespaced receipt settings.
pub const RECEIPT_SETTINGS_KEY: &str = "idcashier_receipt_settings";

pub fn store_settings_key(owner_id: &str) -> String {
    format!("{STORE_SETTINGS_KEY}_{owner_id}")
}

pub fn receipt_settings_key(owner_id: &str) -> String {
    format!("{RECEIPT_SETTINGS_KEY}_{owner_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }
}

// =============================================================================
// Store Adapter
// =============================================================================

/// Side-effecting key/value adapter behind [`Preferences`].
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> PreferencesResult<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> PreferencesResult<()>;
    fn remove(&self, key: &str) -> PreferencesResult<()>;
}

/// One JSON file per key.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    dir: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> PreferencesResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FilePreferenceStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> PreferencesResult<Option<Value>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: Value) -> PreferencesResult<()> {
        let raw = serde_json::to_string_pretty(&value)?;
        fs::write(self.path_for(key), raw)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> PreferencesResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, Value>>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> PreferencesResult<Option<Value>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> PreferencesResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> PreferencesResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

// =============================================================================
// Typed Accessors
// =============================================================================

/// Typed view over a [`PreferenceStore`]. Cheap to clone.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Preferences { store }
    }

    pub fn in_memory() -> Self {
        Preferences::new(Arc::new(MemoryPreferenceStore::default()))
    }

    /// File-backed preferences under `dir`, or the platform data directory.
    pub fn open(dir: Option<PathBuf>) -> PreferencesResult<Self> {
        let dir = match dir {
            Some(dir) => dir,
            None => directories::ProjectDirs::from("id", "idcashier", "idcashier")
                .map(|dirs| dirs.data_dir().join("preferences"))
                .ok_or(PreferencesError::NoDataDir)?,
        };
        debug!(dir = %dir.display(), "Opening preference store");
        Ok(Preferences::new(Arc::new(FilePreferenceStore::new(dir)?)))
    }

    /// Reads a typed value. A stored value of the wrong shape reads as absent.
    fn read<T: DeserializeOwned>(&self, key: &str) -> PreferencesResult<Option<T>> {
        let Some(value) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(key, error = %e, "Ignoring malformed preference");
                Ok(None)
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> PreferencesResult<()> {
        self.store.set(key, serde_json::to_value(value)?)
    }

    // Session token

    pub fn token(&self) -> PreferencesResult<Option<String>> {
        self.read(TOKEN_KEY)
    }

    pub fn set_token(&self, token: &str) -> PreferencesResult<()> {
        self.write(TOKEN_KEY, &token)
    }

    pub fn clear_token(&self) -> PreferencesResult<()> {
        self.store.remove(TOKEN_KEY)
    }

    // Navigation

    /// Last active page; unknown or absent values read as the dashboard.
    pub fn current_page(&self) -> PreferencesResult<Page> {
        let raw: Option<String> = self.read(CURRENT_PAGE_KEY)?;
        Ok(raw.as_deref().and_then(Page::parse).unwrap_or_default())
    }

    pub fn set_current_page(&self, page: Page) -> PreferencesResult<()> {
        self.write(CURRENT_PAGE_KEY, &page.as_str())
    }

    pub fn nav_params(&self) -> PreferencesResult<Value> {
        Ok(self.read(NAV_PARAMS_KEY)?.unwrap_or(Value::Object(Default::default())))
    }

    pub fn set_nav_params(&self, params: Value) -> PreferencesResult<()> {
        self.store.set(NAV_PARAMS_KEY, params)
    }

    /// Back to the dashboard with no params.
    pub fn reset_navigation(&self) -> PreferencesResult<()> {
        self.set_current_page(Page::Dashboard)?;
        self.store.remove(NAV_PARAMS_KEY)
    }

    // Appearance

    pub fn language(&self) -> PreferencesResult<Language> {
        let raw: Option<String> = self.read(LANGUAGE_KEY)?;
        Ok(raw.as_deref().and_then(Language::parse).unwrap_or_default())
    }

    pub fn set_language(&self, language: Language) -> PreferencesResult<()> {
        self.write(LANGUAGE_KEY, &language.code())
    }

    pub fn theme(&self) -> PreferencesResult<Theme> {
        Ok(self.read(THEME_KEY)?.unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> PreferencesResult<()> {
        self.write(THEME_KEY, &theme)
    }

    // Per-tenant settings

    /// Store settings for a tenant, then the legacy key, then defaults.
    pub fn store_settings(&self, owner_id: &str) -> PreferencesResult<StoreSettings> {
        if let Some(settings) = self.read(&store_settings_key(owner_id))? {
            return Ok(settings);
        }
        Ok(self.read(STORE_SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn set_store_settings(&self, owner_id: &str, settings: &StoreSettings) -> PreferencesResult<()> {
        self.write(&store_settings_key(owner_id), settings)
    }

    pub fn receipt_settings(&self, owner_id: &str) -> PreferencesResult<ReceiptSettings> {
        if let Some(settings) = self.read(&receipt_settings_key(owner_id))? {
            return Ok(settings);
        }
        Ok(self.read(RECEIPT_SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn set_receipt_settings(&self, owner_id: &str, settings: &ReceiptSettings) -> PreferencesResult<()> {
        self.write(&receipt_settings_key(owner_id), settings)
    }
}
