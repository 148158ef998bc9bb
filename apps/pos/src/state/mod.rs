//! # State Module
//!
//! Application state for the point-of-sale.
//!
//! ## Why Multiple State Types?
//! Instead of a single struct containing everything, each concern gets its
//! own state type and commands declare exactly what they need.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │ SessionState │  │  CartState   │  │ CatalogState │  │Preferences │  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │ watch::      │  │ Arc<Mutex<   │  │ RwLock<Vec<  │  │ dyn        │  │
//! │  │ Sender<      │  │   Cart>>     │  │  Product>>   │  │ Preference │  │
//! │  │  Session>    │  │ + processing │  │ customers    │  │ Store      │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionState: single writer, any number of subscribers              │
//! │  • CartState: Mutex for exclusive access, AtomicBool payment guard     │
//! │  • CatalogState: read-mostly, replaced wholesale on reload             │
//! │  • Preferences: the adapter serializes its own writes                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod preferences;
mod session;

pub use cart::{Cart, CartState, CartSummary, ProcessingFlag, ProcessingGuard};
pub use catalog::CatalogState;
pub use preferences::{
    receipt_settings_key, store_settings_key, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore,
    Preferences, Theme,
};
pub use session::SessionState;
