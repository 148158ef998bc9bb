//! # Commands Module
//!
//! One function per user action. The CLI calls these; so would any other
//! front end.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── auth.rs         ◄─── Login, logout, restore, register, passwords
//! ├── cart.rs         ◄─── Cart manipulation, discount/tax, customer pick
//! ├── sale.rs         ◄─── Payment processing and receipts
//! ├── catalog.rs      ◄─── Products, categories, suppliers, customers
//! ├── report.rs       ◄─── Report load with retry, filters, export, delete
//! ├── users.rs        ◄─── Staff users and developer tools
//! ├── subscription.rs ◄─── Subscription status
//! ├── dashboard.rs    ◄─── Dashboard aggregates
//! ├── navigation.rs   ◄─── Pages, language, theme
//! └── settings.rs     ◄─── Store and receipt settings
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the cart
//! fn get_cart(cart: &CartState) -> CartSummary
//!
//! // Needs the backend and the session
//! async fn list_products(client: &SupabaseClient, session: &SessionState)
//!
//! // Checkout touches nearly everything
//! async fn process_payment(client, session, cart, catalog, prefs, now)
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod dashboard;
pub mod navigation;
pub mod report;
pub mod sale;
pub mod settings;
pub mod subscription;
pub mod users;

// =============================================================================
// Test Support
// =============================================================================
