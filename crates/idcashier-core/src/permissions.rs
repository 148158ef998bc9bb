//! # Permission Gate
//!
//! Resolves what the signed-in user may do and which pages they may open.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  role string        Role        capabilities                            │
//! │  ───────────        ────        ────────────                            │
//! │  "owner" "admin" ─► Owner  ──►  every flag true (stored flags ignored) │
//! │  anything else   ─► Owner                                               │
//! │  "cashier" "kasir" ► Cashier ─► stored flag, false when absent         │
//! │  no user                  ──►  every flag false                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is a projection, not an enforcement point: row-level security on the
//! backend is authoritative. The gate only decides what the UI offers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use ts_rs::TS;

use crate::types::User;

// =============================================================================
// Role
// =============================================================================

/// The two effective roles.
///
/// Parsing is total. Aliases collapse (`admin` → Owner, `kasir` → Cashier) and
/// an unrecognized string falls back to Owner. Serialization always writes the
/// canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TS)]
#[ts(export, rename_all = "lowercase")]
pub enum Role {
    #[default]
    Owner,
    Cashier,
}

impl Role {
    /// Resolves a raw role string.
    ///
    /// ## Example
    /// ```rust
    /// use idcashier_core::permissions::Role;
    ///
    /// assert_eq!(Role::parse(" Admin "), Role::Owner);
    /// assert_eq!(Role::parse("kasir"), Role::Cashier);
    /// assert_eq!(Role::parse("supervisor"), Role::Owner);
    /// ```
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "cashier" | "kasir" => Role::Cashier,
            _ => Role::Owner,
        }
    }

    /// Canonical string stored on the profile row.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Cashier => "cashier",
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Role::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Role::parse).unwrap_or_default())
    }
}

// =============================================================================
// Stored Permissions
// =============================================================================

/// The permission object stored on a cashier's profile row.
///
/// Every key is required in the type and defaults to `false` when absent from
/// the stored JSON, so nothing downstream has to ask "is this key there?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct Permissions {
    // Page visibility
    pub sales: bool,
    pub products: bool,
    pub reports: bool,

    // Capabilities
    pub can_edit_product: bool,
    pub can_delete_product: bool,
    pub can_add_product: bool,
    pub can_import_product: bool,
    pub can_add_customer: bool,
    pub can_add_supplier: bool,
    pub can_apply_discount: bool,
    pub can_apply_tax: bool,
    pub can_delete_transaction: bool,
    pub can_export_reports: bool,
}

impl Permissions {
    /// Starting flags for a newly created cashier.
    ///
    /// Everything except deleting products and deleting transactions.
    pub fn cashier_defaults() -> Self {
        Permissions {
            sales: true,
            products: true,
            reports: true,
            can_edit_product: true,
            can_delete_product: false,
            can_add_product: true,
            can_import_product: true,
            can_add_customer: true,
            can_add_supplier: true,
            can_apply_discount: true,
            can_apply_tax: true,
            can_delete_transaction: false,
            can_export_reports: true,
        }
    }

    /// Parses a stored permission value.
    ///
    /// The column has held both a JSON object and a JSON-encoded string over
    /// time. `null`, absent and unparsable values yield `None`.
    ///
    /// ## Example
    /// ```rust
    /// use idcashier_core::permissions::Permissions;
    /// use serde_json::json;
    ///
    /// let from_obj = Permissions::from_stored(&json!({"canApplyTax": true})).unwrap();
    /// let from_str = Permissions::from_stored(&json!("{\"canApplyTax\": true}")).unwrap();
    /// assert_eq!(from_obj, from_str);
    /// assert!(Permissions::from_stored(&json!(null)).is_none());
    /// ```
    pub fn from_stored(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            serde_json::Value::String(s) => serde_json::from_str(s).ok(),
            _ => None,
        }
    }

    /// Whether a page flag is set. Pages without a flag return `false`.
    pub fn allows_page(&self, page: Page) -> bool {
        match page {
            Page::Sales => self.sales,
            Page::Products => self.products,
            Page::Reports => self.reports,
            _ => false,
        }
    }
}

/// `deserialize_with` helper for the `permissions` column.
pub fn lenient_permissions<'de, D>(deserializer: D) -> Result<Option<Permissions>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Permissions::from_stored))
}

// =============================================================================
// Capability Set
// =============================================================================

/// One gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum Capability {
    CanEditProduct,
    CanDeleteProduct,
    CanAddProduct,
    CanImportProduct,
    CanAddCustomer,
    CanAddSupplier,
    CanApplyDiscount,
    CanApplyTax,
    CanDeleteTransaction,
    CanExportReports,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::CanEditProduct,
        Capability::CanDeleteProduct,
        Capability::CanAddProduct,
        Capability::CanImportProduct,
        Capability::CanAddCustomer,
        Capability::CanAddSupplier,
        Capability::CanApplyDiscount,
        Capability::CanApplyTax,
        Capability::CanDeleteTransaction,
        Capability::CanExportReports,
    ];

    /// The camelCase key used in stored permission objects.
    pub fn key(&self) -> &'static str {
        match self {
            Capability::CanEditProduct => "canEditProduct",
            Capability::CanDeleteProduct => "canDeleteProduct",
            Capability::CanAddProduct => "canAddProduct",
            Capability::CanImportProduct => "canImportProduct",
            Capability::CanAddCustomer => "canAddCustomer",
            Capability::CanAddSupplier => "canAddSupplier",
            Capability::CanApplyDiscount => "canApplyDiscount",
            Capability::CanApplyTax => "canApplyTax",
            Capability::CanDeleteTransaction => "canDeleteTransaction",
            Capability::CanExportReports => "canExportReports",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Resolved capability flags for the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CapabilitySet {
    pub can_edit_product: bool,
    pub can_delete_product: bool,
    pub can_add_product: bool,
    pub can_import_product: bool,
    pub can_add_customer: bool,
    pub can_add_supplier: bool,
    pub can_apply_discount: bool,
    pub can_apply_tax: bool,
    pub can_delete_transaction: bool,
    pub can_export_reports: bool,
}

impl CapabilitySet {
    /// Every flag true.
    pub fn all() -> Self {
        CapabilitySet {
            can_edit_product: true,
            can_delete_product: true,
            can_add_product: true,
            can_import_product: true,
            can_add_customer: true,
            can_add_supplier: true,
            can_apply_discount: true,
            can_apply_tax: true,
            can_delete_transaction: true,
            can_export_reports: true,
        }
    }

    /// Every flag false.
    pub fn none() -> Self {
        CapabilitySet::default()
    }

    fn from_permissions(p: &Permissions) -> Self {
        CapabilitySet {
            can_edit_product: p.can_edit_product,
            can_delete_product: p.can_delete_product,
            can_add_product: p.can_add_product,
            can_import_product: p.can_import_product,
            can_add_customer: p.can_add_customer,
            can_add_supplier: p.can_add_supplier,
            can_apply_discount: p.can_apply_discount,
            can_apply_tax: p.can_apply_tax,
            can_delete_transaction: p.can_delete_transaction,
            can_export_reports: p.can_export_reports,
        }
    }

    /// Looks up one capability.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::CanEditProduct => self.can_edit_product,
            Capability::CanDeleteProduct => self.can_delete_product,
            Capability::CanAddProduct => self.can_add_product,
            Capability::CanImportProduct => self.can_import_product,
            Capability::CanAddCustomer => self.can_add_customer,
            Capability::CanAddSupplier => self.can_add_supplier,
            Capability::CanApplyDiscount => self.can_apply_discount,
            Capability::CanApplyTax => self.can_apply_tax,
            Capability::CanDeleteTransaction => self.can_delete_transaction,
            Capability::CanExportReports => self.can_export_reports,
        }
    }
}

/// Resolves the capability set for a user.
///
/// Pure and total. `None` (nobody signed in) yields every flag false; callers
/// that need to tell "not signed in" apart check the session themselves.
///
/// ## Example
/// ```rust
/// use idcashier_core::permissions::{resolve_permissions, Capability, Permissions, Role};
/// use idcashier_core::types::User;
///
/// let mut cashier = User::new("u1", "Sari", "sari@toko.id", Role::Cashier);
/// cashier.permissions = Some(Permissions { can_apply_discount: true, ..Default::default() });
///
/// let caps = resolve_permissions(Some(&cashier));
/// assert!(caps.has(Capability::CanApplyDiscount));
/// assert!(!caps.has(Capability::CanApplyTax));
/// ```
pub fn resolve_permissions(user: Option<&User>) -> CapabilitySet {
    match user {
        None => CapabilitySet::none(),
        Some(user) => match user.role {
            Role::Owner => CapabilitySet::all(),
            Role::Cashier => user
                .permissions
                .as_ref()
                .map(CapabilitySet::from_permissions)
                .unwrap_or_default(),
        },
    }
}

// =============================================================================
// Navigation Pages
// =============================================================================

/// A top-level page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Page {
    #[default]
    Dashboard,
    Sales,
    Products,
    Reports,
    Settings,
    Subscription,
    Developer,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Dashboard,
        Page::Sales,
        Page::Products,
        Page::Reports,
        Page::Settings,
        Page::Subscription,
        Page::Developer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Sales => "sales",
            Page::Products => "products",
            Page::Reports => "reports",
            Page::Settings => "settings",
            Page::Subscription => "subscription",
            Page::Developer => "developer",
        }
    }

    /// Parses a stored page id; unknown ids return `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        Page::ALL.iter().copied().find(|p| p.as_str() == raw.trim())
    }

    fn cashier_may_see(&self) -> bool {
        matches!(self, Page::Dashboard | Page::Sales | Page::Products | Page::Reports)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pages shown in the navigation for a user.
///
/// ## Rules
/// - Dashboard is always present for a signed-in user.
/// - Owner: every page except `Developer`, which additionally requires the
///   user's email to be in `developer_emails` (case-insensitive).
/// - Cashier: `Sales`/`Products`/`Reports` follow the stored page flags.
///   A cashier with no stored permission object sees all three.
///   `Settings` and `Subscription` are never shown.
pub fn visible_pages(user: Option<&User>, developer_emails: &[String]) -> Vec<Page> {
    let Some(user) = user else {
        return Vec::new();
    };

    match user.role {
        Role::Owner => {
            let is_developer = developer_emails
                .iter()
                .any(|e| e.trim().eq_ignore_ascii_case(user.email.trim()));
            Page::ALL
                .iter()
                .copied()
                .filter(|p| *p != Page::Developer || is_developer)
                .collect()
        }
        Role::Cashier => Page::ALL
            .iter()
            .copied()
            .filter(|p| p.cashier_may_see())
            .filter(|p| match (p, &user.permissions) {
                (Page::Dashboard, _) => true,
                (page, Some(perms)) => perms.allows_page(*page),
                (_, None) => true,
            })
            .collect(),
    }
}

/// Whether a user may open a page.
pub fn can_view_page(user: Option<&User>, page: Page, developer_emails: &[String]) -> bool {
    visible_pages(user, developer_emails).contains(&page)
}

// =============================================================================
// Unit Tests
// =============================================================================
