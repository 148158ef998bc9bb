//! # Domain Types
//!
//! Backend rows, cart lines and write payloads.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  sale_id (FK)   │       │
//! │  │  barcode        │   │  customer_id ?  │   │  product_id ?   │       │
//! │  │  price, cost    │   │  discount %     │   │  quantity       │       │
//! │  │  stock          │   │  tax %          │   │  price (frozen) │       │
//! │  └─────────────────┘   │  total_amount   │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartLine     │   │      User       │   │  Subscription   │       │
//! │  │  (not stored)   │   │  role, tenant   │   │  start, end     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Row Leniency
//! Rows keep the backend's snake_case column names. Every numeric column is
//! read through the `lenient_*` helpers in [`crate::money`]: a missing or
//! malformed amount becomes zero instead of failing the whole list.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::breakdown::{LineAmount, MonetaryBreakdown};
use crate::money::{lenient_i64, lenient_money, lenient_percent, Money, Percent};
use crate::permissions::{lenient_permissions, Permissions, Role};
use crate::WALK_IN_CUSTOMER_NAME;

// =============================================================================
// Lenient Date Helpers
// =============================================================================

/// Parses a backend timestamp (`timestamptz` or a bare `timestamp`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .ok()
}

/// Parses a date column that may also hold a full timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn strict_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

// =============================================================================
// User
// =============================================================================

/// A profile row from the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub role: Role,

    /// Owning account for a cashier. Owners usually carry `None` or their own id.
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Stored permission flags. Only meaningful for cashiers.
    #[serde(default, deserialize_with = "lenient_permissions")]
    pub permissions: Option<Permissions>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        User {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            tenant_id: None,
            permissions: None,
            created_at: None,
        }
    }

    /// The account whose data and settings this user works under.
    ///
    /// A cashier works under the tenant owner; everyone else under themselves.
    pub fn owner_id(&self) -> &str {
        match (self.role, self.tenant_id.as_deref()) {
            (Role::Cashier, Some(tenant)) if !tenant.is_empty() => tenant,
            _ => &self.id,
        }
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(tenant_id) = patch.tenant_id {
            self.tenant_id = Some(tenant_id);
        }
        if let Some(permissions) = patch.permissions {
            self.permissions = Some(permissions);
        }
    }
}

/// A partial update merged into the session user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub tenant_id: Option<String>,
    pub permissions: Option<Permissions>,
}

// =============================================================================
// Catalog
// =============================================================================

/// `{ name }` embedded by a foreign-key join.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NamedRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// Supplier fields embedded on a product row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// A product row, with its category and supplier names joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub barcode: Option<String>,

    /// Current selling price.
    #[serde(default, deserialize_with = "lenient_money")]
    pub price: Money,

    /// Purchase cost, zero when unknown.
    #[serde(default, deserialize_with = "lenient_money")]
    pub cost: Money,

    /// Last-known stock level. May be stale by the time a sale commits.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub stock: i64,

    #[serde(default)]
    pub category_id: Option<String>,

    #[serde(default)]
    pub supplier_id: Option<String>,

    #[serde(default)]
    pub category: Option<NamedRef>,

    #[serde(default)]
    pub supplier: Option<SupplierRef>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn supplier_name(&self) -> Option<&str> {
        self.supplier.as_ref().and_then(|s| s.name.as_deref())
    }

    /// Exact, whitespace-insensitive barcode match.
    pub fn matches_barcode(&self, code: &str) -> bool {
        let code = code.trim();
        !code.is_empty() && self.barcode.as_deref().map(str::trim) == Some(code)
    }
}

/// A category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// A supplier row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A customer row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

// =============================================================================
// Sales
// =============================================================================

/// Cashier fields embedded on a sale (`users!sales_user_id_fkey`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Customer fields embedded on a sale (`customers!sales_customer_id_fkey`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Product fields embedded on a sale line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "lenient_money")]
    pub price: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub cost: Money,
    #[serde(default)]
    pub supplier: Option<NamedRef>,
}

/// A persisted line of a sale.
///
/// Immutable after creation. `product_id` is `None` once the product has
/// been deleted; the line then reports as an unknown product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub sale_id: Option<String>,

    #[serde(default)]
    pub product_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: i64,

    /// Unit price at the time of sale.
    #[serde(default, deserialize_with = "lenient_money")]
    pub price: Money,

    #[serde(default)]
    pub product: Option<SaleLineProduct>,
}

impl SaleLine {
    pub fn product_name(&self) -> Option<&str> {
        self.product.as_ref().and_then(|p| p.name.as_deref())
    }

    pub fn barcode(&self) -> Option<&str> {
        self.product.as_ref().and_then(|p| p.barcode.as_deref())
    }
}

impl LineAmount for SaleLine {
    fn unit_price(&self) -> Money {
        self.price
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// A persisted sale header with its joined detail.
///
/// The header stores percentages. Nominal discount and tax are re-derived
/// through [`Sale::breakdown`] every time they are displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,

    #[serde(default)]
    pub user_id: Option<String>,

    /// `None` means walk-in customer.
    #[serde(default)]
    pub customer_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_money")]
    pub total_amount: Money,

    /// Discount percentage (0..=100).
    #[serde(default, deserialize_with = "lenient_percent")]
    pub discount: Percent,

    /// Tax percentage (>= 0).
    #[serde(default, deserialize_with = "lenient_percent")]
    pub tax: Percent,

    #[serde(default, deserialize_with = "lenient_money")]
    pub payment_amount: Money,

    #[serde(default, deserialize_with = "lenient_money")]
    pub change_amount: Money,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub user: Option<SaleUser>,

    #[serde(default)]
    pub customer: Option<SaleCustomer>,

    #[serde(default)]
    pub sale_items: Vec<SaleLine>,
}

impl Sale {
    /// Customer display name.
    ///
    /// - `customer_id` null → walk-in (`"Umum"`)
    /// - customer row present → its name
    /// - `customer_id` set but row missing → `None` (data-quality warning)
    pub fn customer_name(&self) -> Option<&str> {
        match &self.customer_id {
            None => Some(WALK_IN_CUSTOMER_NAME),
            Some(_) => self.customer.as_ref().and_then(|c| c.name.as_deref()),
        }
    }

    pub fn cashier_name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.name.as_deref())
    }

    /// Re-derives the monetary breakdown from the stored lines and percentages.
    pub fn breakdown(&self) -> MonetaryBreakdown {
        crate::breakdown::compute_breakdown(&self.sale_items, self.discount, self.tax)
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// A subscription row. Dates are calendar dates; the end date is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Subscription {
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(deserialize_with = "strict_date")]
    #[ts(as = "String")]
    pub start_date: NaiveDate,

    #[serde(deserialize_with = "strict_date")]
    #[ts(as = "String")]
    pub end_date: NaiveDate,
}

// =============================================================================
// Cart
// =============================================================================

/// An item in an in-progress sale.
///
/// Lives only in the cart; it is turned into a [`NewSaleLine`] at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub barcode: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        barcode: Option<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        CartLine {
            product_id: product_id.into(),
            name: name.into(),
            barcode,
            unit_price,
            quantity,
        }
    }

    /// Creates a line with quantity 1 from a product at its current price.
    pub fn from_product(product: &Product) -> Self {
        CartLine::new(
            product.id.clone(),
            product.name.clone(),
            product.barcode.clone(),
            product.price,
            1,
        )
    }
}

impl LineAmount for CartLine {
    fn unit_price(&self) -> Money {
        self.unit_price
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

// =============================================================================
// Write Payloads
// =============================================================================

/// Product create/update body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub barcode: Option<String>,
    pub price: Money,
    pub cost: Money,
    pub stock: i64,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
}

/// Category create/update body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
}

/// Supplier create/update body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierInput {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Customer create/update body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Body for the `auth-register` function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub tenant_id: Option<String>,
    pub permissions: Option<Permissions>,
}

/// Body for the `users-update` function. `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
}

/// One `sale_items` row to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSaleLine {
    pub product_id: String,
    pub quantity: i64,
    pub price: Money,
}

/// A sale header plus the lines to insert after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub customer_id: Option<String>,
    pub total_amount: Money,
    pub discount: Percent,
    pub tax: Percent,
    pub payment_amount: Money,
    pub change_amount: Money,
    pub user_id: Option<String>,
    pub sale_items: Vec<NewSaleLine>,
}

impl NewSale {
    /// Builds the payload from a validated cart.
    ///
    /// `total_amount` is the breakdown total rounded to whole Rupiah and the
    /// stored change is computed against that rounded total.
    pub fn from_cart(
        lines: &[CartLine],
        breakdown: &MonetaryBreakdown,
        payment: Money,
        customer_id: Option<String>,
        user_id: Option<String>,
    ) -> Self {
        let total_amount = breakdown.rounded_total();
        NewSale {
            customer_id,
            total_amount,
            discount: breakdown.discount_percent,
            tax: breakdown.tax_percent,
            payment_amount: payment,
            change_amount: payment - total_amount,
            user_id,
            sale_items: lines
                .iter()
                .map(|l| NewSaleLine {
                    product_id: l.product_id.clone(),
                    quantity: l.quantity,
                    price: l.unit_price,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Aggregates returned by the `dashboard-stats` function.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    #[serde(default, deserialize_with = "lenient_money")]
    pub total_sales: Money,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_products: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_categories: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_suppliers: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_customers: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_transactions: i64,
    /// Preformatted growth figure, e.g. `"+12%"`.
    #[serde(default)]
    pub growth: Option<String>,
}

/// One entry of `dashboard-recent-transactions`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecentTransaction {
    #[serde(default)]
    #[ts(type = "string | number | null")]
    pub id: serde_json::Value,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub items: i64,
    #[serde(default, deserialize_with = "lenient_money")]
    pub total: Money,
}

/// One entry of `dashboard-top-products`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub sold: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sale_json() -> serde_json::Value {
        json!({
            "id": "s1",
            "user_id": "u1",
            "customer_id": null,
            "total_amount": 23625,
            "discount": 10,
            "tax": "5",
            "payment_amount": 25000,
            "change_amount": 1375,
            "created_at": "2024-05-01T08:30:00.123456+00:00",
            "user": {"name": "Sari", "email": "sari@toko.id"},
            "customer": null,
            "sale_items": [
                {"id": "i1", "sale_id": "s1", "product_id": "p1", "quantity": 2, "price": 10000,
                 "product": {"name": "Kopi", "barcode": "899", "price": 12000, "cost": 6000,
                             "supplier": {"name": "CV Kopi"}}},
                {"id": "i2", "sale_id": "s1", "product_id": null, "quantity": 1, "price": "5000",
                 "product": null}
            ]
        })
    }

    #[test]
    fn test_sale_row_rederives_breakdown() {
        let sale: Sale = serde_json::from_value(sale_json()).unwrap();
        let b = sale.breakdown();

        assert_eq!(b.subtotal, Money::from_rupiah(25_000));
        assert_eq!(b.total, Money::from_rupiah(23_625));
        assert_eq!(sale.cashier_name(), Some("Sari"));
        assert_eq!(sale.sale_items[0].product_name(), Some("Kopi"));
        assert_eq!(sale.sale_items[1].product_name(), None);
        assert!(sale.created_at.is_some());
    }

    #[test]
    fn test_walk_in_vs_missing_customer() {
        let mut sale: Sale = serde_json::from_value(sale_json()).unwrap();
        assert_eq!(sale.customer_name(), Some("Umum"));

        sale.customer_id = Some("c-deleted".into());
        assert_eq!(sale.customer_name(), None);

        sale.customer = Some(SaleCustomer {
            name: Some("Budi".into()),
            ..Default::default()
        });
        assert_eq!(sale.customer_name(), Some("Budi"));
    }

    #[test]
    fn test_sale_without_items_key() {
        let sale: Sale = serde_json::from_value(json!({"id": "s2", "total_amount": null})).unwrap();
        assert!(sale.sale_items.is_empty());
        assert!(sale.total_amount.is_zero());
        assert!(sale.breakdown().total.is_zero());
    }

    #[test]
    fn test_oversized_sale_row_saturates() {
        use rust_decimal::Decimal;

        let sale: Sale = serde_json::from_value(json!({
            "id": "s3",
            "discount": 10,
            "tax": 11,
            "sale_items": [
                {"id": "i1", "sale_id": "s3", "product_id": "p1", "quantity": 9e18, "price": 1e11},
                {"id": "i2", "sale_id": "s3", "product_id": "p2", "quantity": 1, "price": 5000}
            ]
        }))
        .unwrap();

        let b = sale.breakdown();
        assert_eq!(b.subtotal.amount(), Decimal::MAX);
        assert!(b.total.is_positive());

        let first = crate::breakdown::compute_line_allocation(&sale.sale_items[0], &b);
        assert!(first.line_ratio <= Decimal::ONE);
        let second = crate::breakdown::compute_line_allocation(&sale.sale_items[1], &b);
        assert_eq!(second.line_subtotal, Money::from_rupiah(5000));
    }

    #[test]
    fn test_user_row_with_string_permissions() {
        let user: User = serde_json::from_value(json!({
            "id": "u2",
            "name": "Kasir 1",
            "email": "k1@toko.id",
            "role": "kasir",
            "tenant_id": "owner-1",
            "permissions": "{\"sales\": true, \"canApplyTax\": true}",
            "created_at": "2024-01-01 10:00:00"
        }))
        .unwrap();

        assert_eq!(user.role, Role::Cashier);
        assert_eq!(user.owner_id(), "owner-1");
        let perms = user.permissions.unwrap();
        assert!(perms.sales && perms.can_apply_tax);
        assert!(!perms.reports);
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_owner_id_for_owner_is_self() {
        let mut owner = User::new("o1", "Ibu Toko", "o@toko.id", Role::Owner);
        owner.tenant_id = Some("someone-else".into());
        assert_eq!(owner.owner_id(), "o1");
    }

    #[test]
    fn test_user_patch_merges() {
        let mut user = User::new("u1", "Lama", "u@toko.id", Role::Owner);
        user.apply(UserPatch {
            name: Some("Baru".into()),
            ..Default::default()
        });
        assert_eq!(user.name, "Baru");
        assert_eq!(user.email, "u@toko.id");
    }

    #[test]
    fn test_subscription_dates_accept_timestamps() {
        let sub: Subscription = serde_json::from_value(json!({
            "user_id": "u1",
            "start_date": "2024-01-15",
            "end_date": "2024-02-15T00:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(sub.end_date, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());

        let bad = serde_json::from_value::<Subscription>(json!({
            "start_date": "kemarin",
            "end_date": "2024-02-15"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_new_sale_rounds_total_and_change() {
        let lines = vec![CartLine::new("p1", "Item", None, Money::from_rupiah(12_345), 1)];
        let b = crate::breakdown::compute_breakdown(&lines, Percent::from_int(7), Percent::zero());
        let sale = NewSale::from_cart(&lines, &b, Money::from_rupiah(20_000), None, Some("u1".into()));

        assert_eq!(sale.total_amount, Money::from_rupiah(11_481));
        assert_eq!(sale.change_amount, Money::from_rupiah(8_519));
        assert_eq!(sale.discount, Percent::from_int(7));
        assert_eq!(sale.sale_items.len(), 1);
        assert!(sale.customer_id.is_none());
    }

    #[test]
    fn test_barcode_match_is_exact() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1", "name": "Teh", "barcode": " 8991 ", "price": 5000
        }))
        .unwrap();
        assert!(product.matches_barcode("8991"));
        assert!(!product.matches_barcode("899"));
        assert!(!product.matches_barcode(""));
    }

    #[test]
    fn test_dashboard_stats_lenient() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "totalSales": "1500000",
            "totalProducts": 12,
            "growth": "+5%"
        }))
        .unwrap();
        assert_eq!(stats.total_sales, Money::from_rupiah(1_500_000));
        assert_eq!(stats.total_products, 12);
        assert_eq!(stats.total_customers, 0);
    }
}
