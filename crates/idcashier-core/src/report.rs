//! # Reports
//!
//! Flattens persisted sales into one row per line, then filters, aggregates
//! and exports those rows.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ReportData { products, suppliers, sales }                              │
//! │        │                                                                │
//! │        ▼  build_report_rows (one row per sale line)                    │
//! │  Vec<ReportRow>  ── sale breakdown attached to every row                │
//! │        │                                                                │
//! │        ▼  ReportFilter::apply                                           │
//! │  filtered rows ──┬──► ReportStats::compute     (unknown products skipped)│
//! │                  ├──► daily_profit_loss                                 │
//! │                  ├──► export_transactions  ──► "Laporan Transaksi"      │
//! │                  └──► export_profit_loss   ──► "Laporan Laba Rugi"      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Allocated, Not Authoritative
//! Discount and tax live on the sale header as percentages. A row's
//! discount/tax/total is its proportional share
//! ([`crate::breakdown::allocate_subtotal`]). Per-row profit built on that
//! share is an allocation: sum it, do not read it as a fact about one line.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use ts_rs::TS;

use crate::breakdown::{allocate_subtotal, LineAmount, MonetaryBreakdown, PerLineAllocation};
use crate::format::format_rupiah;
use crate::money::Money;
use crate::types::{Product, Sale, Supplier};
use crate::WALK_IN_CUSTOMER_NAME;

// =============================================================================
// Report Data
// =============================================================================

/// Everything the report page loads.
///
/// [`ReportData::empty`] is the terminal-failure fallback: every collection
/// present and empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportData {
    pub products: Vec<Product>,
    pub suppliers: Vec<Supplier>,
    pub sales: Vec<Sale>,
}

impl ReportData {
    pub fn empty() -> Self {
        ReportData::default()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.suppliers.is_empty() && self.sales.is_empty()
    }

    /// Products keyed by id, for cost and supplier lookups.
    pub fn products_by_id(&self) -> HashMap<String, Product> {
        self.products.iter().map(|p| (p.id.clone(), p.clone())).collect()
    }

    pub fn rows(&self, labels: &ReportLabels) -> Vec<ReportRow> {
        build_report_rows(&self.sales, &self.products_by_id(), labels)
    }
}

/// Texts substituted for missing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportLabels {
    /// Shown for sales without a customer.
    pub walk_in_customer: String,
    pub unknown_product: String,
    pub no_items: String,
    pub unknown_customer: String,
    pub unknown_supplier: String,
    pub unknown_cashier: String,
}

impl Default for ReportLabels {
    fn default() -> Self {
        ReportLabels {
            walk_in_customer: WALK_IN_CUSTOMER_NAME.into(),
            unknown_product: "Produk Tidak Dikenal".into(),
            no_items: "Tidak ada item".into(),
            unknown_customer: "Pelanggan Tidak Dikenal".into(),
            unknown_supplier: "Supplier Tidak Dikenal".into(),
            unknown_cashier: "Kasir Tidak Dikenal".into(),
        }
    }
}

// =============================================================================
// Report Row
// =============================================================================

/// One sale line as the report shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportRow {
    /// `{sale_id}-{line index}`.
    pub row_id: String,
    pub sale_id: String,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    pub product_id: Option<String>,
    pub product: String,
    pub customer: String,
    pub supplier: String,
    pub cashier: String,
    pub quantity: i64,
    pub price: Money,
    pub item_subtotal: Money,
    /// Breakdown of the whole sale this line belongs to.
    pub sale: MonetaryBreakdown,
    /// `total_amount` as stored on the header.
    pub sale_total: Money,
    pub payment_amount: Money,
    pub change_amount: Money,
    /// Unit cost from the current product list, zero when unknown.
    pub cost: Money,
    pub is_first_item_in_sale: bool,
    pub item_count: usize,
    pub unknown_product: bool,
    pub unknown_customer: bool,
    pub unknown_supplier: bool,
    pub negative_total: bool,
}

impl ReportRow {
    /// This row's share of the sale discount and tax.
    pub fn allocation(&self) -> PerLineAllocation {
        allocate_subtotal(self.item_subtotal, &self.sale)
    }

    /// `cost × quantity`.
    pub fn total_cost(&self) -> Money {
        self.cost.multiply_quantity(self.quantity)
    }

    /// `item_subtotal − cost × quantity`.
    pub fn gross_profit(&self) -> Money {
        self.item_subtotal - self.total_cost()
    }

    pub fn has_incomplete_data(&self) -> bool {
        self.unknown_product || self.unknown_customer || self.unknown_supplier
    }
}

impl LineAmount for ReportRow {
    fn unit_price(&self) -> Money {
        self.price
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// Flattens sales into report rows.
///
/// A sale with no lines still produces one "no items" row, flagged as an
/// unknown product so it never counts towards statistics.
pub fn build_report_rows(
    sales: &[Sale],
    products_by_id: &HashMap<String, Product>,
    labels: &ReportLabels,
) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for sale in sales {
        let breakdown = sale.breakdown();
        let customer_name = sale.customer_name();
        let customer = match (&sale.customer_id, customer_name) {
            (None, _) => labels.walk_in_customer.clone(),
            (Some(_), Some(name)) => name.to_string(),
            (Some(_), None) => labels.unknown_customer.clone(),
        };
        let cashier = sale
            .cashier_name()
            .map(str::to_string)
            .unwrap_or_else(|| labels.unknown_cashier.clone());
        let date = sale.created_at.map(|dt| dt.date_naive());

        let base = ReportRow {
            row_id: format!("{}-0", sale.id),
            sale_id: sale.id.clone(),
            created_at: sale.created_at,
            date,
            product_id: None,
            product: labels.no_items.clone(),
            customer,
            supplier: labels.unknown_supplier.clone(),
            cashier,
            quantity: 0,
            price: Money::zero(),
            item_subtotal: Money::zero(),
            sale: breakdown,
            sale_total: sale.total_amount,
            payment_amount: sale.payment_amount,
            change_amount: sale.change_amount,
            cost: Money::zero(),
            is_first_item_in_sale: true,
            item_count: sale.sale_items.len(),
            unknown_product: true,
            unknown_customer: customer_name.is_none(),
            unknown_supplier: true,
            negative_total: sale.total_amount.is_negative(),
        };

        if sale.sale_items.is_empty() {
            rows.push(base);
            continue;
        }

        for (index, item) in sale.sale_items.iter().enumerate() {
            let known = item
                .product_id
                .as_ref()
                .and_then(|id| products_by_id.get(id));
            let supplier = known.and_then(Product::supplier_name);
            let product_name = item.product_name();

            rows.push(ReportRow {
                row_id: format!("{}-{}", sale.id, index),
                product_id: item.product_id.clone(),
                product: product_name
                    .map(str::to_string)
                    .unwrap_or_else(|| labels.unknown_product.clone()),
                supplier: supplier
                    .map(str::to_string)
                    .unwrap_or_else(|| labels.unknown_supplier.clone()),
                quantity: item.quantity,
                price: item.price,
                item_subtotal: item.line_subtotal(),
                cost: known.map(|p| p.cost).unwrap_or_default(),
                is_first_item_in_sale: index == 0,
                unknown_product: product_name.is_none(),
                unknown_supplier: supplier.is_none(),
                ..base.clone()
            });
        }
    }

    rows
}

/// Distinct sale ids in first-seen order.
pub fn unique_sale_ids(rows: &[ReportRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| seen.insert(r.sale_id.as_str()))
        .map(|r| r.sale_id.clone())
        .collect()
}

// =============================================================================
// Filtering
// =============================================================================

/// Row filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportFilter {
    /// Inclusive lower bound.
    #[ts(as = "Option<String>")]
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound.
    #[ts(as = "Option<String>")]
    pub to: Option<NaiveDate>,
    pub product: Option<String>,
    pub customer: Option<String>,
    pub supplier: Option<String>,
    /// Drop rows whose stored sale total is negative.
    #[serde(default)]
    pub hide_corrupt: bool,
}

impl ReportFilter {
    pub fn matches(&self, row: &ReportRow) -> bool {
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = row.date else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                return false;
            }
        }

        let eq = |wanted: &Option<String>, actual: &str| wanted.as_deref().map_or(true, |w| w == actual);

        eq(&self.product, row.product.as_str())
            && eq(&self.customer, row.customer.as_str())
            && eq(&self.supplier, row.supplier.as_str())
            && !(self.hide_corrupt && row.negative_total)
    }

    pub fn apply(&self, rows: &[ReportRow]) -> Vec<ReportRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Values offered in the filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FilterOptions {
    pub products: Vec<String>,
    pub customers: Vec<String>,
    pub suppliers: Vec<String>,
}

fn dedup_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.trim().is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Builds dropdown options. Unknown products and customers are left out.
pub fn filter_options(rows: &[ReportRow], suppliers: &[Supplier]) -> FilterOptions {
    FilterOptions {
        products: dedup_in_order(rows.iter().filter(|r| !r.unknown_product).map(|r| r.product.as_str())),
        customers: dedup_in_order(rows.iter().filter(|r| !r.unknown_customer).map(|r| r.customer.as_str())),
        suppliers: dedup_in_order(suppliers.iter().map(|s| s.name.as_str())),
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Summary cards of the report page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportStats {
    /// Σ allocated line total.
    pub revenue: Money,
    /// Σ `price × quantity`.
    pub item_subtotal: Money,
    /// Σ `cost × quantity`.
    pub cost: Money,
    /// `item_subtotal − cost`.
    pub profit: Money,
    /// `profit / item_subtotal × 100`, 0 when there is no subtotal.
    #[ts(type = "number")]
    pub margin_percent: Decimal,
    pub transaction_count: usize,
    pub average_transaction: Money,
    /// Rows with an unknown product, customer or supplier.
    pub incomplete_rows: usize,
}

impl ReportStats {
    /// Aggregates rows, skipping those whose product is unknown.
    pub fn compute(rows: &[ReportRow]) -> Self {
        let valid: Vec<&ReportRow> = rows.iter().filter(|r| !r.unknown_product).collect();

        let revenue: Money = valid.iter().map(|r| r.allocation().line_total).sum();
        let item_subtotal: Money = valid.iter().map(|r| r.item_subtotal).sum();
        let cost: Money = valid.iter().map(|r| r.total_cost()).sum();
        let profit = item_subtotal - cost;

        let margin_percent = if item_subtotal.is_zero() {
            Decimal::ZERO
        } else {
            profit
                .amount()
                .checked_div(item_subtotal.amount())
                .map(|ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
                .unwrap_or_default()
        };

        let transaction_count = valid
            .iter()
            .map(|r| r.sale_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let average_transaction = if transaction_count == 0 {
            Money::zero()
        } else {
            Money::new(
                revenue
                    .amount()
                    .checked_div(Decimal::from(transaction_count as u64))
                    .unwrap_or_default(),
            )
        };

        ReportStats {
            revenue,
            item_subtotal,
            cost,
            profit,
            margin_percent,
            transaction_count,
            average_transaction,
            incomplete_rows: rows.iter().filter(|r| r.has_incomplete_data()).count(),
        }
    }
}

/// One bar of the daily profit/loss chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyProfitLoss {
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Short weekday name, e.g. `"Wed"`.
    pub weekday: String,
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
}

/// Groups known-product rows by day, oldest first.
pub fn daily_profit_loss(rows: &[ReportRow]) -> Vec<DailyProfitLoss> {
    let mut days: BTreeMap<NaiveDate, (Money, Money)> = BTreeMap::new();

    for row in rows.iter().filter(|r| !r.unknown_product) {
        let Some(date) = row.date else { continue };
        let entry = days.entry(date).or_insert((Money::zero(), Money::zero()));
        entry.0 += row.allocation().line_total;
        entry.1 += row.total_cost();
    }

    days.into_iter()
        .map(|(date, (revenue, cost))| DailyProfitLoss {
            date,
            weekday: date.format("%a").to_string(),
            revenue,
            cost,
            profit: revenue - cost,
        })
        .collect()
}

// =============================================================================
// Export Rows
// =============================================================================

/// Sheet name of the transactions export.
pub const TRANSACTIONS_SHEET: &str = "Laporan Transaksi";
/// Sheet name of the profit/loss export.
pub const PROFIT_LOSS_SHEET: &str = "Laporan Laba Rugi";

fn export_timestamp(row: &ReportRow) -> String {
    match (row.created_at, row.date) {
        (Some(at), _) => at.format("%d/%m/%Y, %H.%M.%S").to_string(),
        (None, Some(date)) => date.format("%d/%m/%Y").to_string(),
        (None, None) => String::new(),
    }
}

fn rp(amount: Money) -> String {
    format_rupiah(amount, false)
}

/// A row of the "Laporan Transaksi" sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionExportRow {
    #[serde(rename = "Tanggal")]
    pub date: String,
    #[serde(rename = "Produk")]
    pub product: String,
    #[serde(rename = "Pelanggan")]
    pub customer: String,
    #[serde(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Kasir")]
    pub cashier: String,
    #[serde(rename = "Jumlah")]
    pub quantity: i64,
    #[serde(rename = "Harga")]
    pub price: String,
    #[serde(rename = "Subtotal Item")]
    pub item_subtotal: String,
    #[serde(rename = "Diskon")]
    pub discount: String,
    #[serde(rename = "Pajak")]
    pub tax: String,
    #[serde(rename = "Total")]
    pub total: String,
}

/// Transactions export; discount, tax and total are rounded allocations.
pub fn export_transactions(rows: &[ReportRow]) -> Vec<TransactionExportRow> {
    rows.iter()
        .map(|row| {
            let alloc = row.allocation();
            TransactionExportRow {
                date: export_timestamp(row),
                product: row.product.clone(),
                customer: row.customer.clone(),
                supplier: row.supplier.clone(),
                cashier: row.cashier.clone(),
                quantity: row.quantity,
                price: rp(row.price),
                item_subtotal: rp(row.item_subtotal),
                discount: rp(alloc.line_discount.round_rupiah()),
                tax: rp(alloc.line_tax.round_rupiah()),
                total: rp(alloc.line_total.round_rupiah()),
            }
        })
        .collect()
}

/// A row of the "Laporan Laba Rugi" sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitLossExportRow {
    #[serde(rename = "Tanggal")]
    pub date: String,
    #[serde(rename = "Produk")]
    pub product: String,
    #[serde(rename = "Pelanggan")]
    pub customer: String,
    #[serde(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Kasir")]
    pub cashier: String,
    #[serde(rename = "Jumlah")]
    pub quantity: i64,
    #[serde(rename = "Total")]
    pub total: String,
    #[serde(rename = "Biaya")]
    pub cost: String,
    #[serde(rename = "Laba")]
    pub profit: String,
}

/// Profit/loss export over known products only.
pub fn export_profit_loss(rows: &[ReportRow]) -> Vec<ProfitLossExportRow> {
    rows.iter()
        .filter(|r| !r.unknown_product)
        .map(|row| ProfitLossExportRow {
            date: export_timestamp(row),
            product: row.product.clone(),
            customer: row.customer.clone(),
            supplier: row.supplier.clone(),
            cashier: row.cashier.clone(),
            quantity: row.quantity,
            total: rp(row.item_subtotal),
            cost: rp(row.total_cost()),
            profit: rp(row.gross_profit()),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
