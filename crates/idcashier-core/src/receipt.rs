//! # Receipts & Invoices
//!
//! Print-ready view models for the thermal receipt (58mm/80mm) and the A4
//! invoice.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout ──► ReceiptView::build(lines, breakdown, payment, ...)        │
//! │                   │                                                     │
//! │                   └──► render_text(labels)  ──► printer                 │
//! │                                                                         │
//! │  Reports  ──► InvoiceView::from_sale(sale, store, labels)               │
//! │                   │     (breakdown re-derived from the stored lines)   │
//! │                   └──► render_text()                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Neither view stores a nominal discount or tax of its own. Both carry the
//! [`MonetaryBreakdown`] they were built from.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::breakdown::{LineAmount, MonetaryBreakdown};
use crate::format::format_currency;
use crate::money::{Money, Percent};
use crate::types::{CartLine, Sale};
use crate::{DEFAULT_STORE_NAME, WALK_IN_CUSTOMER_NAME};

// =============================================================================
// Settings
// =============================================================================

/// Store identity printed on receipts, persisted per tenant owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct StoreSettings {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Logo URL or data URI.
    pub logo: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: DEFAULT_STORE_NAME.to_string(),
            address: String::new(),
            phone: String::new(),
            logo: None,
        }
    }
}

impl StoreSettings {
    /// The store name, falling back to the default when blank.
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            DEFAULT_STORE_NAME
        } else {
            name
        }
    }
}

/// Supported paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaperSize {
    #[default]
    #[serde(rename = "58mm")]
    Mm58,
    #[serde(rename = "80mm")]
    Mm80,
    #[serde(rename = "A4")]
    A4,
}

impl PaperSize {
    /// Characters per line of the plain-text rendering.
    pub fn columns(&self) -> usize {
        match self {
            PaperSize::Mm58 => 32,
            PaperSize::Mm80 | PaperSize::A4 => 48,
        }
    }

    pub fn is_thermal(&self) -> bool {
        !matches!(self, PaperSize::A4)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "58mm" | "58" => Some(PaperSize::Mm58),
            "80mm" | "80" => Some(PaperSize::Mm80),
            "a4" => Some(PaperSize::A4),
            _ => None,
        }
    }
}

/// Receipt layout options, persisted per tenant owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptSettings {
    pub header_text: String,
    pub footer_text: String,
    pub show_address: bool,
    pub show_phone: bool,
    pub show_header: bool,
    pub show_footer: bool,
    /// Print margin in millimetres.
    pub margin: u32,
    pub paper_size: PaperSize,
    /// Two fraction digits vs. whole Rupiah. Display only.
    pub use_two_decimals: bool,
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        ReceiptSettings {
            header_text: String::new(),
            footer_text: "Terima kasih telah berbelanja!".to_string(),
            show_address: true,
            show_phone: true,
            show_header: true,
            show_footer: true,
            margin: 10,
            paper_size: PaperSize::Mm58,
            use_two_decimals: true,
        }
    }
}

// =============================================================================
// Labels
// =============================================================================

/// Printed captions. The app fills these from its message catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLabels {
    pub invoice_number: String,
    pub invoice_title: String,
    pub cashier: String,
    pub customer: String,
    pub date: String,
    pub phone: String,
    pub product: String,
    pub barcode: String,
    pub price: String,
    pub qty: String,
    pub subtotal: String,
    pub discount: String,
    pub tax: String,
    pub total: String,
    pub pay: String,
    pub change: String,
    pub general_customer: String,
    pub unknown_product: String,
}

impl Default for ReceiptLabels {
    fn default() -> Self {
        ReceiptLabels {
            invoice_number: "No. Invoice".into(),
            invoice_title: "INVOICE".into(),
            cashier: "Kasir".into(),
            customer: "Pelanggan".into(),
            date: "Tanggal".into(),
            phone: "Telp".into(),
            product: "Produk".into(),
            barcode: "Barcode".into(),
            price: "Harga".into(),
            qty: "Qty".into(),
            subtotal: "Subtotal".into(),
            discount: "Diskon".into(),
            tax: "Pajak".into(),
            total: "Total".into(),
            pay: "Bayar".into(),
            change: "Kembalian".into(),
            general_customer: WALK_IN_CUSTOMER_NAME.into(),
            unknown_product: "Produk Tidak Dikenal".into(),
        }
    }
}

/// Customer names that mean "no real customer" on an invoice.
const PLACEHOLDER_CUSTOMER_NAMES: [&str; 4] = ["Pelanggan Umum", "Default Customer", "默认客户", WALK_IN_CUSTOMER_NAME];

/// Whether a customer name is one of the walk-in placeholders.
pub fn is_placeholder_customer(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || PLACEHOLDER_CUSTOMER_NAMES.iter().any(|p| *p == name)
}

/// Builds `INV/{unix millis}`.
pub fn invoice_number(at: DateTime<Utc>) -> String {
    format!("INV/{}", at.timestamp_millis())
}

// =============================================================================
// Summary Rows
// =============================================================================

/// One line of the totals block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum SummaryRow {
    Subtotal { amount: Money },
    Discount { percent: Percent, amount: Money },
    Tax { percent: Percent, amount: Money },
    Total { amount: Money },
    Payment { amount: Money },
    Change { amount: Money },
}

impl SummaryRow {
    fn caption(&self, labels: &ReceiptLabels) -> String {
        match self {
            SummaryRow::Subtotal { .. } => labels.subtotal.clone(),
            SummaryRow::Discount { percent, .. } => format!("{} ({})", labels.discount, percent),
            SummaryRow::Tax { percent, .. } => format!("{} ({})", labels.tax, percent),
            SummaryRow::Total { .. } => labels.total.clone(),
            SummaryRow::Payment { .. } => labels.pay.clone(),
            SummaryRow::Change { .. } => labels.change.clone(),
        }
    }

    fn display_amount(&self, two_decimals: bool) -> String {
        match self {
            SummaryRow::Discount { amount, .. } => format!("-{}", format_currency(*amount, two_decimals)),
            SummaryRow::Subtotal { amount }
            | SummaryRow::Tax { amount, .. }
            | SummaryRow::Total { amount }
            | SummaryRow::Payment { amount }
            | SummaryRow::Change { amount } => format_currency(*amount, two_decimals),
        }
    }
}

// =============================================================================
// Receipt View
// =============================================================================

/// One printed line of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLine {
    pub name: String,
    pub barcode: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,
    pub subtotal: Money,
}

/// Inputs that vary per transaction.
#[derive(Debug, Clone)]
pub struct ReceiptInput<'a> {
    pub lines: &'a [CartLine],
    pub breakdown: &'a MonetaryBreakdown,
    pub payment: Money,
    pub change: Money,
    /// `None` prints the walk-in label.
    pub customer_name: Option<String>,
    pub cashier_name: String,
    pub issued_at: DateTime<Utc>,
}

/// A receipt ready to print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptView {
    pub invoice_number: String,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub store_name: String,
    pub store_address: Option<String>,
    pub store_phone: Option<String>,
    pub logo: Option<String>,
    pub header_text: Option<String>,
    pub footer_text: Option<String>,
    pub cashier_name: String,
    pub customer_name: Option<String>,
    pub lines: Vec<ReceiptLine>,
    pub breakdown: MonetaryBreakdown,
    pub payment: Money,
    pub change: Money,
    pub paper_size: PaperSize,
    pub margin: u32,
    pub use_two_decimals: bool,
}

fn non_empty(flag: bool, value: &str) -> Option<String> {
    let value = value.trim();
    (flag && !value.is_empty()).then(|| value.to_string())
}

impl ReceiptView {
    /// Assembles the receipt from a checkout.
    pub fn build(input: ReceiptInput<'_>, store: &StoreSettings, settings: &ReceiptSettings) -> Self {
        ReceiptView {
            invoice_number: invoice_number(input.issued_at),
            issued_at: input.issued_at,
            store_name: store.display_name().to_string(),
            store_address: non_empty(settings.show_address, &store.address),
            store_phone: non_empty(settings.show_phone, &store.phone),
            logo: store.logo.clone().filter(|l| !l.trim().is_empty()),
            header_text: non_empty(settings.show_header, &settings.header_text),
            footer_text: non_empty(settings.show_footer, &settings.footer_text),
            cashier_name: input.cashier_name,
            customer_name: input.customer_name.filter(|n| !n.trim().is_empty()),
            lines: input
                .lines
                .iter()
                .map(|l| ReceiptLine {
                    name: l.name.clone(),
                    barcode: l.barcode.clone(),
                    unit_price: l.unit_price,
                    quantity: l.quantity,
                    subtotal: l.line_subtotal(),
                })
                .collect(),
            breakdown: *input.breakdown,
            payment: input.payment,
            change: input.change,
            paper_size: settings.paper_size,
            margin: settings.margin,
            use_two_decimals: settings.use_two_decimals,
        }
    }

    /// Totals block. Discount, tax, payment and change appear only when > 0.
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        let b = &self.breakdown;
        let mut rows = vec![SummaryRow::Subtotal { amount: b.subtotal }];
        if b.discount_amount.is_positive() {
            rows.push(SummaryRow::Discount {
                percent: b.discount_percent,
                amount: b.discount_amount,
            });
        }
        if b.tax_amount.is_positive() {
            rows.push(SummaryRow::Tax {
                percent: b.tax_percent,
                amount: b.tax_amount,
            });
        }
        rows.push(SummaryRow::Total { amount: b.total });
        if self.payment.is_positive() {
            rows.push(SummaryRow::Payment { amount: self.payment });
        }
        if self.change.is_positive() {
            rows.push(SummaryRow::Change { amount: self.change });
        }
        rows
    }

    /// Renders the receipt as monospace text for the configured paper width.
    pub fn render_text(&self, labels: &ReceiptLabels) -> String {
        let width = self.paper_size.columns();
        let money = |m: Money| format_currency(m, self.use_two_decimals);
        let mut out = TextSheet::new(width);

        out.center(&self.store_name);
        if let Some(address) = &self.store_address {
            out.center(address);
        }
        if let Some(phone) = &self.store_phone {
            out.center(&format!("{}: {}", labels.phone, phone));
        }
        if let Some(header) = &self.header_text {
            out.center(header);
        }
        out.rule();

        out.line(&format!("{}: {}", labels.invoice_number, self.invoice_number));
        out.line(&format!("{}: {}", labels.cashier, self.cashier_name));
        let customer = self.customer_name.as_deref().unwrap_or(&labels.general_customer);
        out.line(&format!("{}: {}", labels.customer, customer));
        out.line(&format!("{}: {}", labels.date, self.issued_at.format("%d/%m/%Y %H:%M")));
        out.rule();

        if self.paper_size.is_thermal() {
            for line in &self.lines {
                out.line(&line.name);
                out.columns(
                    &format!("{} x {}", line.quantity, money(line.unit_price)),
                    &money(line.subtotal),
                );
            }
        } else {
            out.columns(
                &format!("{} / {}", labels.product, labels.barcode),
                &format!("{} {} {}", labels.price, labels.qty, labels.subtotal),
            );
            for line in &self.lines {
                out.columns(
                    &format!("{} / {}", line.name, line.barcode.as_deref().unwrap_or("-")),
                    &format!("{} {} {}", money(line.unit_price), line.quantity, money(line.subtotal)),
                );
            }
        }
        out.rule();

        for row in self.summary_rows() {
            out.columns(&format!("{}:", row.caption(labels)), &row.display_amount(self.use_two_decimals));
        }

        if let Some(footer) = &self.footer_text {
            out.rule();
            out.center(footer);
        }
        out.finish()
    }
}

// =============================================================================
// Invoice View (A4, re-derived from a persisted sale)
// =============================================================================

/// Customer block of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// A4 invoice for a persisted sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceView {
    pub sale_id: String,
    pub invoice_number: String,
    /// `dd Month yyyy` in Indonesian, empty when the sale has no timestamp.
    pub date_text: String,
    pub store_name: String,
    pub store_address: Option<String>,
    pub store_phone: Option<String>,
    pub logo: String,
    /// Hidden (`None`) for walk-in placeholders.
    pub customer: Option<InvoiceCustomer>,
    pub lines: Vec<ReceiptLine>,
    pub breakdown: MonetaryBreakdown,
    /// `"Diskon 10%"`, or just `"Diskon"` at 0%.
    pub discount_label: String,
    pub tax_label: String,
    pub use_two_decimals: bool,
}

const DEFAULT_LOGO: &str = "/logo.png";

const MONTHS_ID: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September", "Oktober",
    "November", "Desember",
];

fn format_date_id(at: DateTime<Utc>) -> String {
    let month = MONTHS_ID
        .get(at.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{:02} {} {}", at.day(), month, at.year())
}

fn percent_label(caption: &str, percent: Percent) -> String {
    if percent.is_zero() {
        caption.to_string()
    } else {
        format!("{caption} {percent}")
    }
}

impl InvoiceView {
    /// Builds the invoice by recomputing the breakdown from the sale's lines.
    pub fn from_sale(sale: &Sale, store: &StoreSettings, labels: &ReceiptLabels, use_two_decimals: bool) -> Self {
        let breakdown = sale.breakdown();

        let customer = match (&sale.customer_id, &sale.customer) {
            (Some(_), Some(c)) => c
                .name
                .as_deref()
                .filter(|n| !is_placeholder_customer(n))
                .map(|n| InvoiceCustomer {
                    name: n.to_string(),
                    phone: c.phone.clone().filter(|p| !p.trim().is_empty()),
                    email: c.email.clone().filter(|e| !e.trim().is_empty()),
                }),
            _ => None,
        };

        InvoiceView {
            sale_id: sale.id.clone(),
            invoice_number: sale
                .created_at
                .map(invoice_number)
                .unwrap_or_else(|| format!("INV/{}", sale.id)),
            date_text: sale.created_at.map(format_date_id).unwrap_or_default(),
            store_name: store.display_name().to_string(),
            store_address: non_empty(true, &store.address),
            store_phone: non_empty(true, &store.phone),
            logo: store
                .logo
                .clone()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOGO.to_string()),
            customer,
            lines: sale
                .sale_items
                .iter()
                .map(|item| ReceiptLine {
                    name: item
                        .product_name()
                        .map(str::to_string)
                        .unwrap_or_else(|| labels.unknown_product.clone()),
                    barcode: item.barcode().map(str::to_string),
                    unit_price: item.price,
                    quantity: item.quantity,
                    subtotal: item.line_subtotal(),
                })
                .collect(),
            discount_label: percent_label(&labels.discount, breakdown.discount_percent),
            tax_label: percent_label(&labels.tax, breakdown.tax_percent),
            breakdown,
            use_two_decimals,
        }
    }

    /// Totals block: subtotal when > 0, discount/tax when > 0, total always.
    pub fn summary_rows(&self) -> Vec<(String, Money)> {
        let b = &self.breakdown;
        let mut rows = Vec::with_capacity(4);
        if b.subtotal.is_positive() {
            rows.push(("subtotal".to_string(), b.subtotal));
        }
        if b.discount_amount.is_positive() {
            rows.push((self.discount_label.clone(), b.discount_amount));
        }
        if b.tax_amount.is_positive() {
            rows.push((self.tax_label.clone(), b.tax_amount));
        }
        rows.push(("total".to_string(), b.total));
        rows
    }

    /// Plain-text A4 rendering.
    pub fn render_text(&self, labels: &ReceiptLabels) -> String {
        let money = |m: Money| format_currency(m, self.use_two_decimals);
        let mut out = TextSheet::new(PaperSize::A4.columns());

        out.columns(&self.store_name, &self.date_text);
        if let Some(address) = &self.store_address {
            out.line(address);
        }
        if let Some(phone) = &self.store_phone {
            out.line(&format!("{}: {}", labels.phone, phone));
        }
        if let Some(customer) = &self.customer {
            out.columns("", &customer.name);
            if let Some(phone) = &customer.phone {
                out.columns("", &format!("{}: {}", labels.phone, phone));
            }
        }
        out.blank();
        out.center(&labels.invoice_title);
        out.center(&self.invoice_number);
        out.rule();

        for line in &self.lines {
            out.line(&format!("{} ({})", line.name, line.barcode.as_deref().unwrap_or("-")));
            out.columns(
                &format!("  {} x {}", line.quantity, money(line.unit_price)),
                &money(line.subtotal),
            );
        }
        out.rule();

        for (caption, amount) in self.summary_rows() {
            let caption = match caption.as_str() {
                "subtotal" => labels.subtotal.clone(),
                "total" => labels.total.clone(),
                _ => caption,
            };
            out.columns(&caption, &money(amount));
        }
        out.finish()
    }
}

// =============================================================================
// Text Layout
// =============================================================================

struct TextSheet {
    width: usize,
    buf: String,
}

impl TextSheet {
    fn new(width: usize) -> Self {
        TextSheet {
            width,
            buf: String::new(),
        }
    }

    fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn rule(&mut self) {
        self.line(&"-".repeat(self.width));
    }

    fn center(&mut self, text: &str) {
        let len = text.chars().count();
        if len >= self.width {
            self.line(text);
        } else {
            let pad = (self.width - len) / 2;
            self.line(&format!("{}{}", " ".repeat(pad), text));
        }
    }

    /// Left text, right-aligned text. Wraps the right side onto its own line
    /// when both do not fit.
    fn columns(&mut self, left: &str, right: &str) {
        let l = left.chars().count();
        let r = right.chars().count();
        if l + r < self.width {
            self.line(&format!("{}{}{}", left, " ".repeat(self.width - l - r), right));
        } else {
            self.line(left);
            let pad = self.width.saturating_sub(r);
            self.line(&format!("{}{}", " ".repeat(pad), right));
        }
    }

    fn finish(self) -> String {
        self.buf
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakdown::compute_breakdown;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()
    }

    fn cart() -> Vec<CartLine> {
        vec![
            CartLine::new("p1", "Kopi", Some("899".into()), Money::from_rupiah(10_000), 2),
            CartLine::new("p2", "Roti", None, Money::from_rupiah(5_000), 1),
        ]
    }

    fn receipt(discount: i64, tax: i64, payment: i64, settings: &ReceiptSettings) -> ReceiptView {
        let lines = cart();
        let b = compute_breakdown(&lines, Percent::from_int(discount), Percent::from_int(tax));
        let change = Money::from_rupiah(payment) - b.rounded_total();
        let store = StoreSettings {
            name: "Toko Kopi Senja".into(),
            address: "Jl. Kenangan 123".into(),
            phone: "0812".into(),
            logo: None,
        };
        ReceiptView::build(
            ReceiptInput {
                lines: &lines,
                breakdown: &b,
                payment: Money::from_rupiah(payment),
                change,
                customer_name: None,
                cashier_name: "Sari".into(),
                issued_at: at(),
            },
            &store,
            settings,
        )
    }

    #[test]
    fn test_invoice_number_is_millis() {
        assert_eq!(invoice_number(at()), format!("INV/{}", at().timestamp_millis()));
    }

    #[test]
    fn test_summary_rows_hide_zero_amounts() {
        let r = receipt(0, 0, 25_000, &ReceiptSettings::default());
        let rows = r.summary_rows();
        assert_eq!(
            rows,
            vec![
                SummaryRow::Subtotal { amount: Money::from_rupiah(25_000) },
                SummaryRow::Total { amount: Money::from_rupiah(25_000) },
                SummaryRow::Payment { amount: Money::from_rupiah(25_000) },
            ]
        );
    }

    #[test]
    fn test_summary_rows_with_discount_tax_change() {
        let r = receipt(10, 5, 30_000, &ReceiptSettings::default());
        let rows = r.summary_rows();
        assert_eq!(rows.len(), 6);
        assert!(rows.contains(&SummaryRow::Discount {
            percent: Percent::from_int(10),
            amount: Money::from_rupiah(2_500)
        }));
        assert!(rows.contains(&SummaryRow::Change { amount: Money::from_rupiah(6_375) }));
    }

    #[test]
    fn test_render_thermal_58mm() {
        let settings = ReceiptSettings {
            use_two_decimals: false,
            ..Default::default()
        };
        let text = receipt(10, 5, 25_000, &settings).render_text(&ReceiptLabels::default());

        assert!(text.lines().all(|l| l.chars().count() <= 32), "{text}");
        assert!(text.contains("Toko Kopi Senja"));
        assert!(text.contains("Pelanggan: Umum"));
        assert!(text.contains("2 x 10.000"));
        assert!(text.contains("Diskon (10%):"));
        assert!(text.contains("-2.500"));
        assert!(text.contains("23.625"));
        assert!(text.contains("Terima kasih"));
    }

    #[test]
    fn test_render_hides_disabled_store_fields() {
        let settings = ReceiptSettings {
            show_address: false,
            show_phone: false,
            show_footer: false,
            ..Default::default()
        };
        let r = receipt(0, 0, 25_000, &settings);
        assert!(r.store_address.is_none());
        assert!(r.store_phone.is_none());
        assert!(r.footer_text.is_none());
        // Header is on but empty
        assert!(r.header_text.is_none());

        let text = r.render_text(&ReceiptLabels::default());
        assert!(!text.contains("Kenangan"));
    }

    #[test]
    fn test_render_two_decimals_on_80mm() {
        let settings = ReceiptSettings {
            paper_size: PaperSize::Mm80,
            ..Default::default()
        };
        let text = receipt(10, 5, 25_000, &settings).render_text(&ReceiptLabels::default());
        assert!(text.lines().all(|l| l.chars().count() <= 48));
        assert!(text.contains("23.625,00"));
    }

    #[test]
    fn test_a4_receipt_shows_barcode() {
        let settings = ReceiptSettings {
            paper_size: PaperSize::A4,
            ..Default::default()
        };
        let text = receipt(0, 0, 25_000, &settings).render_text(&ReceiptLabels::default());
        assert!(text.contains("Kopi / 899"));
        assert!(text.contains("Roti / -"));
    }

    #[test]
    fn test_settings_serde_camel_case_with_defaults() {
        let s: ReceiptSettings =
            serde_json::from_value(serde_json::json!({"headerText": "Halo", "paperSize": "80mm"})).unwrap();
        assert_eq!(s.header_text, "Halo");
        assert_eq!(s.paper_size, PaperSize::Mm80);
        assert_eq!(s.margin, 10);
        assert!(s.use_two_decimals);

        let store: StoreSettings = serde_json::from_value(serde_json::json!({"name": "  "})).unwrap();
        assert_eq!(store.display_name(), "Toko");
    }

    fn persisted_sale(customer_id: Option<&str>, customer_name: Option<&str>) -> Sale {
        serde_json::from_value(serde_json::json!({
            "id": "s1",
            "customer_id": customer_id,
            "discount": 10,
            "tax": 5,
            "created_at": "2024-05-01T08:30:00Z",
            "customer": customer_name.map(|n| serde_json::json!({"name": n, "phone": "0812"})),
            "sale_items": [
                {"product_id": "p1", "quantity": 2, "price": 10000, "product": {"name": "Kopi", "barcode": "899"}},
                {"product_id": null, "quantity": 1, "price": 5000, "product": null}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_invoice_rederives_breakdown() {
        let sale = persisted_sale(Some("c1"), Some("Budi"));
        let inv = InvoiceView::from_sale(&sale, &StoreSettings::default(), &ReceiptLabels::default(), false);

        assert_eq!(inv.breakdown.total, Money::from_rupiah(23_625));
        assert_eq!(inv.discount_label, "Diskon 10%");
        assert_eq!(inv.tax_label, "Pajak 5%");
        assert_eq!(inv.date_text, "01 Mei 2024");
        assert_eq!(inv.lines[1].name, "Produk Tidak Dikenal");
        assert_eq!(inv.customer.as_ref().map(|c| c.name.as_str()), Some("Budi"));
        assert_eq!(inv.logo, "/logo.png");
        assert_eq!(inv.summary_rows().len(), 4);
    }

    #[test]
    fn test_invoice_hides_placeholder_customers() {
        for name in ["Pelanggan Umum", "Default Customer", "默认客户", "Umum"] {
            let sale = persisted_sale(Some("c1"), Some(name));
            let inv = InvoiceView::from_sale(&sale, &StoreSettings::default(), &ReceiptLabels::default(), true);
            assert!(inv.customer.is_none(), "{name}");
        }
        let walk_in = persisted_sale(None, None);
        let inv = InvoiceView::from_sale(&walk_in, &StoreSettings::default(), &ReceiptLabels::default(), true);
        assert!(inv.customer.is_none());
    }

    #[test]
    fn test_invoice_zero_percent_labels() {
        let mut sale = persisted_sale(None, None);
        sale.discount = Percent::zero();
        let inv = InvoiceView::from_sale(&sale, &StoreSettings::default(), &ReceiptLabels::default(), true);
        assert_eq!(inv.discount_label, "Diskon");
        let text = inv.render_text(&ReceiptLabels::default());
        assert!(text.contains("INVOICE"));
        assert!(text.contains("Pajak 5%"));
    }
}
