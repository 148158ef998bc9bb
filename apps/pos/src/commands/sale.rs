//! # Sale Commands
//!
//! Payment processing for the Sales page and invoice printing for past
//! sales.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process_payment                                                        │
//! │       │                                                                 │
//! │       ├── already processing? ───────────────► Ok(None), nothing sent   │
//! │       │   (ProcessingGuard held until return)                           │
//! │       ├── validate_checkout (7 rules) ──✗────► CHECKOUT_ERROR           │
//! │       ├── check_stock (last-loaded list) ─✗──► INSUFFICIENT_STOCK       │
//! │       ├── session required ───────────────✗──► AUTH_REQUIRED            │
//! │       │                                                                 │
//! │       ├── POST sales (header) ──► POST sale_items ──► GET sale          │
//! │       │                                                                 │
//! │       ├── cart.clear()                                                  │
//! │       ├── reload products (stock changed) ─ failure only logged         │
//! │       ▼                                                                 │
//! │  Ok(Some(CompletedSale { sale, receipt, receipt_text }))                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use idcashier_client::SupabaseClient;
use idcashier_core::receipt::ReceiptInput;
use idcashier_core::validation::{check_stock, validate_checkout, CheckoutRequest};
use idcashier_core::{InvoiceView, NewSale, ReceiptView, Sale};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ApiResult, ApiError, ErrorCode, Notification};
use crate::i18n::{receipt_labels, translate, Language, MessageKey};
use crate::state::{CartState, CatalogState, Preferences, SessionState};

/// A committed sale and its receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSale {
    pub sale: Sale,
    pub receipt: ReceiptView,
    pub receipt_text: String,
}

/// Checks out the cart.
///
/// Returns `Ok(None)` when a payment is already in flight. The cart is left
/// untouched on every error.
pub async fn process_payment(
    client: &SupabaseClient,
    session: &SessionState,
    cart: &CartState,
    catalog: &CatalogState,
    prefs: &Preferences,
    now: DateTime<Utc>,
) -> ApiResult<Option<CompletedSale>> {
    let Some(_guard) = cart.processing().try_begin() else {
        debug!("Payment already in progress, ignoring");
        return Ok(None);
    };

    let snapshot = cart.snapshot();
    let breakdown = snapshot.breakdown();
    let customers = catalog.customers();

    validate_checkout(&CheckoutRequest {
        lines: &snapshot.lines,
        breakdown: &breakdown,
        payment: snapshot.payment,
        customer_id: snapshot.customer_id.as_deref(),
        customers: &customers,
    })?;
    check_stock(&snapshot.lines, &catalog.products())?;

    let current = session.require()?;
    let new_sale = NewSale::from_cart(
        &snapshot.lines,
        &breakdown,
        snapshot.payment,
        snapshot.customer_id.clone(),
        Some(current.user.id.clone()),
    );

    debug!(lines = new_sale.sale_items.len(), total = %new_sale.total_amount, "Submitting sale");
    let sale = client.create_sale(&current, &new_sale).await?;

    let owner_id = current.user.owner_id();
    let store = prefs.store_settings(owner_id)?;
    let settings = prefs.receipt_settings(owner_id)?;
    let language = prefs.language()?;

    let customer_name = snapshot
        .customer_id
        .as_deref()
        .and_then(|id| customers.iter().find(|c| c.id == id))
        .map(|c| c.name.clone());

    let receipt = ReceiptView::build(
        ReceiptInput {
            lines: &snapshot.lines,
            breakdown: &breakdown,
            payment: new_sale.payment_amount,
            change: new_sale.change_amount,
            customer_name,
            cashier_name: current.user.name.clone(),
            issued_at: sale.created_at.unwrap_or(now),
        },
        &store,
        &settings,
    );
    let receipt_text = receipt.render_text(&receipt_labels(language));

    cart.with_cart_mut(|c| c.clear());
    info!(sale_id = %sale.id, total = %sale.total_amount, "Payment completed");

    match client.list_products(&current).await {
        Ok(products) => catalog.set_products(products),
        Err(err) => warn!(error = %err, "Product reload after sale failed"),
    }

    Ok(Some(CompletedSale {
        sale,
        receipt,
        receipt_text,
    }))
}

/// The toast for a failed payment.
///
/// Stock and invalid-input failures show the backend's own text; an expired
/// session asks for a new login. Anything else is prefixed with "transaction
/// failed".
pub fn checkout_failure_notification(language: Language, err: &ApiError) -> Notification {
    match err.code {
        ErrorCode::InsufficientStock | ErrorCode::InvalidInput | ErrorCode::CheckoutError => err.notification(language),
        ErrorCode::SessionExpired | ErrorCode::AuthRequired => {
            Notification::error(language, translate(language, MessageKey::SessionExpired))
        }
        _ => Notification::error(
            language,
            format!("{}: {}", translate(language, MessageKey::TransactionFailed), err.message),
        ),
    }
}

/// A4 invoice for a stored sale.
pub async fn get_invoice(
    client: &SupabaseClient,
    session: &SessionState,
    prefs: &Preferences,
    sale_id: &str,
) -> ApiResult<(InvoiceView, String)> {
    let current = session.require()?;
    let sale = client.get_sale(&current, sale_id).await?;

    let owner_id = current.user.owner_id();
    let store = prefs.store_settings(owner_id)?;
    let settings = prefs.receipt_settings(owner_id)?;
    let labels = receipt_labels(prefs.language()?);

    let invoice = InvoiceView::from_sale(&sale, &store, &labels, settings.use_two_decimals);
    let text = invoice.render_text(&labels);
    Ok((invoice, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use idcashier_core::{Money, Percent, StoreSettings};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        session: SessionState,
        cart: CartState,
        catalog: CatalogState,
        prefs: Preferences,
    }

    fn fixture() -> Fixture {
        let session = SessionState::new();
        session.set(session_for(owner()));
        let catalog = CatalogState::new();
        catalog.set_products(vec![product("p1", 10_000, 5), product("p2", 5_000, 5)]);
        catalog.set_customers(vec![customer("c1", "Ani")]);
        Fixture {
            session,
            cart: CartState::new(),
            catalog,
            prefs: Preferences::in_memory(),
        }
    }

    fn fill_cart(f: &Fixture) {
        f.cart.with_cart_mut(|c| {
            c.add_product(&product("p1", 10_000, 5)).unwrap();
            c.add_product(&product("p1", 10_000, 5)).unwrap();
            c.add_product(&product("p2", 5_000, 5)).unwrap();
            c.set_discount(Percent::from_int(10));
            c.set_tax(Percent::from_int(5));
            c.set_payment(Money::from_rupiah(30_000));
        });
    }

    fn stored_sale() -> serde_json::Value {
        json!({
            "id": "s1", "user_id": "o1", "customer_id": null,
            "total_amount": 23625, "discount": 10, "tax": 5,
            "payment_amount": 30000, "change_amount": 6375,
            "created_at": "2024-05-01T08:00:00Z",
            "user": {"name": "Sari"}, "customer": null,
            "sale_items": [
                {"product_id": "p1", "quantity": 2, "price": 10000, "product": {"name": "Produk p1"}},
                {"product_id": "p2", "quantity": 1, "price": 5000, "product": {"name": "Produk p2"}}
            ]
        })
    }

    #[tokio::test]
    async fn test_successful_payment_writes_header_then_lines_and_clears_cart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/sales"))
            .and(body_partial_json(json!([{
                "customer_id": null, "total_amount": 23625.0, "discount": 10.0, "tax": 5.0,
                "payment_amount": 30000.0, "change_amount": 6375.0, "user_id": "o1"
            }])))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/sale_items"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/sales"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stored_sale()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json("p1", 10_000, 3)])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let f = fixture();
        f.prefs
            .set_store_settings(
                "o1",
                &StoreSettings {
                    name: "Warung Sari".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        fill_cart(&f);

        let done = process_payment(&client, &f.session, &f.cart, &f.catalog, &f.prefs, Utc::now())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(done.sale.id, "s1");
        assert_eq!(done.receipt.store_name, "Warung Sari");
        assert_eq!(done.receipt.breakdown.total, Money::from_rupiah(23_625));
        assert_eq!(done.receipt.change, Money::from_rupiah(6_375));
        assert!(done.receipt_text.contains("Warung Sari"));

        assert!(f.cart.snapshot().is_empty());
        assert!(!f.cart.processing().is_processing());
        assert_eq!(f.catalog.products()[0].stock, 3);
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let f = fixture();
        fill_cart(&f);
        f.cart.with_cart_mut(|c| c.set_payment(Money::from_rupiah(1_000)));

        let err = process_payment(&client, &f.session, &f.cart, &f.catalog, &f.prefs, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutError);
        assert_eq!(err.message_key(), Some(MessageKey::InsufficientPayment));
        assert!(!f.cart.snapshot().is_empty());
        assert!(!f.cart.processing().is_processing());
    }

    #[tokio::test]
    async fn test_unknown_customer_rejected() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let f = fixture();
        fill_cart(&f);
        f.cart.with_cart_mut(|c| c.set_customer(Some("ghost".into())));

        let err = process_payment(&client, &f.session, &f.cart, &f.catalog, &f.prefs, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.message_key(), Some(MessageKey::InvalidCustomerSelection));
    }

    #[tokio::test]
    async fn test_stock_precheck() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let f = fixture();
        f.catalog.set_products(vec![product("p1", 10_000, 1), product("p2", 5_000, 5)]);
        fill_cart(&f);

        let err = process_payment(&client, &f.session, &f.cart, &f.catalog, &f.prefs, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Stok tidak mencukupi untuk Produk p1. Tersedia: 1, Diminta: 2");
    }

    #[tokio::test]
    async fn test_backend_stock_failure_keeps_cart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/sales"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Stok tidak mencukupi untuk Produk p1"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/sale_items"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let f = fixture();
        fill_cart(&f);

        let err = process_payment(&client, &f.session, &f.cart, &f.catalog, &f.prefs, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let toast = checkout_failure_notification(Language::Id, &err);
        assert_eq!(toast.body, "Stok tidak mencukupi untuk Produk p1");
        assert_eq!(f.cart.snapshot().lines.len(), 2);
        assert!(!f.cart.processing().is_processing());
    }

    #[tokio::test]
    async fn test_second_submit_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let f = fixture();
        fill_cart(&f);

        let _held = f.cart.processing().try_begin().unwrap();
        let result = process_payment(&client, &f.session, &f.cart, &f.catalog, &f.prefs, Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(f.cart.snapshot().lines.len(), 2);
    }

    #[test]
    fn test_failure_notifications() {
        let expired = ApiError::from(idcashier_client::ClientError::SessionExpired);
        assert_eq!(
            checkout_failure_notification(Language::En, &expired).body,
            "Your session has expired, please log in again"
        );

        let other = ApiError::new(ErrorCode::ServerError, "boom");
        assert_eq!(checkout_failure_notification(Language::Id, &other).body, "Transaksi gagal: boom");
    }

    #[tokio::test]
    async fn test_invoice_for_stored_sale() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/sales"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stored_sale()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let f = fixture();
        let (invoice, text) = get_invoice(&client, &f.session, &f.prefs, "s1").await.unwrap();
        assert_eq!(invoice.breakdown.total, Money::from_rupiah(23_625));
        assert_eq!(invoice.discount_label, "Diskon 10%");
        assert!(invoice.customer.is_none());
        assert!(!text.is_empty());
    }
}
