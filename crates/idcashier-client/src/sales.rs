//! # Sales
//!
//! ## Write Ordering
//! ```text
//! create_sale:  POST sales (header) ──► POST sale_items ──► GET sales?id=eq.{id}
//! delete_sale:  DELETE sale_items?sale_id=eq.{id} ──► DELETE sales?id=eq.{id}
//! ```
//! No cascading delete is assumed, so lines always go first. Each step
//! completes before the next starts; a failure stops the sequence.

use idcashier_core::{Money, NewSale, NewSaleLine, Percent, Sale};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::{Query, SupabaseClient};
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// Sale select with cashier, customer and line products joined.
pub const SALE_SELECT: &str = "*,
    user:users!sales_user_id_fkey(name, email),
    customer:customers!sales_customer_id_fkey(name, email, phone),
    sale_items(*,
        product:products!sale_items_product_id_fkey(
            name, barcode, price, cost,
            supplier:suppliers!products_supplier_id_fkey(name)))";

#[derive(Serialize)]
struct SaleHeaderRow<'a> {
    id: &'a str,
    customer_id: Option<&'a str>,
    total_amount: Money,
    discount: Percent,
    tax: Percent,
    payment_amount: Money,
    change_amount: Money,
    user_id: &'a str,
}

#[derive(Serialize)]
struct SaleLineRow<'a> {
    id: String,
    sale_id: &'a str,
    #[serde(flatten)]
    line: &'a NewSaleLine,
}

impl SupabaseClient {
    /// All visible sales, newest first.
    pub async fn list_sales(&self, session: &Session) -> ClientResult<Vec<Sale>> {
        let query = Query::new().select(SALE_SELECT).order("created_at", false);
        self.select(session.token(), "sales", &query).await
    }

    pub async fn get_sale(&self, session: &Session, id: &str) -> ClientResult<Sale> {
        let query = Query::new().select(SALE_SELECT).eq("id", id);
        self.select_single(session.token(), "sales", &query, id).await
    }

    /// Writes the header, then its lines, then reads the sale back.
    pub async fn create_sale(&self, session: &Session, sale: &NewSale) -> ClientResult<Sale> {
        let sale_id = Uuid::new_v4().to_string();
        let user_id = sale.user_id.as_deref().unwrap_or(&session.user.id);

        let header = SaleHeaderRow {
            id: &sale_id,
            customer_id: sale.customer_id.as_deref(),
            total_amount: sale.total_amount,
            discount: sale.discount,
            tax: sale.tax,
            payment_amount: sale.payment_amount,
            change_amount: sale.change_amount,
            user_id,
        };
        self.insert_minimal(session.token(), "sales", &[header]).await?;

        let lines: Vec<SaleLineRow<'_>> = sale
            .sale_items
            .iter()
            .map(|line| SaleLineRow {
                id: Uuid::new_v4().to_string(),
                sale_id: &sale_id,
                line,
            })
            .collect();
        if let Err(err) = self.insert_minimal(session.token(), "sale_items", &lines).await {
            warn!(sale_id = %sale_id, error = %err, "Sale header written but lines failed");
            return Err(err);
        }

        info!(sale_id = %sale_id, lines = lines.len(), total = %sale.total_amount, "Sale created");
        self.get_sale(session, &sale_id).await
    }

    /// Deletes a sale's lines, then the sale itself.
    pub async fn delete_sale(&self, session: &Session, id: &str) -> ClientResult<()> {
        let lines = Query::new().eq("sale_id", id);
        let _: Vec<serde_json::Value> = self.delete(session.token(), "sale_items", &lines).await?;

        let header = Query::new().eq("id", id);
        let removed: Vec<serde_json::Value> = self.delete(session.token(), "sales", &header).await?;
        if removed.is_empty() {
            return Err(ClientError::not_found("sales", id));
        }
        info!(sale_id = id, "Sale deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::*;
    use idcashier_core::breakdown::compute_breakdown;
    use idcashier_core::{CartLine, Role, User};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn session() -> Session {
        Session::new(TOKEN, User::new("u1", "Sari", "sari@toko.id", Role::Owner))
    }

    fn new_sale() -> NewSale {
        let cart = vec![
            CartLine::new("p1", "Kopi", None, Money::from_rupiah(10_000), 2),
            CartLine::new("p2", "Roti", None, Money::from_rupiah(5_000), 1),
        ];
        let b = compute_breakdown(&cart, Percent::from_int(10), Percent::from_int(5));
        NewSale::from_cart(&cart, &b, Money::from_rupiah(25_000), None, None)
    }

    #[tokio::test]
    async fn test_create_sale_writes_header_then_lines() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/sales"))
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
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "s1", "total_amount": 23625, "discount": 10, "tax": 5,
                "payment_amount": 25000, "change_amount": 1375, "sale_items": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let sale = client.create_sale(&session(), &new_sale()).await.unwrap();
        assert_eq!(sale.total_amount, Money::from_rupiah(23_625));

        let requests = server.received_requests().await.unwrap();
        let order: Vec<(String, String)> = requests
            .iter()
            .map(|r| (r.method.to_string(), r.url.path().to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("POST".to_string(), "/rest/v1/sales".to_string()),
                ("POST".to_string(), "/rest/v1/sale_items".to_string()),
                ("GET".to_string(), "/rest/v1/sales".to_string()),
            ]
        );

        let header: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let header = &header[0];
        assert_eq!(header["user_id"], "u1");
        assert!(header["customer_id"].is_null());
        assert_eq!(header["total_amount"].as_f64(), Some(23_625.0));
        assert_eq!(header["change_amount"].as_f64(), Some(1_375.0));

        let lines: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
        assert_eq!(lines.as_array().unwrap().len(), 2);
        assert_eq!(lines[0]["sale_id"], header["id"]);
        assert_eq!(lines[0]["product_id"], "p1");
    }

    #[tokio::test]
    async fn test_create_sale_stops_when_lines_fail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/sales"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/sale_items"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Stok tidak mencukupi untuk Kopi"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "s1"})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.create_sale(&session(), &new_sale()).await.unwrap_err();
        assert!(matches!(err, ClientError::InsufficientStock(_)));
    }

    #[tokio::test]
    async fn test_delete_sale_lines_first() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/sale_items"))
            .and(query_param("sale_id", "eq.s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "l1"}])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/sales"))
            .and(query_param("id", "eq.s1"))
            .respond_with(|_: &Request| ResponseTemplate::new(200).set_body_json(json!([{"id": "s1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.delete_sale(&session(), "s1").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.path(), "/rest/v1/sale_items");
        assert_eq!(requests[1].url.path(), "/rest/v1/sales");
    }

    #[tokio::test]
    async fn test_list_sales_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/sales"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.list_sales(&session()).await.unwrap().is_empty());
    }
}
