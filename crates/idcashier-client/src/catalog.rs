//! # Catalog and Customers
//!
//! Tenant-scoped CRUD over `products`, `categories`, `suppliers` and
//! `customers`.
//!
//! Reads of products, suppliers and customers rely on row-level security to
//! narrow the result to the tenant. Single-row reads and every write filter
//! on `user_id = owner` explicitly. New rows get a client-generated UUID.

use idcashier_core::validation::validate_name;
use idcashier_core::{Category, CategoryInput, Customer, CustomerInput, Product, ProductInput, Supplier, SupplierInput};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::client::{Query, SupabaseClient};
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// Product select with category and supplier names joined.
pub const PRODUCT_SELECT: &str = "*,
    category:categories!products_category_id_fkey(name),
    supplier:suppliers!products_supplier_id_fkey(name, phone, address)";

/// An input payload tagged with the row id and owning tenant.
#[derive(Serialize)]
struct Owned<'a, T: Serialize> {
    id: String,
    user_id: &'a str,
    #[serde(flatten)]
    input: &'a T,
}

impl<'a, T: Serialize> Owned<'a, T> {
    fn new(owner: &'a str, input: &'a T) -> Self {
        Owned {
            id: Uuid::new_v4().to_string(),
            user_id: owner,
            input,
        }
    }
}

impl SupabaseClient {
    // =========================================================================
    // Generic Tenant Helpers
    // =========================================================================

    async fn get_owned<T: DeserializeOwned>(&self, session: &Session, table: &str, select: &str, id: &str) -> ClientResult<T> {
        let query = Query::new()
            .select(select)
            .eq("id", id)
            .eq("user_id", session.user.owner_id());
        self.select_single(session.token(), table, &query, id).await
    }

    async fn create_owned<I, T>(&self, session: &Session, table: &str, input: &I) -> ClientResult<T>
    where
        I: Serialize,
        T: DeserializeOwned,
    {
        let row = Owned::new(session.user.owner_id(), input);
        let mut rows: Vec<T> = self.insert(session.token(), table, &[row]).await?;
        if rows.is_empty() {
            return Err(ClientError::ServerNotResponding(format!("insert into {table} returned no row")));
        }
        Ok(rows.remove(0))
    }

    async fn update_owned<I, T>(&self, session: &Session, table: &str, id: &str, input: &I) -> ClientResult<T>
    where
        I: Serialize,
        T: DeserializeOwned,
    {
        let query = Query::new().eq("id", id).eq("user_id", session.user.owner_id());
        let mut rows: Vec<T> = self.update(session.token(), table, &query, input).await?;
        if rows.is_empty() {
            return Err(ClientError::not_found(table, id));
        }
        Ok(rows.remove(0))
    }

    async fn delete_owned(&self, session: &Session, table: &str, id: &str) -> ClientResult<()> {
        let query = Query::new().eq("id", id).eq("user_id", session.user.owner_id());
        let rows: Vec<serde_json::Value> = self.delete(session.token(), table, &query).await?;
        if rows.is_empty() {
            return Err(ClientError::not_found(table, id));
        }
        info!(table, id, "Row deleted");
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn list_products(&self, session: &Session) -> ClientResult<Vec<Product>> {
        self.select(session.token(), "products", &Query::new().select(PRODUCT_SELECT)).await
    }

    pub async fn get_product(&self, session: &Session, id: &str) -> ClientResult<Product> {
        self.get_owned(session, "products", PRODUCT_SELECT, id).await
    }

    pub async fn create_product(&self, session: &Session, input: &ProductInput) -> ClientResult<Product> {
        validate_name("Nama produk", &input.name)?;
        self.create_owned(session, "products", input).await
    }

    pub async fn update_product(&self, session: &Session, id: &str, input: &ProductInput) -> ClientResult<Product> {
        validate_name("Nama produk", &input.name)?;
        self.update_owned(session, "products", id, input).await
    }

    pub async fn delete_product(&self, session: &Session, id: &str) -> ClientResult<()> {
        self.delete_owned(session, "products", id).await
    }

    /// Inserts already-parsed rows in one request.
    pub async fn import_products(&self, session: &Session, inputs: &[ProductInput]) -> ClientResult<Vec<Product>> {
        for input in inputs {
            validate_name("Nama produk", &input.name)?;
        }
        let owner = session.user.owner_id();
        let rows: Vec<Owned<'_, ProductInput>> = inputs.iter().map(|i| Owned::new(owner, i)).collect();
        info!(count = rows.len(), "Importing products");
        self.insert(session.token(), "products", &rows).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn list_categories(&self, session: &Session) -> ClientResult<Vec<Category>> {
        let query = Query::new().select("*").eq("user_id", session.user.owner_id());
        self.select(session.token(), "categories", &query).await
    }

    pub async fn get_category(&self, session: &Session, id: &str) -> ClientResult<Category> {
        self.get_owned(session, "categories", "*", id).await
    }

    pub async fn create_category(&self, session: &Session, input: &CategoryInput) -> ClientResult<Category> {
        validate_name("Nama kategori", &input.name)?;
        self.create_owned(session, "categories", input).await
    }

    pub async fn update_category(&self, session: &Session, id: &str, input: &CategoryInput) -> ClientResult<Category> {
        validate_name("Nama kategori", &input.name)?;
        self.update_owned(session, "categories", id, input).await
    }

    pub async fn delete_category(&self, session: &Session, id: &str) -> ClientResult<()> {
        self.delete_owned(session, "categories", id).await
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    pub async fn list_suppliers(&self, session: &Session) -> ClientResult<Vec<Supplier>> {
        self.select(session.token(), "suppliers", &Query::new().select("*")).await
    }

    pub async fn get_supplier(&self, session: &Session, id: &str) -> ClientResult<Supplier> {
        self.get_owned(session, "suppliers", "*", id).await
    }

    pub async fn create_supplier(&self, session: &Session, input: &SupplierInput) -> ClientResult<Supplier> {
        validate_name("Nama supplier", &input.name)?;
        self.create_owned(session, "suppliers", input).await
    }

    pub async fn update_supplier(&self, session: &Session, id: &str, input: &SupplierInput) -> ClientResult<Supplier> {
        validate_name("Nama supplier", &input.name)?;
        self.update_owned(session, "suppliers", id, input).await
    }

    pub async fn delete_supplier(&self, session: &Session, id: &str) -> ClientResult<()> {
        self.delete_owned(session, "suppliers", id).await
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn list_customers(&self, session: &Session) -> ClientResult<Vec<Customer>> {
        self.select(session.token(), "customers", &Query::new().select("*")).await
    }

    pub async fn get_customer(&self, session: &Session, id: &str) -> ClientResult<Customer> {
        self.get_owned(session, "customers", "*", id).await
    }

    pub async fn create_customer(&self, session: &Session, input: &CustomerInput) -> ClientResult<Customer> {
        validate_name("Nama pelanggan", &input.name)?;
        self.create_owned(session, "customers", input).await
    }

    pub async fn update_customer(&self, session: &Session, id: &str, input: &CustomerInput) -> ClientResult<Customer> {
        validate_name("Nama pelanggan", &input.name)?;
        self.update_owned(session, "customers", id, input).await
    }

    pub async fn delete_customer(&self, session: &Session, id: &str) -> ClientResult<()> {
        self.delete_owned(session, "customers", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::*;
    use idcashier_core::{Money, Role, User};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn cashier_session() -> Session {
        let mut user = User::new("kasir-1", "Dewi", "dewi@toko.id", Role::Cashier);
        user.tenant_id = Some("owner-1".into());
        Session::new(TOKEN, user)
    }

    #[tokio::test]
    async fn test_list_products_with_joins() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .and(query_param(
                "select",
                "*,category:categories!products_category_id_fkey(name),supplier:suppliers!products_supplier_id_fkey(name,phone,address)",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "p1", "name": "Kopi", "price": "12000", "cost": 8000, "stock": 5,
                "category": {"name": "Minuman"}, "supplier": {"name": "CV Kopi"}
            }])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let products = client.list_products(&cashier_session()).await.unwrap();
        assert_eq!(products[0].price, Money::from_rupiah(12_000));
        assert_eq!(products[0].category_name(), Some("Minuman"));
    }

    #[tokio::test]
    async fn test_create_product_scoped_to_owner() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/products"))
            .and(body_partial_json(json!([{"user_id": "owner-1", "name": "Teh"}])))
            .respond_with(|req: &Request| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                ResponseTemplate::new(201).set_body_json(body)
            })
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let input = ProductInput {
            name: "Teh".into(),
            price: Money::from_rupiah(5_000),
            stock: 10,
            ..Default::default()
        };
        let product = client.create_product(&cashier_session(), &input).await.unwrap();
        assert!(Uuid::parse_str(&product.id).is_ok());
        assert_eq!(product.user_id.as_deref(), Some("owner-1"));
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/categories"))
            .and(query_param("id", "eq.c9"))
            .and(query_param("user_id", "eq.owner-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .update_category(&cashier_session(), "c9", &CategoryInput { name: "Makanan".into() })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_blank_name_rejected_before_request() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let err = client
            .create_supplier(&cashier_session(), &SupplierInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_customer() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/customers"))
            .and(query_param("id", "eq.cu1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "cu1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.delete_customer(&cashier_session(), "cu1").await.unwrap();
    }

    #[tokio::test]
    async fn test_import_products_bulk() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/products"))
            .respond_with(|req: &Request| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                ResponseTemplate::new(201).set_body_json(body)
            })
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let inputs = vec![
            ProductInput { name: "A".into(), ..Default::default() },
            ProductInput { name: "B".into(), ..Default::default() },
        ];
        let products = client.import_products(&cashier_session(), &inputs).await.unwrap();
        assert_eq!(products.len(), 2);
        assert_ne!(products[0].id, products[1].id);
    }
}
