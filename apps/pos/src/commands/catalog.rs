//! # Catalog Commands
//!
//! Products, categories, suppliers and customers. Every write is scoped to
//! the tenant owner by the client; this layer adds the capability gates.
//!
//! ```text
//! ┌───────────────────┬──────────────────────────┐
//! │ Operation         │ Capability               │
//! ├───────────────────┼──────────────────────────┤
//! │ create_product    │ canAddProduct            │
//! │ update_product    │ canEditProduct           │
//! │ delete_product    │ canDeleteProduct         │
//! │ import_products   │ canImportProduct         │
//! │ create_supplier   │ canAddSupplier           │
//! │ add_customer      │ canAddCustomer           │
//! │ everything else   │ signed in                │
//! └───────────────────┴──────────────────────────┘
//! ```

use idcashier_client::SupabaseClient;
use idcashier_core::permissions::Capability;
use idcashier_core::validation::validate_customer_input;
use idcashier_core::{
    Category, CategoryInput, Customer, CustomerInput, Product, ProductInput, Supplier, SupplierInput,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::i18n::MessageKey;
use crate::state::{CartState, CartSummary, CatalogState, SessionState};

/// What the Sales page needs before the first scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPageData {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
}

/// Loads products and customers in parallel and caches both.
pub async fn load_sales_page(
    client: &SupabaseClient,
    session: &SessionState,
    catalog: &CatalogState,
) -> ApiResult<SalesPageData> {
    let current = session.require()?;
    let (products, customers) =
        tokio::try_join!(client.list_products(&current), client.list_customers(&current))?;

    debug!(products = products.len(), customers = customers.len(), "Sales page loaded");
    catalog.set_products(products.clone());
    catalog.set_customers(customers.clone());
    Ok(SalesPageData { products, customers })
}

// =============================================================================
// Products
// =============================================================================

/// Lists products and refreshes the cached list used by the cart.
pub async fn list_products(
    client: &SupabaseClient,
    session: &SessionState,
    catalog: &CatalogState,
) -> ApiResult<Vec<Product>> {
    let current = session.require()?;
    let products = client.list_products(&current).await?;
    catalog.set_products(products.clone());
    Ok(products)
}

pub async fn get_product(client: &SupabaseClient, session: &SessionState, id: &str) -> ApiResult<Product> {
    let current = session.require()?;
    Ok(client.get_product(&current, id).await?)
}

pub async fn create_product(
    client: &SupabaseClient,
    session: &SessionState,
    input: &ProductInput,
) -> ApiResult<Product> {
    let current = session.require_capability(Capability::CanAddProduct)?;
    let product = client.create_product(&current, input).await?;
    info!(product_id = %product.id, "Product created");
    Ok(product)
}

pub async fn update_product(
    client: &SupabaseClient,
    session: &SessionState,
    id: &str,
    input: &ProductInput,
) -> ApiResult<Product> {
    let current = session.require_capability(Capability::CanEditProduct)?;
    Ok(client.update_product(&current, id, input).await?)
}

pub async fn delete_product(
    client: &SupabaseClient,
    session: &SessionState,
    catalog: &CatalogState,
    id: &str,
) -> ApiResult<()> {
    let current = session.require_capability(Capability::CanDeleteProduct)?;
    client.delete_product(&current, id).await?;

    let remaining: Vec<Product> = catalog.products().into_iter().filter(|p| p.id != id).collect();
    catalog.set_products(remaining);
    Ok(())
}

/// Inserts rows parsed elsewhere (spreadsheet import).
pub async fn import_products(
    client: &SupabaseClient,
    session: &SessionState,
    rows: &[ProductInput],
) -> ApiResult<Vec<Product>> {
    let current = session.require_capability(Capability::CanImportProduct)?;
    if rows.is_empty() {
        return Err(ApiError::validation("Tidak ada produk untuk diimpor"));
    }
    let imported = client.import_products(&current, rows).await?;
    info!(count = imported.len(), "Products imported");
    Ok(imported)
}

// =============================================================================
// Categories
// =============================================================================

pub async fn list_categories(client: &SupabaseClient, session: &SessionState) -> ApiResult<Vec<Category>> {
    let current = session.require()?;
    Ok(client.list_categories(&current).await?)
}

pub async fn create_category(
    client: &SupabaseClient,
    session: &SessionState,
    input: &CategoryInput,
) -> ApiResult<Category> {
    let current = session.require()?;
    Ok(client.create_category(&current, input).await?)
}

pub async fn update_category(
    client: &SupabaseClient,
    session: &SessionState,
    id: &str,
    input: &CategoryInput,
) -> ApiResult<Category> {
    let current = session.require()?;
    Ok(client.update_category(&current, id, input).await?)
}

pub async fn delete_category(client: &SupabaseClient, session: &SessionState, id: &str) -> ApiResult<()> {
    let current = session.require()?;
    Ok(client.delete_category(&current, id).await?)
}

// =============================================================================
// Suppliers
// =============================================================================

pub async fn list_suppliers(client: &SupabaseClient, session: &SessionState) -> ApiResult<Vec<Supplier>> {
    let current = session.require()?;
    Ok(client.list_suppliers(&current).await?)
}

pub async fn create_supplier(
    client: &SupabaseClient,
    session: &SessionState,
    input: &SupplierInput,
) -> ApiResult<Supplier> {
    let current = session.require_capability(Capability::CanAddSupplier)?;
    Ok(client.create_supplier(&current, input).await?)
}

pub async fn update_supplier(
    client: &SupabaseClient,
    session: &SessionState,
    id: &str,
    input: &SupplierInput,
) -> ApiResult<Supplier> {
    let current = session.require()?;
    Ok(client.update_supplier(&current, id, input).await?)
}

pub async fn delete_supplier(client: &SupabaseClient, session: &SessionState, id: &str) -> ApiResult<()> {
    let current = session.require()?;
    Ok(client.delete_supplier(&current, id).await?)
}

// =============================================================================
// Customers
// =============================================================================

pub async fn list_customers(
    client: &SupabaseClient,
    session: &SessionState,
    catalog: &CatalogState,
) -> ApiResult<Vec<Customer>> {
    let current = session.require()?;
    let customers = client.list_customers(&current).await?;
    catalog.set_customers(customers.clone());
    Ok(customers)
}

/// Outcome of adding a customer from the Sales page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedCustomer {
    pub customer: Customer,
    pub cart: CartSummary,
}

/// Creates a customer at the register and selects it for the current cart.
pub async fn add_customer(
    client: &SupabaseClient,
    session: &SessionState,
    cart: &CartState,
    catalog: &CatalogState,
    input: &CustomerInput,
) -> ApiResult<AddedCustomer> {
    let current = session.require_capability(Capability::CanAddCustomer)?;
    if let Err(err) = validate_customer_input(&input.name, input.phone.as_deref()) {
        return Err(ApiError::keyed(
            ErrorCode::ValidationError,
            MessageKey::NamePhoneRequired,
            err.to_string(),
        ));
    }

    let customer = client.create_customer(&current, input).await?;
    info!(customer_id = %customer.id, "Customer added at register");
    catalog.upsert_customer(customer.clone());
    cart.with_cart_mut(|c| c.set_customer(Some(customer.id.clone())));

    Ok(AddedCustomer {
        customer,
        cart: cart.summary(),
    })
}

pub async fn update_customer(
    client: &SupabaseClient,
    session: &SessionState,
    catalog: &CatalogState,
    id: &str,
    input: &CustomerInput,
) -> ApiResult<Customer> {
    let current = session.require()?;
    let customer = client.update_customer(&current, id, input).await?;
    catalog.upsert_customer(customer.clone());
    Ok(customer)
}

pub async fn delete_customer(client: &SupabaseClient, session: &SessionState, id: &str) -> ApiResult<()> {
    let current = session.require()?;
    Ok(client.delete_customer(&current, id).await?)
}
