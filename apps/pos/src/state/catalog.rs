//! # Catalog State
//!
//! Products and customers as last loaded by the Sales page.
//!
//! The stock figures here feed the optimistic pre-check only. They go stale
//! the moment another till sells something; the backend has the final word.

use std::sync::{PoisonError, RwLock};

use idcashier_core::{Customer, Product};

#[derive(Debug, Default)]
pub struct CatalogState {
    products: RwLock<Vec<Product>>,
    customers: RwLock<Vec<Customer>>,
}

impl CatalogState {
    pub fn new() -> Self {
        CatalogState::default()
    }

    pub fn products(&self) -> Vec<Product> {
        self.products.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.customers.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn product(&self, id: &str) -> Option<Product> {
        let products = self.products.read().unwrap_or_else(PoisonError::into_inner);
        products.iter().find(|p| p.id == id).cloned()
    }

    pub fn set_products(&self, products: Vec<Product>) {
        *self.products.write().unwrap_or_else(PoisonError::into_inner) = products;
    }

    pub fn set_customers(&self, customers: Vec<Customer>) {
        *self.customers.write().unwrap_or_else(PoisonError::into_inner) = customers;
    }

    /// Adds or replaces a customer by id.
    pub fn upsert_customer(&self, customer: Customer) {
        let mut customers = self.customers.write().unwrap_or_else(PoisonError::into_inner);
        match customers.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => *existing = customer,
            None => customers.push(customer),
        }
    }

    pub fn clear(&self) {
        self.set_products(Vec::new());
        self.set_customers(Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str, name: &str) -> Customer {
        Customer {
            id: id.into(),
            user_id: None,
            name: name.into(),
            email: None,
            phone: Some("0812".into()),
            address: None,
        }
    }

    #[test]
    fn test_upsert_customer() {
        let state = CatalogState::new();
        state.upsert_customer(customer("c1", "Ani"));
        state.upsert_customer(customer("c2", "Budi"));
        state.upsert_customer(customer("c1", "Ani Lestari"));

        let customers = state.customers();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name, "Ani Lestari");

        state.clear();
        assert!(state.customers().is_empty());
        assert!(state.product("p1").is_none());
    }
}
