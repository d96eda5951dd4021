//! In-memory [`CatalogStore`] and [`CustomerStore`] implementation.
//!
//! Records live in `Vec`s behind `std::sync::RwLock`, so catalog order is
//! insertion order. Locks are only held for the duration of a scan and are
//! never held across an await point.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::{Customer, CustomerId, Product, ProductId};

use super::{CatalogStore, CustomerStore};

/// In-memory catalog holding both products and customers.
#[derive(Debug)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<Product>>,
    customers: RwLock<Vec<Customer>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(Vec::new()),
            customers: RwLock::new(Vec::new()),
        }
    }

    /// Build a catalog from existing records, keeping their order.
    pub fn with_records(products: Vec<Product>, customers: Vec<Customer>) -> Self {
        Self {
            products: RwLock::new(products),
            customers: RwLock::new(customers),
        }
    }

    /// Save a product and return it as stored.
    ///
    /// A product with an id of `0` or less is new and gets the next free id.
    /// Otherwise an existing product with the same id is replaced in place.
    pub fn save_product(&self, mut product: Product) -> DiscoveryResult<Product> {
        let mut products = write(&self.products)?;
        if product.id <= 0 {
            product.id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        }
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product.clone(),
            None => products.push(product.clone()),
        }
        Ok(product)
    }

    /// Register a customer and return it as stored.
    ///
    /// Fails with [`DiscoveryError::EmailInUse`] if another customer already
    /// uses the same email, compared case-insensitively. Ids are assigned
    /// as in [`save_product`](Self::save_product).
    pub fn save_customer(&self, mut customer: Customer) -> DiscoveryResult<Customer> {
        let mut customers = write(&self.customers)?;
        if customers
            .iter()
            .any(|c| c.id != customer.id && c.email.eq_ignore_ascii_case(&customer.email))
        {
            return Err(DiscoveryError::EmailInUse(customer.email));
        }
        if customer.id <= 0 {
            customer.id = customers.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        }
        match customers.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => *existing = customer.clone(),
            None => customers.push(customer.clone()),
        }
        Ok(customer)
    }

    /// Replace a customer's preference list.
    pub fn update_preferences(
        &self,
        id: CustomerId,
        preferences: Vec<String>,
    ) -> DiscoveryResult<Customer> {
        let mut customers = write(&self.customers)?;
        let customer = customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DiscoveryError::customer_not_found(id))?;
        customer.preferences = preferences;
        Ok(customer.clone())
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory catalog lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory catalog lock poisoned"))
}

fn filtered(products: &[Product], pred: impl Fn(&Product) -> bool) -> Vec<Product> {
    products.iter().filter(|p| pred(p)).cloned().collect()
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn find_all(&self) -> Result<Vec<Product>> {
        Ok(read(&self.products)?.clone())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(read(&self.products)?.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Product>> {
        Ok(filtered(&read(&self.products)?, |p| p.category == category))
    }

    async fn find_by_search_query(&self, query: &str) -> Result<Vec<Product>> {
        Ok(filtered(&read(&self.products)?, |p| p.matches_query(query)))
    }

    async fn find_by_brand(&self, brand: &str) -> Result<Vec<Product>> {
        Ok(filtered(&read(&self.products)?, |p| p.brand == brand))
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<Product>> {
        let mut products = read(&self.products)?.clone();
        // Stable sort keeps catalog order among equal timestamps.
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products.truncate(limit);
        Ok(products)
    }
}

#[async_trait]
impl CustomerStore for InMemoryCatalog {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(read(&self.customers)?.iter().find(|c| c.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Customer>> {
        Ok(read(&self.customers)?.clone())
    }
}
