//! Storage contracts for SmartCart.
//!
//! [`CatalogStore`] and [`CustomerStore`] are the read-only views the core
//! needs over product and customer records. Persistence technology stays
//! behind these traits; the core never writes through them.
//!
//! Implementations must be `Send + Sync` to be shared across request
//! handlers.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Customer, CustomerId, Product, ProductId};

/// Read access to the product catalog.
///
/// All list-returning operations yield products in catalog order
/// (insertion order for the in-memory store) unless stated otherwise.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find_all`](CatalogStore::find_all) | Every product |
/// | [`find_by_id`](CatalogStore::find_by_id) | One product by id |
/// | [`find_by_category`](CatalogStore::find_by_category) | Exact category match |
/// | [`find_by_search_query`](CatalogStore::find_by_search_query) | Case-insensitive substring over name/description/category |
/// | [`find_by_brand`](CatalogStore::find_by_brand) | Exact brand match |
/// | [`find_recent`](CatalogStore::find_recent) | Newest products first |
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Product>>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    async fn find_by_category(&self, category: &str) -> Result<Vec<Product>>;

    /// Products whose name, description, or category contains `query` as a
    /// case-insensitive substring. The empty query matches every product.
    async fn find_by_search_query(&self, query: &str) -> Result<Vec<Product>>;

    async fn find_by_brand(&self, brand: &str) -> Result<Vec<Product>>;

    /// Up to `limit` products ordered by `created_at`, newest first.
    async fn find_recent(&self, limit: usize) -> Result<Vec<Product>>;
}

/// Read access to customer records.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>>;

    async fn find_all(&self) -> Result<Vec<Customer>>;
}
