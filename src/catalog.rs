//! JSON catalog file loading.
//!
//! The catalog file holds the product and customer records served by the
//! in-memory store:
//!
//! ```json
//! {
//!   "products": [
//!     { "id": 1, "name": "MacBook Pro", "category": "Electronics",
//!       "brand": "Apple", "price": 2499.99, "stock_quantity": 10,
//!       "description": "High-performance laptop", "tags": ["laptop"] }
//!   ],
//!   "customers": [
//!     { "id": 1, "email": "john.doe@example.com", "first_name": "John",
//!       "last_name": "Doe", "preferences": ["Electronics"],
//!       "purchase_history": [1] }
//!   ]
//! }
//! ```
//!
//! Records keep file order, which becomes catalog order.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use smartcart_core::store::memory::InMemoryCatalog;
use smartcart_core::{Customer, Product};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub customers: Vec<Customer>,
}

impl CatalogFile {
    pub fn parse(json: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).context("Failed to parse catalog JSON")?;
        file.check_unique()?;
        Ok(file)
    }

    fn check_unique(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for p in &self.products {
            if !ids.insert(p.id) {
                bail!("duplicate product id {} in catalog", p.id);
            }
        }
        let mut ids = HashSet::new();
        let mut emails = HashSet::new();
        for c in &self.customers {
            if !ids.insert(c.id) {
                bail!("duplicate customer id {} in catalog", c.id);
            }
            if !emails.insert(c.email.to_lowercase()) {
                bail!("duplicate customer email {} in catalog", c.email);
            }
        }
        Ok(())
    }

    pub fn into_store(self) -> InMemoryCatalog {
        InMemoryCatalog::with_records(self.products, self.customers)
    }
}

/// Read a catalog file and build the in-memory store.
pub fn load_catalog(path: &Path) -> Result<InMemoryCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    let file = CatalogFile::parse(&content)
        .with_context(|| format!("Invalid catalog file: {}", path.display()))?;
    info!(
        products = file.products.len(),
        customers = file.customers.len(),
        path = %path.display(),
        "catalog loaded"
    );
    Ok(file.into_store())
}
