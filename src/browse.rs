//! Catalog and customer listings.

use anyhow::Result;

use crate::context::AppContext;
use crate::search::print_products;

/// Which slice of the catalog `smartcart products` lists.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub recent: Option<usize>,
}

/// CLI entry point for `smartcart products`.
///
/// `category` wins over `brand`, which wins over `recent`.
pub async fn run_products(ctx: &AppContext, filter: &ProductFilter) -> Result<()> {
    let products = if let Some(ref category) = filter.category {
        ctx.catalog.find_by_category(category).await?
    } else if let Some(ref brand) = filter.brand {
        ctx.catalog.find_by_brand(brand).await?
    } else if let Some(n) = filter.recent {
        ctx.catalog.find_recent(n).await?
    } else {
        ctx.catalog.find_all().await?
    };
    print_products(&products);
    Ok(())
}

/// CLI entry point for `smartcart customers`.
pub async fn run_customers(ctx: &AppContext) -> Result<()> {
    let customers = ctx.customers.find_all().await?;

    if customers.is_empty() {
        println!("No customers.");
        return Ok(());
    }

    println!("{:<6} {:<28} {:<32} PURCHASES", "ID", "NAME", "EMAIL");
    for c in &customers {
        println!(
            "{:<6} {:<28} {:<32} {}",
            c.id,
            c.full_name(),
            c.email,
            c.purchase_history.len()
        );
    }
    Ok(())
}
