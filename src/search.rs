//! Product search entry points.
//!
//! The tiered algorithm lives in `smartcart-core::search` and runs through
//! the [`CatalogStore`](smartcart_core::CatalogStore) and
//! [`CompletionClient`](smartcart_core::CompletionClient) traits. This
//! module provides the CLI command and the shared product listing format.
//!
//! # Tiers
//!
//! - **Deterministic**: substring match over name, description, category.
//! - **Augmented**: the same match, using keywords suggested by the model.
//! - **Semantic**: relevance filter over the whole catalog.

use anyhow::Result;

use smartcart_core::Product;

use crate::context::AppContext;

/// CLI entry point: runs the tiered search and prints the products.
pub async fn run_search(ctx: &AppContext, query: &str, explain: bool) -> Result<()> {
    let outcome = ctx.search.search_with_outcome(query).await?;

    if explain {
        println!(
            "Search: tier={}, mode={:?}",
            outcome.tier,
            ctx.search.expansion_mode()
        );
        if let Some(ref expansion) = outcome.expansion {
            println!("Model keywords: \"{}\"", expansion.replace('\n', " ").trim());
        }
        println!();
    }

    print_products(&outcome.products);
    Ok(())
}

/// Print a numbered product listing, or `No results.` when empty.
pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No results.");
        return;
    }

    for (i, p) in products.iter().enumerate() {
        let brand = if p.brand.is_empty() { "-" } else { p.brand.as_str() };
        println!("{}. {} [{} / {}]", i + 1, p.name, p.category, brand);
        println!("    price: {:.2}  stock: {}", p.price, p.stock_quantity);
        if !p.tags.is_empty() {
            let tags: Vec<&str> = p.tags.iter().map(String::as_str).collect();
            println!("    tags: {}", tags.join(", "));
        }
        if !p.description.is_empty() {
            println!("    \"{}\"", p.description.replace('\n', " ").trim());
        }
        println!("    id: {}", p.id);
        println!();
    }
}
