//! Recommendation and description commands.

use anyhow::Result;
use smartcart_core::{CustomerId, ProductId};

use crate::context::AppContext;
use crate::search::print_products;

/// CLI entry point for `smartcart recommend <customer-id>`.
pub async fn run_recommend(ctx: &AppContext, customer_id: CustomerId) -> Result<()> {
    let products = ctx
        .recommendations
        .personalized_recommendations(customer_id)
        .await?;
    print_products(&products);
    Ok(())
}

/// CLI entry point for `smartcart describe <product-id>`.
///
/// Prints the generated description exactly as the model returned it.
pub async fn run_describe(ctx: &AppContext, product_id: ProductId) -> Result<()> {
    let text = ctx
        .recommendations
        .describe_product_by_id(product_id)
        .await?;
    println!("{}", text);
    Ok(())
}
