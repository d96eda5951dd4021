//! Personalized recommendations and product descriptions.
//!
//! [`RecommendationEngine`] turns a customer's profile and purchase history
//! into a prompt, asks the completion service which kinds of products would
//! suit them, and maps the answer back onto the catalog with the
//! [relevance filter](crate::relevance). It also writes marketing copy for a
//! single product by passing the model's answer through untouched.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::completion::CompletionClient;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::{Customer, CustomerId, Product, ProductId};
use crate::prompt::PromptTemplate;
use crate::relevance;
use crate::store::{CatalogStore, CustomerStore};

/// Category vocabulary offered to the model in recommendation prompts.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Electronics",
    "Books",
    "Toys",
    "Fashion",
    "Grocery",
    "Beauty",
    "Clothing",
    "Sports",
];

pub const RECOMMENDATION_PROMPT: PromptTemplate = PromptTemplate::new(
    "Based on the following customer profile and purchase history, \
     recommend product categories and types that would interest them:\n\
     Customer: {first_name} {last_name}\n\
     Preferences: {preferences}\n\
     {purchases}\
     \nPlease suggest 3-5 product categories or specific product types \
     that would complement their interests. Focus on categories like:\n\
     {categories}\n",
);

pub const DESCRIPTION_PROMPT: PromptTemplate = PromptTemplate::new(
    "Generate an engaging, SEO-friendly product description for the following product:\n\
     Name: {name}\n\
     Category: {category}\n\
     Brand: {brand}\n\
     Current Description: {description}\n\n\
     Make it compelling and highlight key features and benefits.",
);

/// Customer-specific recommendations over a catalog.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogStore>,
    customers: Arc<dyn CustomerStore>,
    completion: Arc<dyn CompletionClient>,
    limit: usize,
    categories: Vec<String>,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        customers: Arc<dyn CustomerStore>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            catalog,
            customers,
            completion,
            limit: relevance::DEFAULT_LIMIT,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Replace the category vocabulary listed in recommendation prompts.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Recommend up to `limit` catalog products for a customer.
    ///
    /// Fails with [`DiscoveryError::NotFound`] for an unknown customer.
    /// Purchase-history ids that no longer resolve are skipped. If the
    /// completion service fails, the failure is logged and no products are
    /// recommended.
    #[instrument(skip(self))]
    pub async fn personalized_recommendations(
        &self,
        customer_id: CustomerId,
    ) -> DiscoveryResult<Vec<Product>> {
        let customer = self
            .customers
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| DiscoveryError::customer_not_found(customer_id))?;

        let purchased = self.resolve_purchases(&customer).await?;
        info!(
            purchased = purchased.len(),
            referenced = customer.purchase_history.len(),
            "resolved purchase history"
        );

        let prompt = self.recommendation_prompt(&customer, &purchased)?;
        debug!(prompt = %prompt, "recommendation prompt");

        let answer = match self.completion.complete(&prompt).await {
            Ok(answer) => answer,
            Err(err) => {
                warn!(error = %err, "recommendation completion failed; returning no products");
                return Ok(Vec::new());
            }
        };

        let catalog = self.catalog.find_all().await?;
        let picks = relevance::filter(&answer, &catalog, self.limit);
        info!(count = picks.len(), "recommendations selected");
        Ok(picks)
    }

    /// Ask the completion service for marketing copy for `product`.
    ///
    /// The completion text is returned verbatim. Completion failures are
    /// returned as [`DiscoveryError::Completion`]; no fallback text is
    /// produced.
    #[instrument(skip(self, product), fields(product_id = product.id))]
    pub async fn generate_product_description(&self, product: &Product) -> DiscoveryResult<String> {
        let prompt = DESCRIPTION_PROMPT.render(&[
            ("name", product.name.as_str()),
            ("category", product.category.as_str()),
            ("brand", product.brand.as_str()),
            ("description", product.description.as_str()),
        ])?;
        let text = self.completion.complete(&prompt).await?;
        info!(chars = text.len(), "description generated");
        Ok(text)
    }

    /// Look a product up by id and generate its description.
    pub async fn describe_product_by_id(&self, id: ProductId) -> DiscoveryResult<String> {
        let product = self
            .catalog
            .find_by_id(id)
            .await?
            .ok_or_else(|| DiscoveryError::product_not_found(id))?;
        self.generate_product_description(&product).await
    }

    async fn resolve_purchases(&self, customer: &Customer) -> DiscoveryResult<Vec<Product>> {
        let mut purchased = Vec::with_capacity(customer.purchase_history.len());
        for &id in &customer.purchase_history {
            match self.catalog.find_by_id(id).await? {
                Some(product) => purchased.push(product),
                None => debug!(product_id = id, "purchased product no longer in catalog"),
            }
        }
        Ok(purchased)
    }

    fn recommendation_prompt(
        &self,
        customer: &Customer,
        purchased: &[Product],
    ) -> DiscoveryResult<String> {
        let preferences = customer.preferences.join(", ");
        let purchases = if purchased.is_empty() {
            String::new()
        } else {
            let mut lines = String::from("Recent purchases:\n");
            for p in purchased {
                lines.push_str(&format!("- {} ({})\n", p.name, p.category));
            }
            lines
        };
        let categories = self.categories.join(", ");

        Ok(RECOMMENDATION_PROMPT.render(&[
            ("first_name", customer.first_name.as_str()),
            ("last_name", customer.last_name.as_str()),
            ("preferences", preferences.as_str()),
            ("purchases", purchases.as_str()),
            ("categories", categories.as_str()),
        ])?)
    }
}
