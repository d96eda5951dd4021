//! Service wiring shared by the CLI and the HTTP server.
//!
//! [`AppContext`] loads the catalog, builds the completion client, and
//! hands out the store and the search and recommendation services, all
//! behind `Arc`s so it can be cloned into every request handler.

use anyhow::Result;
use std::sync::Arc;

use smartcart_core::store::memory::InMemoryCatalog;
use smartcart_core::{
    CatalogStore, CompletionClient, CustomerStore, RecommendationEngine, SearchOrchestrator,
};

use crate::catalog::load_catalog;
use crate::completion::create_client;
use crate::config::Config;

#[derive(Clone)]
pub struct AppContext {
    /// Write access for the create/update endpoints.
    pub store: Arc<InMemoryCatalog>,
    pub catalog: Arc<dyn CatalogStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub search: SearchOrchestrator,
    pub recommendations: RecommendationEngine,
    /// Model name reported by the completion client.
    pub model: String,
}

impl AppContext {
    /// Load the configured catalog and build the configured completion
    /// client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(load_catalog(&config.catalog.path)?);
        let completion = create_client(&config.completion)?;
        Self::with_parts(config, store, completion)
    }

    /// Build services over an existing store and completion client.
    pub fn with_parts(
        config: &Config,
        store: Arc<InMemoryCatalog>,
        completion: Arc<dyn CompletionClient>,
    ) -> Result<Self> {
        let model = completion.model_name().to_string();
        let search = SearchOrchestrator::new(store.clone(), completion.clone())
            .with_expansion_mode(config.search.mode()?)
            .with_semantic_limit(config.search.semantic_limit);
        let recommendations =
            RecommendationEngine::new(store.clone(), store.clone(), completion)
                .with_limit(config.recommendations.limit)
                .with_categories(config.recommendations.categories.clone());

        Ok(Self {
            catalog: store.clone(),
            customers: store.clone(),
            store,
            search,
            recommendations,
            model,
        })
    }
}
