//! Tiered product search.
//!
//! [`SearchOrchestrator`] answers a query through a strict fallback chain
//! and returns the first tier that produces anything:
//!
//! 1. **Deterministic**: [`CatalogStore::find_by_search_query`] with the
//!    user's query.
//! 2. **Augmented**: ask the completion service for alternative keywords
//!    and run the same substring search with its answer.
//! 3. **Semantic**: run the [relevance filter](crate::relevance) over the
//!    full catalog with that same answer, capped at `semantic_limit`.
//!
//! At most one completion call is made per search: tier 3 reuses the
//! tier-2 outcome. A completion failure never escapes; the affected tier
//! simply yields nothing. The completion answer is never trimmed or
//! special-cased, so an empty answer matches the whole catalog at tier 2
//! just as an empty user query does at tier 1. Store failures are
//! propagated.
//!
//! # Expansion modes
//!
//! By default tier 2 searches with the completion text *as a whole*
//! ([`ExpansionMode::Literal`]), so `"Electronics, Mobile"` is looked up as
//! one string. [`ExpansionMode::PerKeyword`] instead splits the answer on
//! commas and newlines and merges the per-term hits.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::completion::{CompletionClient, CompletionError};
use crate::error::DiscoveryResult;
use crate::models::Product;
use crate::prompt::PromptTemplate;
use crate::relevance;
use crate::store::CatalogStore;

/// Keyword-expansion prompt shared by tiers 2 and 3.
pub const EXPANSION_PROMPT: PromptTemplate = PromptTemplate::new(
    "The user is searching for products with the query: '{query}'\n\
     Suggest 3-5 alternative keywords or categories that might match their intent. \
     Focus on product categories, brands, or features. \
     Return only the keywords separated by commas.",
);

/// How tier 2 turns the completion text into catalog queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionMode {
    /// Search with the entire completion text as a single query.
    #[default]
    Literal,
    /// Search each comma/newline-separated term and merge the hits.
    PerKeyword,
}

impl std::str::FromStr for ExpansionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "literal" => Ok(Self::Literal),
            "per_keyword" => Ok(Self::PerKeyword),
            other => Err(format!(
                "unknown expansion mode '{}'. Use literal or per_keyword.",
                other
            )),
        }
    }
}

/// The tier that produced a search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Deterministic,
    Augmented,
    Semantic,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Deterministic => write!(f, "deterministic"),
            Tier::Augmented => write!(f, "augmented"),
            Tier::Semantic => write!(f, "semantic"),
        }
    }
}

/// Products returned by a search together with the tier that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub tier: Tier,
    /// Completion text used by tiers 2 and 3, if the call succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<String>,
    pub products: Vec<Product>,
}

/// Three-tier search over a catalog.
#[derive(Clone)]
pub struct SearchOrchestrator {
    catalog: Arc<dyn CatalogStore>,
    completion: Arc<dyn CompletionClient>,
    mode: ExpansionMode,
    semantic_limit: usize,
}

impl SearchOrchestrator {
    pub fn new(catalog: Arc<dyn CatalogStore>, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            catalog,
            completion,
            mode: ExpansionMode::default(),
            semantic_limit: relevance::DEFAULT_LIMIT,
        }
    }

    pub fn with_expansion_mode(mut self, mode: ExpansionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_semantic_limit(mut self, limit: usize) -> Self {
        self.semantic_limit = limit;
        self
    }

    pub fn expansion_mode(&self) -> ExpansionMode {
        self.mode
    }

    /// Search the catalog, returning only the products.
    pub async fn search(&self, query: &str) -> DiscoveryResult<Vec<Product>> {
        Ok(self.search_with_outcome(query).await?.products)
    }

    /// Search the catalog and report which tier answered.
    #[instrument(skip(self), fields(mode = ?self.mode))]
    pub async fn search_with_outcome(&self, query: &str) -> DiscoveryResult<SearchOutcome> {
        let direct = self.catalog.find_by_search_query(query).await?;
        info!(count = direct.len(), "deterministic search finished");
        if !direct.is_empty() {
            return Ok(SearchOutcome {
                tier: Tier::Deterministic,
                expansion: None,
                products: direct,
            });
        }

        let expansion = match self.expand(query).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "keyword expansion failed; returning no results");
                return Ok(SearchOutcome {
                    tier: Tier::Semantic,
                    expansion: None,
                    products: Vec::new(),
                });
            }
        };
        debug!(expansion = %expansion, "completion suggested keywords");

        let augmented = self.augmented_search(&expansion).await?;
        info!(count = augmented.len(), "augmented search finished");
        if !augmented.is_empty() {
            return Ok(SearchOutcome {
                tier: Tier::Augmented,
                expansion: Some(expansion),
                products: augmented,
            });
        }

        let catalog = self.catalog.find_all().await?;
        let semantic = relevance::filter(&expansion, &catalog, self.semantic_limit);
        info!(count = semantic.len(), "semantic fallback finished");
        Ok(SearchOutcome {
            tier: Tier::Semantic,
            expansion: Some(expansion),
            products: semantic,
        })
    }

    async fn expand(&self, query: &str) -> Result<String, CompletionError> {
        let prompt = EXPANSION_PROMPT
            .render(&[("query", query)])
            .map_err(|e| CompletionError::unavailable(e.to_string()))?;
        self.completion.complete(&prompt).await
    }

    async fn augmented_search(&self, expansion: &str) -> DiscoveryResult<Vec<Product>> {
        match self.mode {
            ExpansionMode::Literal => Ok(self.catalog.find_by_search_query(expansion).await?),
            ExpansionMode::PerKeyword => {
                let mut seen = HashSet::new();
                let mut merged = Vec::new();
                for term in split_keywords(expansion) {
                    for product in self.catalog.find_by_search_query(term).await? {
                        if seen.insert(product.id) {
                            merged.push(product);
                        }
                    }
                }
                Ok(merged)
            }
        }
    }
}

/// Split a completion answer into trimmed, non-empty keyword terms.
pub fn split_keywords(text: &str) -> Vec<&str> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::ScriptedCompletion;
    use crate::store::memory::InMemoryCatalog;
    use std::time::Duration;

    fn catalog() -> Arc<InMemoryCatalog> {
        Arc::new(InMemoryCatalog::with_records(
            vec![
                Product::new(1, "MacBook Pro", "Electronics")
                    .with_description("High-performance laptop for professionals"),
                Product::new(2, "iPhone 15", "Electronics")
                    .with_description("Latest smartphone with advanced features"),
                Product::new(3, "Spring Boot in Action", "Books")
                    .with_description("Comprehensive guide to Spring Boot development"),
                Product::new(4, "Running Shoes", "Sports")
                    .with_description("Comfortable athletic shoes for running"),
                Product::new(5, "Phone Case", "Accessories")
                    .with_description("Protective cover"),
            ],
            Vec::new(),
        ))
    }

    fn orchestrator(
        store: Arc<InMemoryCatalog>,
        client: Arc<ScriptedCompletion>,
    ) -> SearchOrchestrator {
        SearchOrchestrator::new(store, client)
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn test_tier1_hit_skips_completion() {
        let client = Arc::new(ScriptedCompletion::new());
        let search = orchestrator(catalog(), client.clone());

        let out = search.search_with_outcome("iphone").await.unwrap();
        assert_eq!(out.tier, Tier::Deterministic);
        assert_eq!(ids(&out.products), vec![2]);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_tier2_reuses_literal_completion_text() {
        let store = catalog();
        store
            .save_product(
                Product::new(9, "Bundle", "Deals")
                    .with_description("Save on Electronics, Mobile accessories"),
            )
            .unwrap();
        let client = Arc::new(ScriptedCompletion::with_responses(["Electronics, Mobile"]));
        let search = orchestrator(store, client.clone());

        let out = search.search_with_outcome("cellphone").await.unwrap();
        assert_eq!(out.tier, Tier::Augmented);
        // Only the product containing the whole string matches; the plain
        // Electronics products would have matched a comma-split term.
        assert_eq!(ids(&out.products), vec![9]);
        assert_eq!(out.expansion.as_deref(), Some("Electronics, Mobile"));
        assert_eq!(client.call_count(), 1);
        assert!(client.prompts()[0].contains("'cellphone'"));
    }

    #[tokio::test]
    async fn test_tier3_filters_catalog_with_single_completion_call() {
        let client = Arc::new(ScriptedCompletion::with_responses([
            "electronics, accessories",
        ]));
        let search = orchestrator(catalog(), client.clone());

        let out = search.search_with_outcome("cellphone").await.unwrap();
        assert_eq!(out.tier, Tier::Semantic);
        assert_eq!(ids(&out.products), vec![1, 2, 5]);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tier3_is_capped() {
        let store = catalog();
        for i in 10..20 {
            store
                .save_product(Product::new(i, format!("Gadget {i}"), "Electronics"))
                .unwrap();
        }
        let client = Arc::new(ScriptedCompletion::with_responses(["electronics, gizmos"]));
        let search = orchestrator(store, client);

        let out = search.search_with_outcome("zzz").await.unwrap();
        assert_eq!(out.tier, Tier::Semantic);
        assert_eq!(ids(&out.products), vec![1, 2, 10, 11, 12]);
    }

    #[tokio::test]
    async fn test_semantic_limit_is_configurable() {
        let client = Arc::new(ScriptedCompletion::with_responses(["electronics, misc"]));
        let search = orchestrator(catalog(), client).with_semantic_limit(1);
        let out = search.search("zzz").await.unwrap();
        assert_eq!(ids(&out), vec![1]);
    }

    #[tokio::test]
    async fn test_completion_failure_degrades_to_empty() {
        let client = Arc::new(ScriptedCompletion::new());
        client.push_error(CompletionError::Timeout(Duration::from_secs(30)));
        let search = orchestrator(catalog(), client.clone());

        let out = search.search_with_outcome("zzz").await.unwrap();
        assert!(out.products.is_empty());
        assert!(out.expansion.is_none());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_all_tiers_empty() {
        let client = Arc::new(ScriptedCompletion::with_responses(["garden, furniture"]));
        let search = orchestrator(catalog(), client);
        let out = search.search_with_outcome("zzz").await.unwrap();
        assert_eq!(out.tier, Tier::Semantic);
        assert!(out.products.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_matches_whole_catalog() {
        let client = Arc::new(ScriptedCompletion::new());
        let search = orchestrator(catalog(), client.clone());
        let out = search.search_with_outcome("").await.unwrap();
        assert_eq!(out.tier, Tier::Deterministic);
        assert_eq!(out.products.len(), 5);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_query_is_matched_literally() {
        let client = Arc::new(ScriptedCompletion::with_responses([""]));
        let search = orchestrator(catalog(), client.clone());

        let single = search.search_with_outcome(" ").await.unwrap();
        assert_eq!(single.tier, Tier::Deterministic);
        assert_eq!(single.products.len(), 5);

        // No product text contains three spaces, so the empty completion
        // answer is searched as-is at tier 2.
        let triple = search.search_with_outcome("   ").await.unwrap();
        assert_eq!(triple.tier, Tier::Augmented);
        assert_eq!(triple.products.len(), 5);
        assert_eq!(triple.expansion.as_deref(), Some(""));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_completion_text_matches_catalog_at_tier2() {
        let client = Arc::new(ScriptedCompletion::with_responses([""]));
        let search = orchestrator(catalog(), client.clone());

        let out = search.search_with_outcome("zzz").await.unwrap();
        assert_eq!(out.tier, Tier::Augmented);
        assert_eq!(ids(&out.products), vec![1, 2, 3, 4, 5]);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_completion_text_is_matched_literally() {
        let client = Arc::new(ScriptedCompletion::with_responses([" "]));
        let search = orchestrator(catalog(), client);

        // Every sample product has a space in its name.
        let out = search.search_with_outcome("zzz").await.unwrap();
        assert_eq!(out.tier, Tier::Augmented);
        assert_eq!(out.products.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_query_on_empty_catalog_falls_through() {
        let client = Arc::new(ScriptedCompletion::with_responses(["books"]));
        let search = orchestrator(Arc::new(InMemoryCatalog::new()), client.clone());
        let out = search.search("").await.unwrap();
        assert!(out.is_empty());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_per_keyword_mode_merges_terms() {
        let client = Arc::new(ScriptedCompletion::with_responses([
            "Electronics, Mobile\nbooks, ",
        ]));
        let search =
            orchestrator(catalog(), client).with_expansion_mode(ExpansionMode::PerKeyword);

        let out = search.search_with_outcome("gifts").await.unwrap();
        assert_eq!(out.tier, Tier::Augmented);
        assert_eq!(ids(&out.products), vec![1, 2, 3]);
    }

    #[test]
    fn test_split_keywords() {
        assert_eq!(split_keywords(" a, b ,\n c,,\n"), vec!["a", "b", "c"]);
        assert!(split_keywords(" , \n").is_empty());
    }

    #[test]
    fn test_expansion_mode_from_str() {
        assert_eq!("literal".parse::<ExpansionMode>(), Ok(ExpansionMode::Literal));
        assert_eq!(
            "per_keyword".parse::<ExpansionMode>(),
            Ok(ExpansionMode::PerKeyword)
        );
        assert!("fuzzy".parse::<ExpansionMode>().is_err());
    }
}
