//! # SmartCart Core
//!
//! Shared logic for SmartCart: data models, catalog/customer store
//! contracts, the completion-client abstraction, prompt templates, the
//! relevance filter, tiered search, and personalized recommendations.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies. Concrete
//! completion clients and the catalog file loader live in the `smartcart`
//! app crate.

pub mod completion;
pub mod error;
pub mod models;
pub mod prompt;
pub mod recommend;
pub mod relevance;
pub mod search;
pub mod store;

pub use completion::{CompletionClient, CompletionError};
pub use error::{DiscoveryError, DiscoveryResult, EntityKind};
pub use models::{Customer, CustomerId, Product, ProductId};
pub use recommend::RecommendationEngine;
pub use search::{ExpansionMode, SearchOrchestrator, SearchOutcome, Tier};
pub use store::{CatalogStore, CustomerStore};
