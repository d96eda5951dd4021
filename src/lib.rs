//! # SmartCart
//!
//! Catalog search and personalized recommendations backed by a
//! language-model completion service.
//!
//! Search runs a three-tier fallback chain: a plain substring match over
//! the catalog, then a model-expanded keyword search, then a heuristic
//! relevance filter over the whole catalog. Recommendations turn a
//! customer's purchase history into a prompt and filter the catalog by the
//! model's reply.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌──────────────┐
//! │ catalog.json │──▶│ InMemoryCatalog │◀──│ Orchestrator │──▶ completion
//! └──────────────┘   └─────────────────┘   │ Recommender  │    (Ollama /
//!                                          └──────┬───────┘     OpenAI)
//!                                ┌────────────────┤
//!                                ▼                ▼
//!                           ┌─────────┐     ┌──────────┐
//!                           │   CLI   │     │   HTTP   │
//!                           └─────────┘     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! smartcart search "iphone"
//! smartcart search "something for my commute" --explain
//! smartcart recommend 1
//! smartcart describe 2
//! smartcart serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`catalog`] | JSON catalog file loading |
//! | [`completion`] | HTTP completion clients |
//! | [`context`] | Service wiring |
//! | [`search`] | `search` command |
//! | [`recommend`] | `recommend` and `describe` commands |
//! | [`browse`] | `products` and `customers` commands |
//! | [`server`] | HTTP server |

pub mod browse;
pub mod catalog;
pub mod completion;
pub mod config;
pub mod context;
pub mod logging;
pub mod recommend;
pub mod search;
pub mod server;

pub use smartcart_core as core;
