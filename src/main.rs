//! # SmartCart CLI (`smartcart`)
//!
//! ## Usage
//!
//! ```bash
//! smartcart --config ./config/smartcart.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `smartcart search "<query>"` | Tiered catalog search |
//! | `smartcart recommend <customer-id>` | Personalized recommendations |
//! | `smartcart describe <product-id>` | Model-written product description |
//! | `smartcart products` | List products (by category, brand, or recency) |
//! | `smartcart customers` | List customers |
//! | `smartcart serve` | Start the HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use smartcart::browse::{self, ProductFilter};
use smartcart::config;
use smartcart::context::AppContext;
use smartcart::logging::{self, LogFormat};
use smartcart::{recommend, search, server};

/// SmartCart: catalog search and recommendations with a completion model.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/smartcart.example.toml` for a full example.
#[derive(Parser)]
#[command(name = "smartcart", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/smartcart.toml")]
    config: PathBuf,

    /// Log output format. Logs always go to stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog.
    ///
    /// Tries a literal substring match first. If nothing matches, asks the
    /// completion model for related keywords and retries, then falls back
    /// to filtering the whole catalog by the model's reply.
    Search {
        /// Search query. Matched case-insensitively against name,
        /// description, and category.
        query: String,

        /// Print which tier answered and the model's keywords.
        #[arg(long)]
        explain: bool,
    },

    /// Recommend products for a customer based on purchase history.
    Recommend {
        /// Customer ID.
        customer_id: i64,
    },

    /// Generate a marketing description for a product.
    Describe {
        /// Product ID.
        product_id: i64,
    },

    /// List products.
    Products {
        /// Only products in this category (exact match).
        #[arg(long)]
        category: Option<String>,

        /// Only products of this brand (exact match).
        #[arg(long)]
        brand: Option<String>,

        /// Only the N most recently added products.
        #[arg(long)]
        recent: Option<usize>,
    },

    /// List customers.
    Customers,

    /// Start the HTTP server.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format)?;

    let cfg = config::load_config(&cli.config)?;
    let ctx = AppContext::from_config(&cfg)?;

    match cli.command {
        Commands::Search { query, explain } => {
            search::run_search(&ctx, &query, explain).await?;
        }
        Commands::Recommend { customer_id } => {
            recommend::run_recommend(&ctx, customer_id).await?;
        }
        Commands::Describe { product_id } => {
            recommend::run_describe(&ctx, product_id).await?;
        }
        Commands::Products {
            category,
            brand,
            recent,
        } => {
            let filter = ProductFilter {
                category,
                brand,
                recent,
            };
            browse::run_products(&ctx, &filter).await?;
        }
        Commands::Customers => {
            browse::run_customers(&ctx).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg, ctx).await?;
        }
    }

    Ok(())
}
