//! HTTP server.
//!
//! Exposes search, recommendations, descriptions and catalog browsing as a
//! JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version and model) |
//! | `GET`  | `/api/products` | All products in catalog order |
//! | `POST` | `/api/products` | Create or replace a product |
//! | `GET`  | `/api/products/recent?limit=` | Newest products first |
//! | `GET`  | `/api/products/{id}` | One product |
//! | `GET`  | `/api/products/category/{category}` | Products in a category |
//! | `GET`  | `/api/products/brand/{brand}` | Products of a brand |
//! | `GET`  | `/api/products/search?query=` | Tiered search |
//! | `GET`  | `/api/products/recommendations/{customer_id}` | Personalized recommendations |
//! | `POST` | `/api/products/{id}/generate-description` | Model-written description (plain text) |
//! | `GET`  | `/api/customers` | All customers |
//! | `POST` | `/api/customers` | Register a customer (unique email) |
//! | `GET`  | `/api/customers/{id}` | One customer |
//! | `PUT`  | `/api/customers/{id}/preferences` | Replace a customer's preferences |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "customer not found: 7" } }
//! ```
//!
//! Error codes: `not_found` (404), `email_in_use` (409),
//! `completion_unavailable` (503), `timeout` (504), `internal` (500).
//! Malformed request bodies and a missing `query` parameter are rejected
//! by the extractors with 400/422 before reaching a handler.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use smartcart_core::{CompletionError, Customer, DiscoveryError, Product};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::context::AppContext;

/// Starts the HTTP server on `[server].bind` and serves until the process
/// is terminated.
pub async fn run_server(config: &Config, ctx: AppContext) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

/// Build the application router. Exposed for embedding and tests.
pub fn router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        tracing::info_span!(
            "request",
            request_id = %uuid::Uuid::new_v4(),
            method = %req.method(),
            path = %req.uri().path(),
        )
    });

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/products",
            get(handle_list_products).post(handle_create_product),
        )
        .route("/api/products/recent", get(handle_recent_products))
        .route("/api/products/search", get(handle_search))
        .route("/api/products/{id}", get(handle_get_product))
        .route("/api/products/category/{category}", get(handle_by_category))
        .route("/api/products/brand/{brand}", get(handle_by_brand))
        .route(
            "/api/products/recommendations/{customer_id}",
            get(handle_recommendations),
        )
        .route(
            "/api/products/{id}/generate-description",
            post(handle_generate_description),
        )
        .route(
            "/api/customers",
            get(handle_list_customers).post(handle_create_customer),
        )
        .route("/api/customers/{id}", get(handle_get_customer))
        .route(
            "/api/customers/{id}/preferences",
            put(handle_update_preferences),
        )
        .layer(trace)
        .layer(cors)
        .with_state(ctx)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<DiscoveryError> for AppError {
    fn from(err: DiscoveryError) -> Self {
        let (status, code) = match &err {
            DiscoveryError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            DiscoveryError::EmailInUse(_) => (StatusCode::CONFLICT, "email_in_use"),
            DiscoveryError::Completion(CompletionError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "timeout")
            }
            DiscoveryError::Completion(CompletionError::ServiceUnavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "completion_unavailable")
            }
            DiscoveryError::Prompt(_) | DiscoveryError::Store(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        DiscoveryError::Store(err).into()
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    model: String,
}

async fn handle_health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: ctx.model.clone(),
    })
}

// ============ Products ============

async fn handle_list_products(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(ctx.catalog.find_all().await?))
}

#[derive(Deserialize)]
struct RecentParams {
    limit: Option<usize>,
}

async fn handle_recent_products(
    State(ctx): State<AppContext>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(
        ctx.catalog.find_recent(params.limit.unwrap_or(10)).await?,
    ))
}

/// Handler for `POST /api/products`.
///
/// A body without `id` (or with `id <= 0`) creates a product with the next
/// free id; otherwise the product with that id is replaced.
async fn handle_create_product(
    State(ctx): State<AppContext>,
    Json(product): Json<Product>,
) -> Result<Json<Product>, AppError> {
    info!(name = %product.name, "creating product");
    let saved = ctx.store.save_product(product)?;
    info!(product_id = saved.id, "product created");
    Ok(Json(saved))
}

async fn handle_get_product(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    ctx.catalog
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| DiscoveryError::product_not_found(id).into())
}

async fn handle_by_category(
    State(ctx): State<AppContext>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = ctx.catalog.find_by_category(&category).await?;
    info!(count = products.len(), category = %category, "category listing");
    Ok(Json(products))
}

async fn handle_by_brand(
    State(ctx): State<AppContext>,
    Path(brand): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(ctx.catalog.find_by_brand(&brand).await?))
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

/// Handler for `GET /api/products/search`.
///
/// `query` is required. An explicit empty `?query=` matches the whole
/// catalog.
async fn handle_search(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Product>>, AppError> {
    let started = std::time::Instant::now();
    let outcome = ctx.search.search_with_outcome(&params.query).await?;
    info!(
        tier = %outcome.tier,
        count = outcome.products.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search completed"
    );
    Ok(Json(outcome.products))
}

async fn handle_recommendations(
    State(ctx): State<AppContext>,
    Path(customer_id): Path<i64>,
) -> Result<Json<Vec<Product>>, AppError> {
    let started = std::time::Instant::now();
    let products = ctx
        .recommendations
        .personalized_recommendations(customer_id)
        .await?;
    info!(
        count = products.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "recommendations generated"
    );
    Ok(Json(products))
}

/// Handler for `POST /api/products/{id}/generate-description`.
///
/// Responds with the model's text as `text/plain`, unmodified.
async fn handle_generate_description(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<String, AppError> {
    Ok(ctx.recommendations.describe_product_by_id(id).await?)
}

// ============ Customers ============

async fn handle_list_customers(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<Customer>>, AppError> {
    Ok(Json(ctx.customers.find_all().await?))
}

async fn handle_get_customer(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, AppError> {
    ctx.customers
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| DiscoveryError::customer_not_found(id).into())
}

/// Handler for `POST /api/customers`.
///
/// Fails with 409 `email_in_use` when the email is already registered.
async fn handle_create_customer(
    State(ctx): State<AppContext>,
    Json(customer): Json<Customer>,
) -> Result<Json<Customer>, AppError> {
    let saved = ctx.store.save_customer(customer)?;
    info!(customer_id = saved.id, "customer created");
    Ok(Json(saved))
}

async fn handle_update_preferences(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    Json(preferences): Json<Vec<String>>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(ctx.store.update_preferences(id, preferences)?))
}
