//! Snug pricing service.
//!
//! Quotes accommodation stays (long-stay discounts, service fee) and keeps
//! the exchange rates used to show prices in the guest's currency.

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod exchange_rates;
pub mod pricing;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use cache::{AppCache, CacheStats};
use config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub http: reqwest::Client,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, http: reqwest::Client, config: Config) -> Self {
        Self {
            db,
            cache: AppCache::new(),
            http,
            config: Arc::new(config),
        }
    }
}

/// Build the full router with middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(pricing::router())
        .merge(exchange_rates::router())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    cache: CacheStats,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cache: state.cache.stats(),
    })
}
