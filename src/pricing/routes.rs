//! Pricing route handlers

use axum::{extract::State, routing::{get, post}, Json, Router};
use tracing::debug;

use crate::error::Result;
use crate::AppState;

use super::requests::QuoteRequest;
use super::responses::{DiscountTiersResponse, QuoteResponse};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/quote", post(quote))
        .route("/api/pricing/discount-tiers", get(discount_tiers))
}

/// Price a stay, optionally converted into the guest's currency
async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let quote = request.validate()?;

    let rates = if services::needs_rates(&quote) {
        Some(state.cache.rate_table(&state.db).await)
    } else {
        None
    };

    let response = services::quote_stay(&state.config.pricing, &quote, rates.as_deref());
    debug!(
        nights = quote.stay.nights,
        discount_percent = response.discount_percent,
        total = %response.total,
        "Quoted stay"
    );

    Ok(Json(response))
}

async fn discount_tiers(State(state): State<AppState>) -> Json<DiscountTiersResponse> {
    Json(services::discount_tiers(&state.config.pricing))
}
