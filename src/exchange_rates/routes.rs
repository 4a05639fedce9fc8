//! Exchange rate route handlers

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::AppState;

use super::responses::{ExchangeRateDto, ExchangeRatesResponse, LastUpdateResponse};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/exchange-rates", get(list))
        .route("/api/exchange-rates/update", post(update))
        .route("/api/exchange-rates/status/last-update", get(last_update))
        .route("/api/exchange-rates/:currency", get(detail))
}

/// All stored rates
async fn list(State(state): State<AppState>) -> Result<Json<ExchangeRatesResponse>> {
    let rates = services::get_exchange_rates(
        &state.db,
        &state.cache,
        &state.http,
        &state.config.exchange_rates,
    )
    .await?;
    Ok(Json(rates))
}

/// Single currency rate
async fn detail(
    State(state): State<AppState>,
    Path(currency): Path<String>,
) -> Result<Json<ExchangeRateDto>> {
    Ok(Json(services::get_exchange_rate(&state.db, &currency).await?))
}

/// Refresh from upstream. Called by the scheduler or an external cron.
async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ExchangeRatesResponse>> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    services::check_cron_secret(state.config.cron_secret.as_deref(), authorization)?;

    let rates = services::update_exchange_rates(
        &state.db,
        &state.cache,
        &state.http,
        &state.config.exchange_rates,
    )
    .await?;
    Ok(Json(rates))
}

async fn last_update(State(state): State<AppState>) -> Result<Json<LastUpdateResponse>> {
    Ok(Json(services::last_update(&state.db).await?))
}
