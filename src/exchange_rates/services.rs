//! Exchange rate service functions.
//!
//! Fetches the latest KRW-based rates from the upstream API, applies the
//! platform margin and stores them. Reads fall back to an update when the
//! table is still empty.

use chrono::Utc;
use rust_decimal::prelude::*;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::cache::AppCache;
use crate::config::ExchangeRateConfig;
use crate::currency::CurrencyCode;
use crate::error::{AppError, Result};
use crate::pricing::round_money;

use super::models::{ExternalRatesResponse, NewExchangeRate};
use super::queries;
use super::responses::{ExchangeRateDto, ExchangeRatesResponse, LastUpdateResponse};

const RATE_PLACES: u32 = 10;
const INVERSE_RATE_PLACES: u32 = 4;

/// Turn one upstream rate into a stored rate.
///
/// The margin lowers the foreign currency's value, so guests converting out
/// of KRW see slightly smaller amounts. Zero, negative or non-finite upstream
/// values yield `None`.
pub fn compute_rate(
    currency: CurrencyCode,
    raw: f64,
    margin_percent: Decimal,
    source: &str,
) -> Option<NewExchangeRate> {
    let rate = Decimal::from_f64(raw).filter(|r| *r > Decimal::ZERO)?;
    let rate = round_money(rate, RATE_PLACES);
    if rate.is_zero() {
        return None;
    }

    let multiplier = Decimal::ONE - margin_percent / Decimal::ONE_HUNDRED;
    let display_rate = round_money(rate * multiplier, RATE_PLACES);
    let inverse_rate = round_money(Decimal::ONE / rate, INVERSE_RATE_PLACES);

    Some(NewExchangeRate {
        currency,
        rate,
        inverse_rate,
        display_rate,
        margin_percent,
        source: source.to_string(),
    })
}

/// Extract the supported currencies from an upstream payload, ordered by code.
pub fn rates_from_upstream(
    payload: &ExternalRatesResponse,
    margin_percent: Decimal,
    source: &str,
) -> Result<Vec<NewExchangeRate>> {
    if payload.result != "success" {
        return Err(AppError::Upstream(format!(
            "Exchange rate API returned result '{}'",
            payload.result
        )));
    }

    let mut rates: Vec<NewExchangeRate> = CurrencyCode::foreign()
        .filter_map(|currency| {
            let computed = payload
                .rates
                .get(currency.code())
                .and_then(|raw| compute_rate(currency, *raw, margin_percent, source));
            if computed.is_none() {
                warn!("No rate found for {}", currency);
            }
            computed
        })
        .collect();
    rates.sort_by_key(|rate| rate.currency.code());

    Ok(rates)
}

/// Host part of the upstream URL, recorded as the rate source
pub fn source_name(api_url: &str) -> &str {
    let without_scheme = api_url.split_once("://").map(|(_, rest)| rest).unwrap_or(api_url);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}

async fn fetch_upstream(client: &reqwest::Client, url: &str) -> Result<ExternalRatesResponse> {
    let payload = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<ExternalRatesResponse>()
        .await?;

    Ok(payload)
}

/// Fetch rates from upstream and store them.
pub async fn update_exchange_rates(
    pool: &PgPool,
    cache: &AppCache,
    client: &reqwest::Client,
    config: &ExchangeRateConfig,
) -> Result<ExchangeRatesResponse> {
    info!("Fetching exchange rates from {}", config.api_url);

    let payload = fetch_upstream(client, &config.api_url).await?;
    let computed = rates_from_upstream(&payload, config.margin_percent, source_name(&config.api_url))?;

    let now = Utc::now();
    let mut stored = Vec::with_capacity(computed.len());
    for rate in &computed {
        stored.push(ExchangeRateDto::from(queries::upsert_rate(pool, rate, now).await?));
    }

    cache.invalidate_rates().await;

    info!(
        "Exchange rates updated successfully: {}",
        stored
            .iter()
            .map(|r| r.currency.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(ExchangeRatesResponse::new(stored, now))
}

/// All stored rates. Populates the table first if it is empty.
pub async fn get_exchange_rates(
    pool: &PgPool,
    cache: &AppCache,
    client: &reqwest::Client,
    config: &ExchangeRateConfig,
) -> Result<ExchangeRatesResponse> {
    let rows = queries::list_rates(pool).await?;

    if rows.is_empty() {
        return update_exchange_rates(pool, cache, client, config).await;
    }

    let updated_at = rows
        .iter()
        .map(|row| row.fetched_at)
        .max()
        .unwrap_or_else(Utc::now);

    Ok(ExchangeRatesResponse::new(
        rows.into_iter().map(ExchangeRateDto::from).collect(),
        updated_at,
    ))
}

/// Stored rate for one currency. Unsupported codes are not looked up.
pub async fn get_exchange_rate(pool: &PgPool, currency: &str) -> Result<ExchangeRateDto> {
    let not_found = || AppError::NotFound(format!("No exchange rate for {}", currency.trim().to_uppercase()));

    let code: CurrencyCode = currency.parse().map_err(|_| not_found())?;
    queries::find_rate(pool, code.code())
        .await?
        .map(ExchangeRateDto::from)
        .ok_or_else(not_found)
}

pub async fn last_update(pool: &PgPool) -> Result<LastUpdateResponse> {
    Ok(LastUpdateResponse {
        last_update: queries::last_update(pool).await?,
    })
}

/// Check the `Authorization` header against the configured cron secret.
///
/// With no secret configured every caller is allowed.
pub fn check_cron_secret(expected: Option<&str>, authorization: Option<&str>) -> Result<()> {
    let Some(secret) = expected else {
        return Ok(());
    };

    match authorization.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if token == secret => Ok(()),
        _ => {
            warn!("Unauthorized exchange rate update attempted");
            Err(AppError::Unauthorized)
        }
    }
}
