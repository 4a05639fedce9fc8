//! Database queries for exchange rates.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

use super::models::{ExchangeRate, NewExchangeRate};

/// All stored rates, ordered by currency code
pub async fn list_rates(pool: &PgPool) -> Result<Vec<ExchangeRate>> {
    let rates = sqlx::query_as::<_, ExchangeRate>(
        r#"
        SELECT
            id, currency, rate, inverse_rate, display_rate,
            margin_percent, source, fetched_at
        FROM exchange_rates
        ORDER BY currency ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rates)
}

/// Stored rate for one currency code (already upper-cased)
pub async fn find_rate(pool: &PgPool, currency: &str) -> Result<Option<ExchangeRate>> {
    let rate = sqlx::query_as::<_, ExchangeRate>(
        r#"
        SELECT
            id, currency, rate, inverse_rate, display_rate,
            margin_percent, source, fetched_at
        FROM exchange_rates
        WHERE currency = $1
        "#,
    )
    .bind(currency)
    .fetch_optional(pool)
    .await?;

    Ok(rate)
}

/// Insert or replace the rate for a currency
pub async fn upsert_rate(
    pool: &PgPool,
    rate: &NewExchangeRate,
    fetched_at: DateTime<Utc>,
) -> Result<ExchangeRate> {
    let stored = sqlx::query_as::<_, ExchangeRate>(
        r#"
        INSERT INTO exchange_rates (
            id, currency, rate, inverse_rate, display_rate,
            margin_percent, source, fetched_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (currency) DO UPDATE SET
            rate = EXCLUDED.rate,
            inverse_rate = EXCLUDED.inverse_rate,
            display_rate = EXCLUDED.display_rate,
            margin_percent = EXCLUDED.margin_percent,
            fetched_at = EXCLUDED.fetched_at
        RETURNING
            id, currency, rate, inverse_rate, display_rate,
            margin_percent, source, fetched_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(rate.currency.code())
    .bind(rate.rate)
    .bind(rate.inverse_rate)
    .bind(rate.display_rate)
    .bind(rate.margin_percent)
    .bind(&rate.source)
    .bind(fetched_at)
    .fetch_one(pool)
    .await?;

    Ok(stored)
}

/// Most recent fetch time across all currencies
pub async fn last_update(pool: &PgPool) -> Result<Option<DateTime<Utc>>> {
    let latest = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
        r#"
        SELECT MAX(fetched_at)
        FROM exchange_rates
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(latest)
}
