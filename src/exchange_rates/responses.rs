//! Response DTOs for exchange rate endpoints.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::currency::{format_exchange_rate, CurrencyCode, RateTable, BASE_CURRENCY};

use super::models::ExchangeRate;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateDto {
    pub currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub inverse_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub display_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub margin_percent: Decimal,
    pub fetched_at: DateTime<Utc>,
    /// e.g. "1 USD = ₩1,385"
    pub display: String,
}

impl From<ExchangeRate> for ExchangeRateDto {
    fn from(row: ExchangeRate) -> Self {
        let display = row
            .currency_code()
            .map(|code| {
                let table = RateTable::new(HashMap::from([(code, row.display_rate)]), row.fetched_at);
                format_exchange_rate(code, &table)
            })
            .unwrap_or_default();

        Self {
            currency: row.currency,
            rate: row.rate,
            inverse_rate: row.inverse_rate,
            display_rate: row.display_rate,
            margin_percent: row.margin_percent,
            fetched_at: row.fetched_at,
            display,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRatesResponse {
    pub base: CurrencyCode,
    pub rates: Vec<ExchangeRateDto>,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRatesResponse {
    pub fn new(rates: Vec<ExchangeRateDto>, updated_at: DateTime<Utc>) -> Self {
        Self {
            base: BASE_CURRENCY,
            rates,
            updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastUpdateResponse {
    pub last_update: Option<DateTime<Utc>>,
}
