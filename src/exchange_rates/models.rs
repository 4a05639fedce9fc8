//! Database and upstream models for exchange rates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::currency::{CurrencyCode, RateTable};

/// Stored rate from exchange_rates.
///
/// `rate` is the raw upstream value (1 KRW = rate units), `display_rate` has
/// the margin applied and is what prices are converted with.
#[derive(Debug, Clone, FromRow)]
pub struct ExchangeRate {
    pub id: Uuid,
    pub currency: String,
    pub rate: Decimal,
    pub inverse_rate: Decimal,
    pub display_rate: Decimal,
    pub margin_percent: Decimal,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn currency_code(&self) -> Option<CurrencyCode> {
        self.currency.parse().ok()
    }
}

/// Rate computed from an upstream fetch, ready to upsert
#[derive(Debug, Clone, PartialEq)]
pub struct NewExchangeRate {
    pub currency: CurrencyCode,
    pub rate: Decimal,
    pub inverse_rate: Decimal,
    pub display_rate: Decimal,
    pub margin_percent: Decimal,
    pub source: String,
}

/// Payload of the open.er-api.com `latest` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalRatesResponse {
    pub result: String,
    #[serde(default)]
    pub base_code: Option<String>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

/// Build a conversion table from stored rows.
///
/// Returns `None` when no supported currency is stored.
pub fn rate_table_from_rows(rows: &[ExchangeRate]) -> Option<RateTable> {
    let rates: HashMap<CurrencyCode, Decimal> = rows
        .iter()
        .filter_map(|row| row.currency_code().map(|code| (code, row.display_rate)))
        .collect();

    if rates.is_empty() {
        return None;
    }

    let updated_at = rows.iter().map(|row| row.fetched_at).max()?;
    Some(RateTable::new(rates, updated_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn row(currency: &str, display_rate: Decimal, fetched_at: DateTime<Utc>) -> ExchangeRate {
        ExchangeRate {
            id: Uuid::new_v4(),
            currency: currency.to_string(),
            rate: display_rate,
            inverse_rate: Decimal::ZERO,
            display_rate,
            margin_percent: dec!(2.5),
            source: "test".to_string(),
            fetched_at,
        }
    }

    #[test]
    fn test_rate_table_from_rows() {
        let now = Utc::now();
        let earlier = now - Duration::hours(3);
        let rows = vec![
            row("USD", dec!(0.0007), earlier),
            row("JPY", dec!(0.1), now),
            row("XYZ", dec!(5), now),
        ];

        let table = rate_table_from_rows(&rows).unwrap();
        assert_eq!(table.rates.len(), 2);
        assert_eq!(table.rate(CurrencyCode::Usd), dec!(0.0007));
        assert_eq!(table.updated_at, now);
    }

    #[test]
    fn test_rate_table_from_no_rows() {
        assert!(rate_table_from_rows(&[]).is_none());
        assert!(rate_table_from_rows(&[row("XYZ", dec!(1), Utc::now())]).is_none());
    }

    #[test]
    fn test_external_payload_parses() {
        let payload: ExternalRatesResponse = serde_json::from_str(
            r#"{"result":"success","base_code":"KRW","rates":{"KRW":1,"USD":0.00072,"JPY":0.108}}"#,
        )
        .unwrap();
        assert_eq!(payload.result, "success");
        assert_eq!(payload.rates.get("USD"), Some(&0.00072));
    }

    #[test]
    fn test_external_error_payload_parses() {
        let payload: ExternalRatesResponse =
            serde_json::from_str(r#"{"result":"error","error-type":"unsupported-code"}"#).unwrap();
        assert_eq!(payload.result, "error");
        assert!(payload.rates.is_empty());
    }
}
