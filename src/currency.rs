//! Supported currencies, conversion and display formatting.
//!
//! All stored prices are in the base currency (KRW). Rates are expressed as
//! "1 KRW = rate units of the currency", so converting between two foreign
//! currencies goes through KRW.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::round_money;

/// Currency codes Snug can display prices in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Krw,
    Usd,
    Jpy,
    Cny,
    Eur,
}

/// Currency that prices are stored in
pub const BASE_CURRENCY: CurrencyCode = CurrencyCode::Krw;

pub const SUPPORTED_CURRENCIES: [CurrencyCode; 5] = [
    CurrencyCode::Krw,
    CurrencyCode::Usd,
    CurrencyCode::Jpy,
    CurrencyCode::Cny,
    CurrencyCode::Eur,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported currency: {0}")]
pub struct UnsupportedCurrency(pub String);

impl CurrencyCode {
    pub fn code(&self) -> &'static str {
        match self {
            CurrencyCode::Krw => "KRW",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Eur => "EUR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyCode::Krw => "₩",
            CurrencyCode::Usd => "$",
            CurrencyCode::Jpy | CurrencyCode::Cny => "¥",
            CurrencyCode::Eur => "€",
        }
    }

    /// Fraction digits shown and kept after conversion
    pub fn decimals(&self) -> u32 {
        match self {
            CurrencyCode::Krw | CurrencyCode::Jpy => 0,
            CurrencyCode::Usd | CurrencyCode::Cny | CurrencyCode::Eur => 2,
        }
    }

    /// Currencies that carry a rate (everything except the base)
    pub fn foreign() -> impl Iterator<Item = CurrencyCode> {
        SUPPORTED_CURRENCIES
            .into_iter()
            .filter(|c| *c != BASE_CURRENCY)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = UnsupportedCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUPPORTED_CURRENCIES
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnsupportedCurrency(s.to_string()))
    }
}

/// Snapshot of display rates relative to the base currency
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base: CurrencyCode,
    pub rates: HashMap<CurrencyCode, Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl RateTable {
    pub fn new(rates: HashMap<CurrencyCode, Decimal>, updated_at: DateTime<Utc>) -> Self {
        Self {
            base: BASE_CURRENCY,
            rates,
            updated_at,
        }
    }

    /// Rates used when neither the database nor the cache has anything.
    pub fn fallback() -> Self {
        Self::new(fallback_rates(), Utc::now())
    }

    /// Units of `currency` per 1 KRW. Missing or zero entries use the fallback.
    pub fn rate(&self, currency: CurrencyCode) -> Decimal {
        if currency == BASE_CURRENCY {
            return Decimal::ONE;
        }
        self.rates
            .get(&currency)
            .copied()
            .filter(|r| !r.is_zero())
            .unwrap_or_else(|| fallback_rate(currency))
    }
}

fn fallback_rate(currency: CurrencyCode) -> Decimal {
    match currency {
        CurrencyCode::Krw => Decimal::ONE,
        CurrencyCode::Usd => dec!(0.00074),
        CurrencyCode::Jpy => dec!(0.11),
        CurrencyCode::Cny => dec!(0.0053),
        CurrencyCode::Eur => dec!(0.00068),
    }
}

fn fallback_rates() -> HashMap<CurrencyCode, Decimal> {
    CurrencyCode::foreign()
        .map(|c| (c, fallback_rate(c)))
        .collect()
}

/// Convert `amount` between currencies via KRW.
///
/// The result is rounded up to the target currency's decimals so a
/// converted price never undercharges.
pub fn convert_currency(
    amount: Decimal,
    from: CurrencyCode,
    to: CurrencyCode,
    table: &RateTable,
) -> Decimal {
    if from == to {
        return amount;
    }

    let in_base = if from == BASE_CURRENCY {
        amount
    } else {
        amount / table.rate(from)
    };

    let converted = if to == BASE_CURRENCY {
        in_base
    } else {
        in_base * table.rate(to)
    };

    converted.round_dp_with_strategy(to.decimals(), RoundingStrategy::ToPositiveInfinity)
}

/// Format an amount for display, e.g. `₩1,500,000` or `$1,234.56`.
pub fn format_price(amount: Decimal, currency: CurrencyCode) -> String {
    let decimals = currency.decimals();
    let rounded = round_money(amount, decimals);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let abs = rounded.abs();
    let whole = abs.trunc();
    let integer_digits = whole.to_string();

    let mut formatted = format!("{}{}{}", sign, currency.symbol(), group_thousands(&integer_digits));
    if decimals > 0 {
        let fraction = ((abs - whole) * Decimal::from(10u64.pow(decimals)))
            .trunc()
            .to_u64()
            .unwrap_or(0);
        formatted.push_str(&format!(".{:0width$}", fraction, width = decimals as usize));
    }
    formatted
}

/// "1 USD = ₩1,351"
pub fn format_exchange_rate(currency: CurrencyCode, table: &RateTable) -> String {
    if currency == BASE_CURRENCY {
        return format!("1 {} = {}1", BASE_CURRENCY, BASE_CURRENCY.symbol());
    }

    let base_per_unit = round_money(Decimal::ONE / table.rate(currency), 0);
    format!("1 {} = {}", currency, format_price(base_per_unit, BASE_CURRENCY))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RateTable {
        let mut rates = HashMap::new();
        rates.insert(CurrencyCode::Usd, dec!(0.00074));
        rates.insert(CurrencyCode::Jpy, dec!(0.11));
        RateTable::new(rates, Utc::now())
    }

    #[test]
    fn test_parse_currency_code() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::Usd);
        assert_eq!(" KRW ".parse::<CurrencyCode>().unwrap(), CurrencyCode::Krw);
        assert_eq!(
            "GBP".parse::<CurrencyCode>().unwrap_err(),
            UnsupportedCurrency("GBP".to_string())
        );
    }

    #[test]
    fn test_currency_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&CurrencyCode::Eur).unwrap(), "\"EUR\"");
        let parsed: CurrencyCode = serde_json::from_str("\"CNY\"").unwrap();
        assert_eq!(parsed, CurrencyCode::Cny);
    }

    #[test]
    fn test_foreign_excludes_base() {
        let foreign: Vec<_> = CurrencyCode::foreign().collect();
        assert_eq!(foreign.len(), 4);
        assert!(!foreign.contains(&CurrencyCode::Krw));
    }

    #[test]
    fn test_rate_lookup_falls_back() {
        let t = table();
        assert_eq!(t.rate(CurrencyCode::Krw), dec!(1));
        assert_eq!(t.rate(CurrencyCode::Jpy), dec!(0.11));
        assert_eq!(t.rate(CurrencyCode::Eur), dec!(0.00068)); // not in table
    }

    #[test]
    fn test_convert_same_currency_is_identity() {
        assert_eq!(
            convert_currency(dec!(123.456), CurrencyCode::Usd, CurrencyCode::Usd, &table()),
            dec!(123.456)
        );
    }

    #[test]
    fn test_convert_from_base_rounds_up() {
        // 1,500,000 * 0.00074 = 1110
        assert_eq!(
            convert_currency(dec!(1500000), CurrencyCode::Krw, CurrencyCode::Usd, &table()),
            dec!(1110)
        );
        // 1,000 * 0.00074 = 0.74
        assert_eq!(
            convert_currency(dec!(1000), CurrencyCode::Krw, CurrencyCode::Usd, &table()),
            dec!(0.74)
        );
        // 1,001 * 0.00074 = 0.74074 -> 0.75
        assert_eq!(
            convert_currency(dec!(1001), CurrencyCode::Krw, CurrencyCode::Usd, &table()),
            dec!(0.75)
        );
    }

    #[test]
    fn test_convert_to_base() {
        // 11 JPY / 0.11 = 100 KRW
        assert_eq!(
            convert_currency(dec!(11), CurrencyCode::Jpy, CurrencyCode::Krw, &table()),
            dec!(100)
        );
    }

    #[test]
    fn test_convert_between_foreign_currencies() {
        // 0.74 USD -> 1000 KRW -> 110 JPY
        assert_eq!(
            convert_currency(dec!(0.74), CurrencyCode::Usd, CurrencyCode::Jpy, &table()),
            dec!(110)
        );
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(dec!(1500000), CurrencyCode::Krw), "₩1,500,000");
        assert_eq!(format_price(dec!(1234.56), CurrencyCode::Usd), "$1,234.56");
        assert_eq!(format_price(dec!(1234.5), CurrencyCode::Eur), "€1,234.50");
        assert_eq!(format_price(dec!(999), CurrencyCode::Jpy), "¥999");
        assert_eq!(format_price(dec!(0.05), CurrencyCode::Usd), "$0.05");
        assert_eq!(format_price(dec!(1000), CurrencyCode::Krw), "₩1,000");
        assert_eq!(format_price(dec!(-70), CurrencyCode::Krw), "-₩70");
        assert_eq!(format_price(dec!(12.5), CurrencyCode::Krw), "₩13");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456789"), "123,456,789");
    }

    #[test]
    fn test_format_exchange_rate() {
        // 1 / 0.00074 = 1351.35...
        assert_eq!(format_exchange_rate(CurrencyCode::Usd, &table()), "1 USD = ₩1,351");
        assert_eq!(format_exchange_rate(CurrencyCode::Krw, &table()), "1 KRW = ₩1");
    }
}
