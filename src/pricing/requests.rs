//! Request DTOs for pricing API endpoints.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::currency::CurrencyCode;

use super::models::StayQuote;
use super::services::PricingError;

/// Largest accepted `pricePerNight` or `cleaningFee`.
///
/// Keeps `price * nights` and the percentage math well inside `Decimal`'s
/// range for any `u32` night count.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Request to quote a stay.
///
/// Amounts accept either JSON numbers or decimal strings. `nights` is taken
/// as a decimal so fractional or negative values can be reported instead of
/// failing deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub price_per_night: Decimal,
    pub nights: Decimal,
    #[serde(default)]
    pub cleaning_fee: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A quote request that passed boundary validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidQuote {
    pub stay: StayQuote,
    pub currency: Option<CurrencyCode>,
}

impl QuoteRequest {
    pub fn validate(&self) -> Result<ValidQuote, PricingError> {
        let nights = parse_nights(self.nights)?;
        let price_per_night = check_amount("pricePerNight", self.price_per_night)?;
        let cleaning_fee = check_amount("cleaningFee", self.cleaning_fee.unwrap_or(Decimal::ZERO))?;

        let currency = self
            .currency
            .as_deref()
            .map(|c| {
                c.parse::<CurrencyCode>()
                    .map_err(|e| PricingError::UnsupportedCurrency { currency: e.0 })
            })
            .transpose()?;

        Ok(ValidQuote {
            stay: StayQuote::new(price_per_night, nights).with_cleaning_fee(cleaning_fee),
            currency,
        })
    }
}

fn parse_nights(value: Decimal) -> Result<u32, PricingError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PricingError::InvalidNights {
            value,
            reason: "must not be negative",
        });
    }
    if !value.fract().is_zero() {
        return Err(PricingError::InvalidNights {
            value,
            reason: "must be a whole number",
        });
    }
    value.to_u32().ok_or(PricingError::InvalidNights {
        value,
        reason: "is too large",
    })
}

fn check_amount(field: &'static str, value: Decimal) -> Result<Decimal, PricingError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PricingError::InvalidAmount {
            field,
            value,
            reason: "must not be negative",
        });
    }
    if value > MAX_AMOUNT {
        return Err(PricingError::InvalidAmount {
            field,
            value,
            reason: "is too large",
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{calculate_total_price, PricingPolicy};

    fn request(json: &str) -> QuoteRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_accepts_numbers_and_strings() {
        let req = request(r#"{"pricePerNight": 100, "nights": 14, "cleaningFee": "50.5"}"#);
        let valid = req.validate().unwrap();
        assert_eq!(valid.stay.price_per_night, dec!(100));
        assert_eq!(valid.stay.nights, 14);
        assert_eq!(valid.stay.cleaning_fee, dec!(50.5));
        assert_eq!(valid.currency, None);
    }

    #[test]
    fn test_cleaning_fee_defaults_to_zero() {
        let valid = request(r#"{"pricePerNight": "99.99", "nights": 3}"#)
            .validate()
            .unwrap();
        assert_eq!(valid.stay.cleaning_fee, dec!(0));
    }

    #[test]
    fn test_parses_currency() {
        let valid = request(r#"{"pricePerNight": 1, "nights": 1, "currency": "usd"}"#)
            .validate()
            .unwrap();
        assert_eq!(valid.currency, Some(CurrencyCode::Usd));
    }

    #[test]
    fn test_rejects_unknown_currency() {
        let err = request(r#"{"pricePerNight": 1, "nights": 1, "currency": "GBP"}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PricingError::UnsupportedCurrency { ref currency } if currency == "GBP"));
    }

    #[test]
    fn test_rejects_negative_nights() {
        let err = request(r#"{"pricePerNight": 100, "nights": -1}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidNights { .. }));
        assert_eq!(err.error_type(), "InvalidNights");
    }

    #[test]
    fn test_rejects_fractional_nights() {
        let err = request(r#"{"pricePerNight": 100, "nights": 2.5}"#)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn test_rejects_huge_nights() {
        let err = request(r#"{"pricePerNight": 100, "nights": 99999999999}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidNights { .. }));
    }

    #[test]
    fn test_whole_decimal_nights_are_fine() {
        let valid = request(r#"{"pricePerNight": 100, "nights": "28.00"}"#)
            .validate()
            .unwrap();
        assert_eq!(valid.stay.nights, 28);
    }

    #[test]
    fn test_rejects_negative_amounts() {
        let err = request(r#"{"pricePerNight": -5, "nights": 1}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidAmount { field: "pricePerNight", .. }));

        let err = request(r#"{"pricePerNight": 5, "nights": 1, "cleaningFee": -0.01}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidAmount { field: "cleaningFee", .. }));
    }

    #[test]
    fn test_rejects_amounts_above_limit() {
        let err = request(r#"{"pricePerNight": "100000000000000000000", "nights": 4000000000}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidAmount { field: "pricePerNight", reason: "is too large", .. }
        ));

        let err = request(r#"{"pricePerNight": 1, "nights": 1, "cleaningFee": "1000000000000000.01"}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidAmount { field: "cleaningFee", .. }));
    }

    #[test]
    fn test_largest_accepted_quote_prices_without_overflow() {
        let valid = request(&format!(
            r#"{{"pricePerNight": "{max}", "nights": {nights}, "cleaningFee": "{max}"}}"#,
            max = MAX_AMOUNT,
            nights = u32::MAX,
        ))
        .validate()
        .unwrap();

        let b = calculate_total_price(&PricingPolicy::default(), &valid.stay);
        assert_eq!(b.subtotal, MAX_AMOUNT * Decimal::from(u32::MAX));
        assert_eq!(b.discount_percent, 20);
        assert_eq!(
            b.total,
            b.subtotal + b.cleaning_fee + b.service_fee - b.long_stay_discount
        );
    }

    #[test]
    fn test_zero_values_are_valid() {
        let valid = request(r#"{"pricePerNight": 0, "nights": 0, "cleaningFee": 0}"#)
            .validate()
            .unwrap();
        assert_eq!(valid.stay.nights, 0);
    }
}
