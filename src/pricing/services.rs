//! Pricing service functions.
//!
//! Glue between the HTTP boundary and the pure calculators: validation
//! errors, optional conversion of a breakdown into the guest's currency,
//! and the policy summary.

use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;

use crate::currency::{
    convert_currency, format_price, CurrencyCode, RateTable, BASE_CURRENCY, SUPPORTED_CURRENCIES,
};

use super::calculators::calculate_total_price;
use super::models::{PriceBreakdown, PricingPolicy};
use super::requests::ValidQuote;
use super::responses::{ConvertedBreakdownResponse, DiscountTierResponse, DiscountTiersResponse, QuoteResponse};

/// Quote rejected at the boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("Invalid nights {value}: {reason}")]
    InvalidNights { value: Decimal, reason: &'static str },

    #[error("Invalid amount for {field}: {value} {reason}")]
    InvalidAmount {
        field: &'static str,
        value: Decimal,
        reason: &'static str,
    },

    #[error("Unsupported currency: {currency}")]
    UnsupportedCurrency { currency: String },
}

impl PricingError {
    pub fn error_type(&self) -> &'static str {
        match self {
            PricingError::InvalidNights { .. } => "InvalidNights",
            PricingError::InvalidAmount { .. } => "InvalidAmount",
            PricingError::UnsupportedCurrency { .. } => "UnsupportedCurrency",
        }
    }

    /// Offending field and value, for the `details` of the error body
    pub fn details(&self) -> Value {
        match self {
            PricingError::InvalidNights { value, .. } => json!({
                "field": "nights",
                "value": value.to_string(),
            }),
            PricingError::InvalidAmount { field, value, .. } => json!({
                "field": field,
                "value": value.to_string(),
            }),
            PricingError::UnsupportedCurrency { currency } => json!({
                "field": "currency",
                "value": currency,
                "supported": SUPPORTED_CURRENCIES.iter().map(|c| c.code()).collect::<Vec<_>>(),
            }),
        }
    }
}

/// Price a validated quote.
///
/// `rates` is only consulted when a non-base currency was requested.
pub fn quote_stay(policy: &PricingPolicy, quote: &ValidQuote, rates: Option<&RateTable>) -> QuoteResponse {
    let breakdown = calculate_total_price(policy, &quote.stay);

    let converted = match (quote.currency, rates) {
        (Some(currency), Some(table)) if currency != BASE_CURRENCY => {
            Some(convert_breakdown(&breakdown, currency, table))
        }
        _ => None,
    };

    let mut response = QuoteResponse::from(breakdown);
    response.converted = converted;
    response
}

/// Whether pricing `quote` needs the current rate table
pub fn needs_rates(quote: &ValidQuote) -> bool {
    matches!(quote.currency, Some(c) if c != BASE_CURRENCY)
}

/// Express each amount of a base-currency breakdown in `currency`.
///
/// Amounts are converted one by one and the total is re-derived from the
/// converted parts so the converted breakdown still adds up.
pub fn convert_breakdown(
    breakdown: &PriceBreakdown,
    currency: CurrencyCode,
    table: &RateTable,
) -> ConvertedBreakdownResponse {
    let convert = |amount: Decimal| convert_currency(amount, BASE_CURRENCY, currency, table);

    let subtotal = convert(breakdown.subtotal);
    let service_fee = convert(breakdown.service_fee);
    let long_stay_discount = convert(breakdown.long_stay_discount);
    let cleaning_fee = convert(breakdown.cleaning_fee);
    let total = subtotal + cleaning_fee + service_fee - long_stay_discount;

    ConvertedBreakdownResponse {
        currency,
        subtotal,
        service_fee,
        long_stay_discount,
        cleaning_fee,
        total,
        formatted_total: format_price(total, currency),
    }
}

/// Active discount tiers, highest first
pub fn discount_tiers(policy: &PricingPolicy) -> DiscountTiersResponse {
    DiscountTiersResponse {
        service_fee_percent: policy.service_fee_percent(),
        tiers: policy
            .tiers()
            .iter()
            .map(|tier| DiscountTierResponse {
                min_weeks: tier.min_weeks,
                min_nights: tier.min_nights(),
                percent: tier.percent,
            })
            .collect(),
    }
}
