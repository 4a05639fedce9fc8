//! Response DTOs for pricing API endpoints.
//!
//! Amounts are serialized as JSON numbers.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::currency::CurrencyCode;

use super::models::PriceBreakdown;

/// Response for a stay quote
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub service_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub long_stay_discount: Decimal,
    pub discount_percent: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub cleaning_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted: Option<ConvertedBreakdownResponse>,
}

impl From<PriceBreakdown> for QuoteResponse {
    fn from(b: PriceBreakdown) -> Self {
        Self {
            subtotal: b.subtotal,
            service_fee: b.service_fee,
            long_stay_discount: b.long_stay_discount,
            discount_percent: b.discount_percent,
            cleaning_fee: b.cleaning_fee,
            total: b.total,
            converted: None,
        }
    }
}

/// Breakdown expressed in the guest's display currency
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedBreakdownResponse {
    pub currency: CurrencyCode,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub service_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub long_stay_discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cleaning_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub formatted_total: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountTierResponse {
    pub min_weeks: u32,
    pub min_nights: u32,
    pub percent: u32,
}

/// Response for the active pricing policy
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountTiersResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub service_fee_percent: Decimal,
    pub tiers: Vec<DiscountTierResponse>,
}

/// Generic error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
