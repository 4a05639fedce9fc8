//! Core pricing calculation functions.
//!
//! Pure functions for stay pricing - no database access, no logging.
//! Every rounded amount goes through `round_money` so the breakdown always
//! sums to its total.

use rust_decimal::prelude::*;

use super::models::{PriceBreakdown, PricingPolicy, StayQuote, NIGHTS_PER_WEEK};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to specified decimal places, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use snug_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(-2.5), 0), dec!(-3));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Nightly rate times number of nights. Not rounded.
pub fn compute_subtotal(price_per_night: Decimal, nights: u32) -> Decimal {
    price_per_night * Decimal::from(nights)
}

/// Percent off for a stay of `nights`.
///
/// Only whole weeks count, and only the highest tier reached applies.
pub fn long_stay_discount_percent(policy: &PricingPolicy, nights: u32) -> u32 {
    let weeks = nights / NIGHTS_PER_WEEK;

    policy
        .tiers()
        .iter()
        .find(|tier| weeks >= tier.min_weeks)
        .map(|tier| tier.percent)
        .unwrap_or(0)
}

/// Long-stay discount amount, rounded to whole currency units.
pub fn calculate_long_stay_discount(policy: &PricingPolicy, subtotal: Decimal, nights: u32) -> Decimal {
    let percent = Decimal::from(long_stay_discount_percent(policy, nights));
    round_money(subtotal * (percent / HUNDRED), 0)
}

/// Service fee on the pre-discount subtotal, rounded to whole currency units.
pub fn calculate_service_fee(policy: &PricingPolicy, subtotal: Decimal) -> Decimal {
    round_money(subtotal * (policy.service_fee_percent() / HUNDRED), 0)
}

/// Full price breakdown for a stay.
///
/// `total` is derived from the other fields, so
/// `total == subtotal + cleaning_fee + service_fee - long_stay_discount` always holds.
pub fn calculate_total_price(policy: &PricingPolicy, quote: &StayQuote) -> PriceBreakdown {
    let subtotal = compute_subtotal(quote.price_per_night, quote.nights);
    let service_fee = calculate_service_fee(policy, subtotal);
    let discount_percent = long_stay_discount_percent(policy, quote.nights);
    let long_stay_discount = calculate_long_stay_discount(policy, subtotal, quote.nights);
    let total = subtotal + quote.cleaning_fee + service_fee - long_stay_discount;

    PriceBreakdown {
        subtotal,
        service_fee,
        long_stay_discount,
        discount_percent,
        cleaning_fee: quote.cleaning_fee,
        total,
    }
}
