//! Value types for the pricing engine.
//!
//! A `PricingPolicy` holds the long-stay discount tiers and the service fee
//! rate. The default policy is the one Snug charges in production; alternate
//! policies are assembled with `PricingPolicy::builder()`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

/// Nights per whole week used for tier matching.
pub const NIGHTS_PER_WEEK: u32 = 7;

/// Platform service fee, as a percentage of the subtotal.
pub const DEFAULT_SERVICE_FEE_PERCENT: Decimal = dec!(10);

/// Long-stay discount tier: stays of at least `min_weeks` whole weeks
/// get `percent` off the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountTier {
    pub min_weeks: u32,
    pub percent: u32,
}

impl DiscountTier {
    pub const fn new(min_weeks: u32, percent: u32) -> Self {
        Self { min_weeks, percent }
    }

    /// First night count that qualifies for this tier.
    pub fn min_nights(&self) -> u32 {
        self.min_weeks.saturating_mul(NIGHTS_PER_WEEK)
    }
}

/// 2 weeks -> 5%, 4 weeks -> 10%, 12 weeks -> 20%
pub const DEFAULT_DISCOUNT_TIERS: [DiscountTier; 3] = [
    DiscountTier::new(2, 5),
    DiscountTier::new(4, 10),
    DiscountTier::new(12, 20),
];

/// Errors raised while assembling a pricing policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Duplicate discount tier for {min_weeks} weeks")]
    DuplicateThreshold { min_weeks: u32 },

    #[error("Discount percent {percent} is above 100")]
    InvalidPercent { percent: u32 },

    #[error("Service fee percent {0} must be between 0 and 100")]
    InvalidServiceFee(Decimal),
}

/// Discount tiers and fee rate consulted by every calculation.
///
/// Tiers are stored sorted by `min_weeks`, highest first, so the first match
/// is the one that applies.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingPolicy {
    tiers: Vec<DiscountTier>,
    service_fee_percent: Decimal,
}

impl PricingPolicy {
    pub fn builder() -> PricingPolicyBuilder {
        PricingPolicyBuilder::default()
    }

    /// Tiers, highest threshold first
    pub fn tiers(&self) -> &[DiscountTier] {
        &self.tiers
    }

    pub fn service_fee_percent(&self) -> Decimal {
        self.service_fee_percent
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        let mut tiers = DEFAULT_DISCOUNT_TIERS.to_vec();
        tiers.sort_by(|a, b| b.min_weeks.cmp(&a.min_weeks));
        Self {
            tiers,
            service_fee_percent: DEFAULT_SERVICE_FEE_PERCENT,
        }
    }
}

/// Builder for `PricingPolicy`. Starts with no tiers and the default fee.
#[derive(Debug, Clone)]
pub struct PricingPolicyBuilder {
    tiers: Vec<DiscountTier>,
    service_fee_percent: Decimal,
}

impl Default for PricingPolicyBuilder {
    fn default() -> Self {
        Self {
            tiers: Vec::new(),
            service_fee_percent: DEFAULT_SERVICE_FEE_PERCENT,
        }
    }
}

impl PricingPolicyBuilder {
    pub fn tier(mut self, min_weeks: u32, percent: u32) -> Self {
        self.tiers.push(DiscountTier::new(min_weeks, percent));
        self
    }

    pub fn tiers(mut self, tiers: impl IntoIterator<Item = DiscountTier>) -> Self {
        self.tiers.extend(tiers);
        self
    }

    pub fn service_fee_percent(mut self, percent: Decimal) -> Self {
        self.service_fee_percent = percent;
        self
    }

    pub fn build(mut self) -> Result<PricingPolicy, PolicyError> {
        if self.service_fee_percent < Decimal::ZERO || self.service_fee_percent > dec!(100) {
            return Err(PolicyError::InvalidServiceFee(self.service_fee_percent));
        }
        if let Some(tier) = self.tiers.iter().find(|t| t.percent > 100) {
            return Err(PolicyError::InvalidPercent {
                percent: tier.percent,
            });
        }

        self.tiers.sort_by(|a, b| b.min_weeks.cmp(&a.min_weeks));
        if let Some(pair) = self.tiers.windows(2).find(|w| w[0].min_weeks == w[1].min_weeks) {
            return Err(PolicyError::DuplicateThreshold {
                min_weeks: pair[0].min_weeks,
            });
        }

        Ok(PricingPolicy {
            tiers: self.tiers,
            service_fee_percent: self.service_fee_percent,
        })
    }
}

/// A booking candidate to be priced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StayQuote {
    pub price_per_night: Decimal,
    pub nights: u32,
    pub cleaning_fee: Decimal,
}

impl StayQuote {
    pub fn new(price_per_night: Decimal, nights: u32) -> Self {
        Self {
            price_per_night,
            nights,
            cleaning_fee: Decimal::ZERO,
        }
    }

    pub fn with_cleaning_fee(mut self, cleaning_fee: Decimal) -> Self {
        self.cleaning_fee = cleaning_fee;
        self
    }
}

/// Itemized result of a pricing calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub service_fee: Decimal,
    pub long_stay_discount: Decimal,
    pub discount_percent: u32,
    pub cleaning_fee: Decimal,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_platform_constants() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.service_fee_percent(), dec!(10));
        assert_eq!(
            policy.tiers(),
            &[
                DiscountTier::new(12, 20),
                DiscountTier::new(4, 10),
                DiscountTier::new(2, 5),
            ]
        );
    }

    #[test]
    fn test_builder_sorts_tiers_highest_first() {
        let policy = PricingPolicy::builder()
            .tier(1, 2)
            .tier(8, 15)
            .tier(3, 7)
            .build()
            .unwrap();

        let weeks: Vec<u32> = policy.tiers().iter().map(|t| t.min_weeks).collect();
        assert_eq!(weeks, vec![8, 3, 1]);
    }

    #[test]
    fn test_builder_default_matches_default_policy() {
        let built = PricingPolicy::builder()
            .tiers(DEFAULT_DISCOUNT_TIERS)
            .build()
            .unwrap();
        assert_eq!(built, PricingPolicy::default());
    }

    #[test]
    fn test_builder_rejects_duplicate_threshold() {
        let err = PricingPolicy::builder()
            .tier(2, 5)
            .tier(2, 8)
            .build()
            .unwrap_err();
        assert_eq!(err, PolicyError::DuplicateThreshold { min_weeks: 2 });
    }

    #[test]
    fn test_builder_rejects_percent_over_100() {
        let err = PricingPolicy::builder().tier(2, 101).build().unwrap_err();
        assert_eq!(err, PolicyError::InvalidPercent { percent: 101 });
    }

    #[test]
    fn test_builder_rejects_bad_service_fee() {
        assert!(PricingPolicy::builder()
            .service_fee_percent(dec!(-1))
            .build()
            .is_err());
        assert!(PricingPolicy::builder()
            .service_fee_percent(dec!(100.5))
            .build()
            .is_err());
    }

    #[test]
    fn test_builder_allows_no_tiers() {
        let policy = PricingPolicy::builder().build().unwrap();
        assert!(policy.tiers().is_empty());
    }

    #[test]
    fn test_min_nights() {
        assert_eq!(DiscountTier::new(2, 5).min_nights(), 14);
        assert_eq!(DiscountTier::new(12, 20).min_nights(), 84);
    }
}
