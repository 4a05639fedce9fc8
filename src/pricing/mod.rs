//! Stay pricing for Snug bookings.
//!
//! The calculators are pure and safe to call from any number of request
//! handlers at once. The HTTP boundary validates input before it reaches them.

pub mod calculators;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{
    calculate_long_stay_discount, calculate_service_fee, calculate_total_price, compute_subtotal,
    long_stay_discount_percent, round_money,
};
pub use models::{DiscountTier, PolicyError, PriceBreakdown, PricingPolicy, StayQuote};
pub use routes::router;
pub use services::PricingError;
