//! Environment configuration.
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file via dotenvy. Anything malformed fails startup.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use crate::pricing::{DiscountTier, PricingPolicy};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_EXCHANGE_RATE_API_URL: &str = "https://open.er-api.com/v6/latest/KRW";
const DEFAULT_MARGIN_PERCENT: Decimal = dec!(2.5);
const DEFAULT_REFRESH_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Bearer secret required by the rate update endpoint, if set
    pub cron_secret: Option<String>,
    pub exchange_rates: ExchangeRateConfig,
    pub pricing: PricingPolicy,
}

#[derive(Debug, Clone)]
pub struct ExchangeRateConfig {
    pub api_url: String,
    pub margin_percent: Decimal,
    /// `None` disables the background refresher
    pub refresh_interval: Option<Duration>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?;
        let cron_secret = lookup("CRON_SECRET").filter(|s| !s.is_empty());

        let refresh_secs: u64 = parse_or(&lookup, "RATE_REFRESH_INTERVAL_SECS", &DEFAULT_REFRESH_SECS.to_string())?;
        let margin_percent: Decimal =
            parse_or(&lookup, "EXCHANGE_RATE_MARGIN_PERCENT", &DEFAULT_MARGIN_PERCENT.to_string())?;
        if margin_percent < Decimal::ZERO || margin_percent >= dec!(100) {
            return Err(anyhow!(
                "EXCHANGE_RATE_MARGIN_PERCENT must be in [0, 100), got {}",
                margin_percent
            ));
        }

        let exchange_rates = ExchangeRateConfig {
            api_url: lookup("EXCHANGE_RATE_API_URL")
                .unwrap_or_else(|| DEFAULT_EXCHANGE_RATE_API_URL.to_string()),
            margin_percent,
            refresh_interval: (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs)),
        };

        let service_fee_percent: Decimal = parse_or(&lookup, "SERVICE_FEE_PERCENT", "10")?;
        let tiers = match lookup("LONG_STAY_TIERS") {
            Some(raw) => parse_tiers(&raw).context("Invalid LONG_STAY_TIERS")?,
            None => crate::pricing::models::DEFAULT_DISCOUNT_TIERS.to_vec(),
        };
        let pricing = PricingPolicy::builder()
            .tiers(tiers)
            .service_fee_percent(service_fee_percent)
            .build()
            .context("Invalid pricing policy")?;

        Ok(Self {
            database_url,
            bind_addr,
            cron_secret,
            exchange_rates,
            pricing,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}"))
}

/// Parse `weeks:percent` pairs, e.g. `2:5,4:10,12:20`. An empty string means no tiers.
pub fn parse_tiers(raw: &str) -> anyhow::Result<Vec<DiscountTier>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (weeks, percent) = pair
                .split_once(':')
                .ok_or_else(|| anyhow!("expected weeks:percent, got {pair:?}"))?;
            let weeks = weeks.trim().parse().with_context(|| format!("bad weeks in {pair:?}"))?;
            let percent = percent.trim().parse().with_context(|| format!("bad percent in {pair:?}"))?;
            Ok::<_, anyhow::Error>(DiscountTier::new(weeks, percent))
        })
        .collect()
}
