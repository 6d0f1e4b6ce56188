//! Miscellaneous helper utilities.

use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::ToPrimitive;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Round to `scale` decimal places, half away from zero, in decimal space.
///
/// Going through `BigDecimal` keeps values like `2.675` rounding to `2.68`,
/// which binary `f64` rounding would turn into `2.67`.
pub fn round_half_up(value: f64, scale: i64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    BigDecimal::from_str(&value.to_string())
        .ok()
        .map(|bd| bd.with_scale_round(scale, RoundingMode::HalfUp))
        .and_then(|bd| bd.to_f64())
        .unwrap_or(value)
}

/// Parse a venue-reported decimal string (e.g. `"43012.50"`).
pub fn parse_price(raw: &str) -> crate::errors::Result<f64> {
    Ok(raw.trim().parse::<f64>()?)
}
