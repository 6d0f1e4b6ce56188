use crate::config::DEFAULT_THRESHOLD_PCT;
use serde::{Serialize, Serializer};

/// Configuration for opportunity scanning
#[derive(Debug, Clone, Copy)]
pub struct ArbitrageConfig {
    /// A pair is reported when its percentage difference is strictly above this.
    pub threshold_pct: f64,
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            threshold_pct: DEFAULT_THRESHOLD_PCT,
        }
    }
}

/// A venue pair whose last prices for `symbol` diverge beyond the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArbitrageOpportunity {
    pub symbol: String,
    pub exchange1: String,
    pub price1: f64,
    pub exchange2: String,
    pub price2: f64,
    /// Rounded to 2 decimals, serialized as a fixed-point string.
    #[serde(rename = "percentageDifference", serialize_with = "two_decimals")]
    pub percentage_difference: f64,
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", value))
}
