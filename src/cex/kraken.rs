use super::{MarketData, get_json, split_symbol};
use crate::errors::{AppError, Result};
use crate::utils::parse_price;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

const KRAKEN_REST_ENDPOINT: &str = "https://api.kraken.com";

/// Kraken-specific asset codes and their common names.
const ASSET_ALIASES: &[(&str, &str)] = &[("XBT", "BTC"), ("XDG", "DOGE")];

/// Kraken replies `{error: [...], result: {...}}`; a non-empty `error` is a failure.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: Vec<String>,
    result: Option<T>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T> {
        if !self.error.is_empty() {
            return Err(AppError::venue("kraken", self.error.join("; ")));
        }
        self.result
            .ok_or_else(|| AppError::venue("kraken", "response carried no result"))
    }
}

#[derive(Debug, Deserialize)]
struct AssetPair {
    /// `XBT/USD`; absent on dark-pool pairs.
    wsname: Option<String>,
    #[serde(default = "online_default")]
    status: String,
}

fn online_default() -> String {
    "online".to_string()
}

#[derive(Debug, Deserialize)]
struct Ticker {
    /// Last trade closed: `[price, lot volume]`.
    c: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Kraken {
    http: reqwest::Client,
}

impl Kraken {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

fn to_common(asset: &str) -> String {
    let asset = asset.to_uppercase();
    ASSET_ALIASES
        .iter()
        .find(|(kraken, _)| *kraken == asset)
        .map(|(_, common)| common.to_string())
        .unwrap_or(asset)
}

fn to_kraken(asset: &str) -> String {
    let asset = asset.to_uppercase();
    ASSET_ALIASES
        .iter()
        .find(|(_, common)| *common == asset)
        .map(|(kraken, _)| kraken.to_string())
        .unwrap_or(asset)
}

fn online_symbols(pairs: BTreeMap<String, AssetPair>) -> BTreeSet<String> {
    pairs
        .into_values()
        .filter(|p| p.status == "online")
        .filter_map(|p| {
            let wsname = p.wsname?;
            let (base, quote) = split_symbol(&wsname)?;
            Some(format!("{}/{}", to_common(base), to_common(quote)))
        })
        .collect()
}

fn native_pair(symbol: &str) -> Result<String> {
    let (base, quote) = split_symbol(symbol)
        .ok_or_else(|| AppError::venue("kraken", format!("malformed symbol '{symbol}'")))?;
    Ok(format!("{}{}", to_kraken(base), to_kraken(quote)))
}

/// The result map is keyed by Kraken's canonical pair name, which differs
/// from the requested one (`XBTUSD` comes back as `XXBTZUSD`).
fn last_price(tickers: BTreeMap<String, Ticker>, pair: &str) -> Result<f64> {
    let ticker = tickers
        .into_values()
        .next()
        .ok_or_else(|| AppError::venue("kraken", format!("no ticker for {pair}")))?;
    let close = ticker
        .c
        .first()
        .ok_or_else(|| AppError::venue("kraken", format!("empty close for {pair}")))?;
    parse_price(close)
}

#[async_trait]
impl MarketData for Kraken {
    async fn list_symbols(&self) -> Result<BTreeSet<String>> {
        let url = Url::parse(&format!("{KRAKEN_REST_ENDPOINT}/0/public/AssetPairs"))?;
        let envelope: Envelope<BTreeMap<String, AssetPair>> =
            get_json(&self.http, "kraken", url).await?;
        Ok(online_symbols(envelope.into_result()?))
    }

    async fn fetch_last_price(&self, symbol: &str) -> Result<f64> {
        let pair = native_pair(symbol)?;
        let url = Url::parse_with_params(
            &format!("{KRAKEN_REST_ENDPOINT}/0/public/Ticker"),
            &[("pair", pair.as_str())],
        )?;
        let envelope: Envelope<BTreeMap<String, Ticker>> =
            get_json(&self.http, "kraken", url).await?;
        last_price(envelope.into_result()?, &pair)
    }
}
