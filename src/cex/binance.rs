use super::{MarketData, get_json, split_symbol, unified_symbol};
use crate::errors::{AppError, Result};
use crate::utils::parse_price;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use url::Url;

const BINANCE_REST_ENDPOINT: &str = "https://api.binance.com";
const MEXC_REST_ENDPOINT: &str = "https://api.mexc.com";

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    status: String,
    base_asset: String,
    quote_asset: String,
    #[serde(default = "spot_allowed_default")]
    is_spot_trading_allowed: bool,
}

fn spot_allowed_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

/// Client for venues speaking the Binance spot REST dialect (Binance, MEXC).
#[derive(Debug, Clone)]
pub struct BinanceStyle {
    name: &'static str,
    base_url: &'static str,
    /// `status` values that mean the market is open.
    live_status: &'static [&'static str],
    http: reqwest::Client,
}

impl BinanceStyle {
    pub fn binance(http: reqwest::Client) -> Self {
        Self {
            name: "binance",
            base_url: BINANCE_REST_ENDPOINT,
            live_status: &["TRADING"],
            http,
        }
    }

    /// MEXC has reported both numeric and textual status codes.
    pub fn mexc(http: reqwest::Client) -> Self {
        Self {
            name: "mexc",
            base_url: MEXC_REST_ENDPOINT,
            live_status: &["1", "ENABLED", "TRADING"],
            http,
        }
    }

    fn live_symbols(&self, info: ExchangeInfo) -> BTreeSet<String> {
        info.symbols
            .into_iter()
            .filter(|s| s.is_spot_trading_allowed && self.live_status.contains(&s.status.as_str()))
            .map(|s| unified_symbol(&s.base_asset, &s.quote_asset))
            .collect()
    }

    fn native_symbol(&self, symbol: &str) -> Result<String> {
        let (base, quote) = split_symbol(symbol)
            .ok_or_else(|| AppError::venue(self.name, format!("malformed symbol '{symbol}'")))?;
        Ok(format!("{base}{quote}"))
    }
}

#[async_trait]
impl MarketData for BinanceStyle {
    async fn list_symbols(&self) -> Result<BTreeSet<String>> {
        let url = Url::parse(&format!("{}/api/v3/exchangeInfo", self.base_url))?;
        let info: ExchangeInfo = get_json(&self.http, self.name, url).await?;
        Ok(self.live_symbols(info))
    }

    async fn fetch_last_price(&self, symbol: &str) -> Result<f64> {
        let native = self.native_symbol(symbol)?;
        let url = Url::parse_with_params(
            &format!("{}/api/v3/ticker/price", self.base_url),
            &[("symbol", native.as_str())],
        )?;
        let ticker: TickerPrice = get_json(&self.http, self.name, url).await?;
        parse_price(&ticker.price)
    }
}
