use super::{MarketData, get_json, split_symbol, unified_symbol};
use crate::errors::{AppError, Result};
use crate::utils::parse_price;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use url::Url;

const BYBIT_REST_ENDPOINT: &str = "https://api.bybit.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    result: Option<ListResult<T>>,
}

#[derive(Debug, Deserialize)]
struct ListResult<T> {
    #[serde(default = "Vec::new")]
    list: Vec<T>,
}

impl<T> Envelope<T> {
    fn into_list(self) -> Result<Vec<T>> {
        if self.ret_code != 0 {
            return Err(AppError::venue(
                "bybit",
                format!("retCode {}: {}", self.ret_code, self.ret_msg),
            ));
        }
        Ok(self.result.map(|r| r.list).unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
    base_coin: String,
    quote_coin: String,
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker {
    last_price: String,
}

#[derive(Debug, Clone)]
pub struct Bybit {
    http: reqwest::Client,
}

impl Bybit {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

fn trading_symbols(instruments: Vec<Instrument>) -> BTreeSet<String> {
    instruments
        .into_iter()
        .filter(|i| i.status == "Trading")
        .map(|i| unified_symbol(&i.base_coin, &i.quote_coin))
        .collect()
}

#[async_trait]
impl MarketData for Bybit {
    async fn list_symbols(&self) -> Result<BTreeSet<String>> {
        let url = Url::parse_with_params(
            &format!("{BYBIT_REST_ENDPOINT}/v5/market/instruments-info"),
            &[("category", "spot")],
        )?;
        let envelope: Envelope<Instrument> = get_json(&self.http, "bybit", url).await?;
        Ok(trading_symbols(envelope.into_list()?))
    }

    async fn fetch_last_price(&self, symbol: &str) -> Result<f64> {
        let (base, quote) = split_symbol(symbol)
            .ok_or_else(|| AppError::venue("bybit", format!("malformed symbol '{symbol}'")))?;
        let native = format!("{base}{quote}");
        let url = Url::parse_with_params(
            &format!("{BYBIT_REST_ENDPOINT}/v5/market/tickers"),
            &[("category", "spot"), ("symbol", native.as_str())],
        )?;
        let envelope: Envelope<Ticker> = get_json(&self.http, "bybit", url).await?;
        let ticker = envelope
            .into_list()?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::venue("bybit", format!("no ticker for {native}")))?;
        parse_price(&ticker.last_price)
    }
}
