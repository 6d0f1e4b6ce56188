use super::{MarketData, get_json, split_symbol, unified_symbol};
use crate::errors::{AppError, Result};
use crate::utils::parse_price;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use url::Url;

const OKX_REST_ENDPOINT: &str = "https://www.okx.com";

/// OKX wraps every payload as `{code, msg, data: [...]}`; `code == "0"` is success.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<Vec<T>> {
        if self.code != "0" {
            return Err(AppError::venue("okx", format!("code {}: {}", self.code, self.msg)));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
    base_ccy: String,
    quote_ccy: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    last: String,
}

#[derive(Debug, Clone)]
pub struct Okx {
    http: reqwest::Client,
}

impl Okx {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

fn live_symbols(instruments: Vec<Instrument>) -> BTreeSet<String> {
    instruments
        .into_iter()
        .filter(|i| i.state == "live")
        .map(|i| unified_symbol(&i.base_ccy, &i.quote_ccy))
        .collect()
}

fn last_price(tickers: Vec<Ticker>, inst_id: &str) -> Result<f64> {
    let ticker = tickers
        .into_iter()
        .next()
        .ok_or_else(|| AppError::venue("okx", format!("no ticker for {inst_id}")))?;
    parse_price(&ticker.last)
}

#[async_trait]
impl MarketData for Okx {
    async fn list_symbols(&self) -> Result<BTreeSet<String>> {
        let url = Url::parse_with_params(
            &format!("{OKX_REST_ENDPOINT}/api/v5/public/instruments"),
            &[("instType", "SPOT")],
        )?;
        let envelope: Envelope<Instrument> = get_json(&self.http, "okx", url).await?;
        Ok(live_symbols(envelope.into_data()?))
    }

    async fn fetch_last_price(&self, symbol: &str) -> Result<f64> {
        let (base, quote) = split_symbol(symbol)
            .ok_or_else(|| AppError::venue("okx", format!("malformed symbol '{symbol}'")))?;
        let inst_id = format!("{base}-{quote}");
        let url = Url::parse_with_params(
            &format!("{OKX_REST_ENDPOINT}/api/v5/market/ticker"),
            &[("instId", inst_id.as_str())],
        )?;
        let envelope: Envelope<Ticker> = get_json(&self.http, "okx", url).await?;
        last_price(envelope.into_data()?, &inst_id)
    }
}
