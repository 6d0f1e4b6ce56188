use super::{MarketData, get_json, split_symbol, unified_symbol};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use url::Url;

const HTX_REST_ENDPOINT: &str = "https://api.huobi.pro";

/// HTX replies `{status: "ok", data|tick: ...}` or `{status: "error", err-code, err-msg}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(rename = "err-code", default)]
    err_code: String,
    #[serde(rename = "err-msg", default)]
    err_msg: String,
    #[serde(alias = "tick")]
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_payload(self) -> Result<T> {
        if self.status != "ok" {
            return Err(AppError::venue(
                "htx",
                format!("{} {}: {}", self.status, self.err_code, self.err_msg),
            ));
        }
        self.data
            .ok_or_else(|| AppError::venue("htx", "response carried no payload"))
    }
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    #[serde(rename = "base-currency")]
    base_currency: String,
    #[serde(rename = "quote-currency")]
    quote_currency: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct MergedTick {
    close: f64,
}

#[derive(Debug, Clone)]
pub struct Htx {
    http: reqwest::Client,
}

impl Htx {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

fn online_symbols(symbols: Vec<SymbolInfo>) -> BTreeSet<String> {
    symbols
        .into_iter()
        .filter(|s| s.state == "online")
        .map(|s| unified_symbol(&s.base_currency, &s.quote_currency))
        .collect()
}

/// HTX market ids are lowercase and unseparated: `btcusdt`.
fn native_symbol(symbol: &str) -> Result<String> {
    let (base, quote) = split_symbol(symbol)
        .ok_or_else(|| AppError::venue("htx", format!("malformed symbol '{symbol}'")))?;
    Ok(format!("{base}{quote}").to_lowercase())
}

#[async_trait]
impl MarketData for Htx {
    async fn list_symbols(&self) -> Result<BTreeSet<String>> {
        let url = Url::parse(&format!("{HTX_REST_ENDPOINT}/v1/common/symbols"))?;
        let envelope: Envelope<Vec<SymbolInfo>> = get_json(&self.http, "htx", url).await?;
        Ok(online_symbols(envelope.into_payload()?))
    }

    async fn fetch_last_price(&self, symbol: &str) -> Result<f64> {
        let native = native_symbol(symbol)?;
        let url = Url::parse_with_params(
            &format!("{HTX_REST_ENDPOINT}/market/detail/merged"),
            &[("symbol", native.as_str())],
        )?;
        let envelope: Envelope<MergedTick> = get_json(&self.http, "htx", url).await?;
        Ok(envelope.into_payload()?.close)
    }
}
