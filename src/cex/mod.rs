//! CEX REST market-data clients.
//!
//! Responsibilities:
//! • List the spot symbols a venue currently trades, in unified `BASE/QUOTE` form.
//! • Fetch the last traded price for one unified symbol.
//! • Bound every call with the venue's configured timeout.

use crate::config::{AppConfig, VenueConfig};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub mod binance;
pub mod bybit;
pub mod htx;
pub mod kraken;
#[cfg(test)]
pub(crate) mod mock;
pub mod okx;

pub use binance::BinanceStyle;
pub use bybit::Bybit;
pub use htx::Htx;
pub use kraken::Kraken;
pub use okx::Okx;

/// The two capabilities every venue provides.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn list_symbols(&self) -> Result<BTreeSet<String>>;
    async fn fetch_last_price(&self, symbol: &str) -> Result<f64>;
}

/// A configured venue: identifier, capability handle and per-call timeout.
#[derive(Clone)]
pub struct Venue {
    id: String,
    timeout: Duration,
    client: Arc<dyn MarketData>,
}

impl std::fmt::Debug for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Venue")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Venue {
    pub fn new(id: impl Into<String>, timeout: Duration, client: Arc<dyn MarketData>) -> Self {
        Self {
            id: id.into(),
            timeout,
            client,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn list_symbols(&self) -> Result<BTreeSet<String>> {
        tokio::time::timeout(self.timeout, self.client.list_symbols())
            .await
            .map_err(|_| self.timed_out())?
    }

    pub async fn fetch_last_price(&self, symbol: &str) -> Result<f64> {
        let price = tokio::time::timeout(self.timeout, self.client.fetch_last_price(symbol))
            .await
            .map_err(|_| self.timed_out())??;
        if !price.is_finite() {
            return Err(AppError::venue(&self.id, format!("non-finite price for {symbol}")));
        }
        Ok(price)
    }

    fn timed_out(&self) -> AppError {
        AppError::Timeout {
            venue: self.id.clone(),
            after: self.timeout,
        }
    }
}

/// Ordered collection of venues. Order drives seed selection and pair order.
#[derive(Debug, Clone, Default)]
pub struct VenueRegistry {
    venues: Vec<Venue>,
}

impl VenueRegistry {
    pub fn new(venues: Vec<Venue>) -> Self {
        Self { venues }
    }

    /// Build the live REST adapters for every configured venue id.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = create_http_client()?;
        let venues = config
            .venues
            .iter()
            .map(|vc| build_venue(vc, http.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { venues })
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn ids(&self) -> Vec<&str> {
        self.venues.iter().map(Venue::id).collect()
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }
}

fn build_venue(vc: &VenueConfig, http: reqwest::Client) -> Result<Venue> {
    let client: Arc<dyn MarketData> = match vc.id.as_str() {
        "binance" => Arc::new(BinanceStyle::binance(http)),
        "mexc" => Arc::new(BinanceStyle::mexc(http)),
        "okx" => Arc::new(Okx::new(http)),
        "bybit" => Arc::new(Bybit::new(http)),
        "htx" | "huobi" => Arc::new(Htx::new(http)),
        "kraken" => Arc::new(Kraken::new(http)),
        other => {
            return Err(AppError::Config(format!(
                "unknown venue '{other}' (supported: binance, kraken, bybit, okx, htx, mexc)"
            )));
        }
    };
    Ok(Venue::new(&vc.id, vc.timeout, client))
}

/// Shared HTTP client. Per-venue deadlines are applied by [`Venue`].
pub fn create_http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// GET `url` and decode JSON, turning non-2xx responses into a venue error.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    venue: &str,
    url: Url,
) -> Result<T> {
    let resp = http.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        return Err(AppError::venue(venue, format!("HTTP {status}: {snippet}")));
    }
    Ok(resp.json::<T>().await?)
}

/// `BTC/USDT` from a base and quote asset.
pub fn unified_symbol(base: &str, quote: &str) -> String {
    format!("{}/{}", base.to_uppercase(), quote.to_uppercase())
}

/// Split a unified symbol into `(base, quote)`.
pub fn split_symbol(symbol: &str) -> Option<(&str, &str)> {
    let (base, quote) = symbol.split_once('/')?;
    if base.is_empty() || quote.is_empty() {
        return None;
    }
    Some((base, quote))
}

#[cfg(test)]
mod tests {
    use super::mock::MockVenue;
    use super::*;

    #[test]
    fn symbol_helpers_round_trip_case() {
        assert_eq!(unified_symbol("btc", "usdt"), "BTC/USDT");
        assert_eq!(split_symbol("ETH/BTC"), Some(("ETH", "BTC")));
        assert_eq!(split_symbol("ETHBTC"), None);
        assert_eq!(split_symbol("/BTC"), None);
    }

    #[test]
    fn registry_rejects_unknown_venue() {
        let cfg = AppConfig::from_lookup(|k| (k == "VENUES").then(|| "binance,bitstamp".to_string()))
            .unwrap();
        let err = VenueRegistry::from_config(&cfg).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("bitstamp")));
    }

    #[test]
    fn registry_builds_every_supported_venue() {
        let cfg = AppConfig::from_lookup(|k| {
            (k == "VENUES").then(|| "binance,kraken,bybit,okx,htx,mexc,huobi".to_string())
        })
        .unwrap();
        let registry = VenueRegistry::from_config(&cfg).unwrap();
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn registry_keeps_configured_order() {
        let cfg = AppConfig::from_lookup(|k| (k == "VENUES").then(|| "okx,mexc,binance".to_string()))
            .unwrap();
        let registry = VenueRegistry::from_config(&cfg).unwrap();
        assert_eq!(registry.ids(), vec!["okx", "mexc", "binance"]);
    }

    #[tokio::test]
    async fn slow_venue_times_out() {
        let venue = MockVenue::new()
            .symbols(&["BTC/USDT"])
            .delay(Duration::from_millis(200))
            .into_venue("slow", Duration::from_millis(20));
        let err = venue.list_symbols().await.unwrap_err();
        assert!(matches!(err, AppError::Timeout { ref venue, .. } if venue == "slow"));
    }

    /// Serves `status` with `body` on an ephemeral local port.
    async fn local_endpoint(status: u16, body: &'static str) -> Url {
        use axum::{Router, http::StatusCode, routing::get};
        let status = StatusCode::from_u16(status).unwrap();
        let app = Router::new().route("/", get(move || async move { (status, body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    #[derive(Debug, serde::Deserialize)]
    struct Pong {
        ok: bool,
    }

    #[tokio::test]
    async fn error_status_is_reported_before_decoding() {
        let url = local_endpoint(429, "<html>Too Many Requests</html>").await;
        let err = get_json::<Pong>(&reqwest::Client::new(), "okx", url)
            .await
            .unwrap_err();
        match err {
            AppError::Venue { venue, message } => {
                assert_eq!(venue, "okx");
                assert!(message.contains("429"), "{message}");
                assert!(message.contains("Too Many Requests"), "{message}");
            }
            other => panic!("expected venue error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_status_decodes_json() {
        let url = local_endpoint(200, r#"{"ok":true}"#).await;
        let pong: Pong = get_json(&reqwest::Client::new(), "bybit", url).await.unwrap();
        assert!(pong.ok);
    }

    #[tokio::test]
    async fn non_finite_price_is_a_failure() {
        let venue = MockVenue::new()
            .price("BTC/USDT", f64::NAN)
            .into_venue("nan", Duration::from_secs(1));
        assert!(venue.fetch_last_price("BTC/USDT").await.is_err());
    }
}
