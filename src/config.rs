//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_VENUES: &str = "binance,kraken,bybit,okx,htx,mexc";
pub const DEFAULT_TIMEOUT_MS: u64 = 50_000;
pub const DEFAULT_THRESHOLD_PCT: f64 = 0.5;
pub const DEFAULT_CONCURRENCY: usize = 16;
pub const DEFAULT_PORT: u16 = 3000;

/// A configured venue: registry position is the order in `VENUES`.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueConfig {
    pub id: String,
    pub timeout: Duration,
}

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub venues: Vec<VenueConfig>,
    /// Percentage a pair must strictly exceed to be reported.
    pub threshold_pct: f64,
    /// Upper bound on in-flight venue calls per stage. 1 = sequential.
    pub fetch_concurrency: usize,
    pub bind_addr: IpAddr,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let default_timeout = match get("VENUE_TIMEOUT_MS") {
            Some(raw) => parse_millis("VENUE_TIMEOUT_MS", &raw)?,
            None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };

        let venue_list = get("VENUES").unwrap_or_else(|| DEFAULT_VENUES.into());
        let mut venues: Vec<VenueConfig> = Vec::new();
        for id in venue_list.split(',').map(|s| s.trim().to_lowercase()) {
            if id.is_empty() {
                continue;
            }
            if venues.iter().any(|v| v.id == id) {
                return Err(AppError::Config(format!("duplicate venue id '{id}'")));
            }
            let key = format!("{}_TIMEOUT_MS", id.to_uppercase());
            let timeout = match get(key.as_str()) {
                Some(raw) => parse_millis(&key, &raw)?,
                None => default_timeout,
            };
            venues.push(VenueConfig { id, timeout });
        }
        if venues.is_empty() {
            return Err(AppError::Config("VENUES must name at least one venue".into()));
        }

        let threshold_pct = match get("ARBITRAGE_THRESHOLD_PCT") {
            Some(raw) => raw.parse::<f64>()?,
            None => DEFAULT_THRESHOLD_PCT,
        };
        if !threshold_pct.is_finite() || threshold_pct < 0.0 {
            return Err(AppError::Config(format!(
                "ARBITRAGE_THRESHOLD_PCT must be a non-negative number, got {threshold_pct}"
            )));
        }

        let fetch_concurrency = match get("FETCH_CONCURRENCY") {
            Some(raw) => raw.parse::<usize>()?,
            None => DEFAULT_CONCURRENCY,
        };
        if fetch_concurrency == 0 {
            return Err(AppError::Config("FETCH_CONCURRENCY must be at least 1".into()));
        }

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>()?,
            None => DEFAULT_PORT,
        };
        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|e| AppError::Config(format!("BIND_ADDR '{raw}': {e}")))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let static_dir = get("STATIC_DIR").unwrap_or_else(|| "public".into()).into();

        Ok(Self {
            venues,
            threshold_pct,
            fetch_concurrency,
            bind_addr,
            port,
            static_dir,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration> {
    let ms = raw.parse::<u64>()?;
    if ms == 0 {
        return Err(AppError::Config(format!("{key} must be greater than zero")));
    }
    Ok(Duration::from_millis(ms))
}
