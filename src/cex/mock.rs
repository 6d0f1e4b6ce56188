//! Scripted in-memory venue for tests.

use super::{MarketData, Venue};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub(crate) struct MockVenue {
    symbols: Option<BTreeSet<String>>,
    prices: HashMap<String, f64>,
    delay: Option<Duration>,
    panic_on_price: bool,
    price_calls: Arc<AtomicUsize>,
}

impl MockVenue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn symbols(mut self, symbols: &[&str]) -> Self {
        self.symbols = Some(symbols.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Symbols not priced here fail their fetch.
    pub(crate) fn price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub(crate) fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn panic_on_price(mut self) -> Self {
        self.panic_on_price = true;
        self
    }

    pub(crate) fn price_calls(&self) -> Arc<AtomicUsize> {
        self.price_calls.clone()
    }

    pub(crate) fn into_venue(self, id: &str, timeout: Duration) -> Venue {
        Venue::new(id, timeout, Arc::new(self))
    }
}

#[async_trait]
impl MarketData for MockVenue {
    async fn list_symbols(&self) -> Result<BTreeSet<String>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.symbols
            .clone()
            .ok_or_else(|| AppError::venue("mock", "markets unavailable"))
    }

    async fn fetch_last_price(&self, symbol: &str) -> Result<f64> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic_on_price {
            panic!("mock venue exploded while pricing {symbol}");
        }
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| AppError::venue("mock", format!("no ticker for {symbol}")))
    }
}
