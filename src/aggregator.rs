//! Runs one scan: catalog, then prices, then opportunities.

use crate::{
    arbitrage::{ArbitrageConfig, ArbitrageOpportunity, scan},
    catalog::{SymbolCatalog, find_common_symbols},
    cex::VenueRegistry,
    collector::PriceCollector,
    config::AppConfig,
    errors::Result,
};
use std::sync::Arc;
use std::time::Instant;
use tracing;

/// Sequences the three pipeline stages over a venue registry.
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: Arc<VenueRegistry>,
    arbitrage: ArbitrageConfig,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(registry: Arc<VenueRegistry>, arbitrage: ArbitrageConfig, concurrency: usize) -> Self {
        Self {
            registry,
            arbitrage,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(registry: Arc<VenueRegistry>, config: &AppConfig) -> Self {
        Self::new(
            registry,
            ArbitrageConfig {
                threshold_pct: config.threshold_pct,
            },
            config.fetch_concurrency,
        )
    }

    /// One full scan. Each stage settles before the next starts.
    ///
    /// Venue failures are absorbed by the stages; an `Err` here means
    /// something outside those isolated paths went wrong.
    pub async fn run_scan(&self) -> Result<Vec<ArbitrageOpportunity>> {
        let started = Instant::now();

        let symbol_sets = SymbolCatalog::new(&self.registry, self.concurrency)
            .fetch_symbols()
            .await?;
        let common = find_common_symbols(&symbol_sets);
        let failed: Vec<&str> = symbol_sets.failed_venues().collect();
        tracing::info!(
            venues = self.registry.len(),
            ?failed,
            common = common.len(),
            "[CATALOG] common symbols resolved"
        );

        let prices = PriceCollector::new(&self.registry, self.concurrency)
            .fetch_prices(&common)
            .await?;

        let opportunities = scan(&prices, &self.arbitrage);
        tracing::info!(
            opportunities = opportunities.len(),
            threshold_pct = self.arbitrage.threshold_pct,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "[SCAN] scan complete"
        );
        Ok(opportunities)
    }
}
