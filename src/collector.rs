//! Last-price collection across the common symbol set.

use crate::cex::{Venue, VenueRegistry};
use crate::errors::Result;
use crate::models::{PriceTable, VenuePrice};
use futures::{StreamExt, stream};
use std::collections::BTreeSet;
use tracing::{info, warn};

pub struct PriceCollector<'a> {
    registry: &'a VenueRegistry,
    concurrency: usize,
}

impl<'a> PriceCollector<'a> {
    pub fn new(registry: &'a VenueRegistry, concurrency: usize) -> Self {
        Self {
            registry,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch every (symbol, venue) price once. Failures leave the slot empty.
    ///
    /// Returns after every fetch has settled. Each task reports its slot key
    /// and the merge happens here, so arrival order is irrelevant.
    pub async fn fetch_prices(&self, symbols: &BTreeSet<String>) -> Result<PriceTable> {
        let venues = self.registry.venues();
        let mut table = PriceTable::default();
        for symbol in symbols {
            let slots = venues
                .iter()
                .map(|v| VenuePrice {
                    venue: v.id().to_string(),
                    price: None,
                })
                .collect();
            table.rows.insert(symbol.clone(), slots);
        }

        // Owned jobs keep the scan future `Send` for the HTTP handler.
        let jobs: Vec<(String, usize, Venue)> = symbols
            .iter()
            .flat_map(|symbol| {
                venues
                    .iter()
                    .enumerate()
                    .map(move |(idx, venue)| (symbol.clone(), idx, venue.clone()))
            })
            .collect();

        let settled: Vec<_> = stream::iter(jobs)
            .map(|(symbol, idx, venue)| {
                tokio::spawn(async move {
                    let res = venue.fetch_last_price(&symbol).await;
                    (symbol, idx, res)
                })
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut failures = 0usize;
        for joined in settled {
            let (symbol, idx, res) = joined?;
            let Some(slot) = table.rows.get_mut(&symbol).and_then(|row| row.get_mut(idx)) else {
                continue;
            };
            match res {
                Ok(price) => slot.price = Some(price),
                Err(e) => {
                    failures += 1;
                    warn!(venue = %slot.venue, %symbol, error = %e, "[PRICES] ticker fetch failed");
                }
            }
        }

        info!(
            symbols = table.rows.len(),
            venues = venues.len(),
            filled = table.filled(),
            failures,
            "[PRICES] collection settled"
        );
        Ok(table)
    }
}
