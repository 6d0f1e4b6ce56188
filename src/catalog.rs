//! Per-venue symbol universe and its cross-venue intersection.

use crate::cex::{Venue, VenueRegistry};
use crate::errors::Result;
use crate::models::{SymbolListing, VenueSymbolSet};
use futures::{StreamExt, stream};
use std::collections::BTreeSet;
use tracing::{info, warn};

pub struct SymbolCatalog<'a> {
    registry: &'a VenueRegistry,
    concurrency: usize,
}

impl<'a> SymbolCatalog<'a> {
    pub fn new(registry: &'a VenueRegistry, concurrency: usize) -> Self {
        Self {
            registry,
            concurrency: concurrency.max(1),
        }
    }

    /// List every venue's symbols. A failed venue is logged and recorded as absent.
    ///
    /// Only a panicked listing task is reported as an error.
    pub async fn fetch_symbols(&self) -> Result<VenueSymbolSet> {
        let mut listings: Vec<SymbolListing> = self
            .registry
            .venues()
            .iter()
            .map(|v| SymbolListing {
                venue: v.id().to_string(),
                symbols: None,
            })
            .collect();

        let jobs: Vec<(usize, Venue)> =
            self.registry.venues().iter().cloned().enumerate().collect();
        let settled: Vec<_> = stream::iter(jobs)
            .map(|(idx, venue)| {
                tokio::spawn(async move {
                    let res = venue.list_symbols().await;
                    (idx, res)
                })
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for joined in settled {
            let (idx, res) = joined?;
            let slot = &mut listings[idx];
            match res {
                Ok(symbols) => {
                    info!(venue = %slot.venue, count = symbols.len(), "[CATALOG] markets loaded");
                    slot.symbols = Some(symbols);
                }
                Err(e) => {
                    warn!(venue = %slot.venue, error = %e, "[CATALOG] failed to load markets");
                }
            }
        }

        Ok(VenueSymbolSet { listings })
    }
}

/// Intersect all venues' symbols, seeded from the first venue in registry order.
///
/// A failed seed venue contributes an empty set, so the result is empty no
/// matter what the other venues listed.
pub fn find_common_symbols(symbol_sets: &VenueSymbolSet) -> BTreeSet<String> {
    let Some(seed) = symbol_sets.listings.first() else {
        return BTreeSet::new();
    };
    let mut common = seed.symbols_or_empty();
    for listing in &symbol_sets.listings {
        let symbols = listing.symbols.as_ref();
        common.retain(|s| symbols.is_some_and(|set| set.contains(s)));
    }
    common
}
