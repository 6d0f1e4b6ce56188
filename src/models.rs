//! Scan-scoped data structures shared by the pipeline stages.

use std::collections::{BTreeMap, BTreeSet};

/// Outcome of one venue's symbol listing. `None` means the listing failed.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolListing {
    pub venue: String,
    pub symbols: Option<BTreeSet<String>>,
}

impl SymbolListing {
    /// Failed listings count as empty when intersecting.
    pub fn symbols_or_empty(&self) -> BTreeSet<String> {
        self.symbols.clone().unwrap_or_default()
    }
}

/// Per-venue symbol universe, in registry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueSymbolSet {
    pub listings: Vec<SymbolListing>,
}

impl VenueSymbolSet {
    pub fn get(&self, venue: &str) -> Option<&SymbolListing> {
        self.listings.iter().find(|l| l.venue == venue)
    }

    pub fn failed_venues(&self) -> impl Iterator<Item = &str> {
        self.listings
            .iter()
            .filter(|l| l.symbols.is_none())
            .map(|l| l.venue.as_str())
    }
}

/// One venue's slot under a symbol. `None` means the fetch failed.
#[derive(Debug, Clone, PartialEq)]
pub struct VenuePrice {
    pub venue: String,
    pub price: Option<f64>,
}

/// symbol → venue slots (registry order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    pub rows: BTreeMap<String, Vec<VenuePrice>>,
}

impl PriceTable {
    pub fn price(&self, symbol: &str, venue: &str) -> Option<f64> {
        self.rows
            .get(symbol)?
            .iter()
            .find(|slot| slot.venue == venue)?
            .price
    }

    /// Number of populated slots across the whole table.
    pub fn filled(&self) -> usize {
        self.rows
            .values()
            .flatten()
            .filter(|slot| slot.price.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_lookup_skips_absent_slots() {
        let mut table = PriceTable::default();
        table.rows.insert(
            "ETH/USDT".into(),
            vec![
                VenuePrice { venue: "a".into(), price: Some(10.0) },
                VenuePrice { venue: "b".into(), price: None },
            ],
        );
        assert_eq!(table.price("ETH/USDT", "a"), Some(10.0));
        assert_eq!(table.price("ETH/USDT", "b"), None);
        assert_eq!(table.price("BTC/USDT", "a"), None);
        assert_eq!(table.filled(), 1);
    }
}
