use super::types::{ArbitrageConfig, ArbitrageOpportunity};
use crate::models::PriceTable;
use crate::utils::round_half_up;
use tracing::debug;

/// Compare every unordered pair of present prices per symbol.
///
/// Pairs are taken in table order (symbol, then registry order of venues),
/// so output order is deterministic for a given table.
pub fn scan(table: &PriceTable, config: &ArbitrageConfig) -> Vec<ArbitrageOpportunity> {
    let mut opportunities = Vec::new();

    for (symbol, slots) in &table.rows {
        let quoted: Vec<(&str, f64)> = slots
            .iter()
            .filter_map(|slot| Some((slot.venue.as_str(), slot.price?)))
            .collect();
        if quoted.len() < 2 {
            continue;
        }

        for (i, &(venue_a, price_a)) in quoted.iter().enumerate() {
            for &(venue_b, price_b) in &quoted[i + 1..] {
                let Some(pct) = percentage_difference(price_a, price_b) else {
                    debug!(%symbol, venue_a, venue_b, price_a, price_b, "[SCAN] pair skipped: undefined mean");
                    continue;
                };
                if pct > config.threshold_pct {
                    opportunities.push(ArbitrageOpportunity {
                        symbol: symbol.clone(),
                        exchange1: venue_a.to_string(),
                        price1: price_a,
                        exchange2: venue_b.to_string(),
                        price2: price_b,
                        percentage_difference: round_half_up(pct, 2),
                    });
                }
            }
        }
    }

    opportunities
}

/// `|a - b|` as a percentage of the pair mean.
///
/// `None` when the mean is not strictly positive or the result is not finite.
pub fn percentage_difference(price_a: f64, price_b: f64) -> Option<f64> {
    let mean = (price_a + price_b) / 2.0;
    if mean.is_nan() || mean <= 0.0 {
        return None;
    }
    let pct = (price_a - price_b).abs() / mean * 100.0;
    pct.is_finite().then_some(pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VenuePrice;

    fn row(symbol: &str, slots: &[(&str, Option<f64>)]) -> (String, Vec<VenuePrice>) {
        let slots = slots
            .iter()
            .map(|(venue, price)| VenuePrice { venue: venue.to_string(), price: *price })
            .collect();
        (symbol.to_string(), slots)
    }

    fn table(rows: Vec<(String, Vec<VenuePrice>)>) -> PriceTable {
        PriceTable { rows: rows.into_iter().collect() }
    }

    fn cfg(threshold_pct: f64) -> ArbitrageConfig {
        ArbitrageConfig { threshold_pct }
    }

    #[test]
    fn three_venue_scenario_reports_every_pair() {
        let t = table(vec![row("X", &[("A", Some(100.0)), ("B", Some(102.0)), ("C", Some(110.0))])]);
        let opps = scan(&t, &cfg(0.5));
        let got: Vec<(&str, &str, f64)> = opps
            .iter()
            .map(|o| (o.exchange1.as_str(), o.exchange2.as_str(), o.percentage_difference))
            .collect();
        assert_eq!(got, vec![("A", "B", 1.98), ("A", "C", 9.52), ("B", "C", 7.55)]);
        assert!(opps.iter().all(|o| o.symbol == "X"));
        assert_eq!((opps[1].price1, opps[1].price2), (100.0, 110.0));
    }

    #[test]
    fn single_quote_produces_nothing() {
        let t = table(vec![row("X", &[("solo", Some(100.0))])]);
        assert!(scan(&t, &cfg(0.5)).is_empty());
        let t = table(vec![row("X", &[("A", Some(100.0)), ("B", None), ("C", None)])]);
        assert!(scan(&t, &cfg(0.5)).is_empty());
    }

    #[test]
    fn symbol_without_prices_is_skipped() {
        let t = table(vec![
            row("EMPTY", &[("A", None), ("B", None)]),
            row("X", &[("A", Some(1.0)), ("B", Some(2.0))]),
        ]);
        let opps = scan(&t, &cfg(0.5));
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].symbol, "X");
    }

    #[test]
    fn identical_prices_produce_nothing() {
        let t = table(vec![row("X", &[("A", Some(42.0)), ("B", Some(42.0)), ("C", Some(42.0))])]);
        assert!(scan(&t, &cfg(0.0)).is_empty());
    }

    #[test]
    fn threshold_is_strict() {
        // 1 / 100 * 100 = 1.0 exactly
        let t = table(vec![row("X", &[("A", Some(99.5)), ("B", Some(100.5))])]);
        assert!(scan(&t, &cfg(1.0)).is_empty());
        assert_eq!(scan(&t, &cfg(0.99)).len(), 1);
    }

    #[test]
    fn absent_slot_drops_only_its_pairs() {
        let t = table(vec![row("X", &[("A", Some(100.0)), ("B", None), ("C", Some(110.0))])]);
        let opps = scan(&t, &cfg(0.5));
        assert_eq!(opps.len(), 1);
        assert_eq!((opps[0].exchange1.as_str(), opps[0].exchange2.as_str()), ("A", "C"));
    }

    #[test]
    fn never_self_compares_or_double_counts() {
        let venues = ["A", "B", "C", "D", "E"];
        let slots: Vec<(&str, Option<f64>)> = venues
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, Some(100.0 + 10.0 * i as f64)))
            .collect();
        let t = table(vec![row("X", &slots)]);
        let opps = scan(&t, &cfg(0.0));
        assert_eq!(opps.len(), venues.len() * (venues.len() - 1) / 2);
        let mut seen = std::collections::HashSet::new();
        for o in &opps {
            assert_ne!(o.exchange1, o.exchange2);
            let key = if o.exchange1 < o.exchange2 {
                (o.exchange1.clone(), o.exchange2.clone())
            } else {
                (o.exchange2.clone(), o.exchange1.clone())
            };
            assert!(seen.insert(key), "pair reported twice");
        }
    }

    #[test]
    fn zero_prices_are_skipped_not_nan() {
        let t = table(vec![row("X", &[("A", Some(0.0)), ("B", Some(0.0)), ("C", Some(10.0))])]);
        let opps = scan(&t, &cfg(0.5));
        // (A,B) undefined and skipped; (A,C) and (B,C) are 200%
        assert_eq!(opps.len(), 2);
        assert!(opps.iter().all(|o| o.percentage_difference == 200.0));
        assert_eq!(percentage_difference(0.0, 0.0), None);
        assert_eq!(percentage_difference(-5.0, 1.0), None);
    }

    #[test]
    fn emission_matches_formula_across_grid() {
        let prices = [0.01_f64, 1.0, 99.9, 100.0, 100.4, 100.6, 250.0, 43_000.0];
        for &p1 in &prices {
            for &p2 in &prices {
                let expected = (p1 - p2).abs() / ((p1 + p2) / 2.0) * 100.0;
                let t = table(vec![row("X", &[("A", Some(p1)), ("B", Some(p2))])]);
                let opps = scan(&t, &cfg(0.5));
                assert_eq!(opps.len() == 1, expected > 0.5, "p1={p1} p2={p2}");
                if let Some(o) = opps.first() {
                    assert!((o.percentage_difference - expected).abs() <= 0.005 + 1e-9);
                }
            }
        }
    }
}
