//! Cross-venue last-price arbitrage scanner.
//!
//! Each scan lists every venue's spot symbols, intersects them, collects
//! last prices concurrently, and reports venue pairs whose prices diverge
//! by more than a percentage threshold.

pub mod aggregator;
pub mod arbitrage;
pub mod catalog;
pub mod cex;
pub mod collector;
pub mod config;
pub mod errors;
pub mod models;
pub mod server;
pub mod utils;
