use anyhow::Result;
use std::sync::Arc;
use venue_arbitrage_scanner::{
    aggregator::Aggregator,
    cex::VenueRegistry,
    config::AppConfig,
    server::{self, AppState},
    utils,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let once = std::env::args().skip(1).any(|arg| arg == "--once");

    let config = AppConfig::load()?;
    let registry = Arc::new(VenueRegistry::from_config(&config)?);
    tracing::info!(
        venues = ?registry.ids(),
        threshold_pct = config.threshold_pct,
        fetch_concurrency = config.fetch_concurrency,
        "[INIT] venue-arbitrage-scanner starting"
    );

    let aggregator = Arc::new(Aggregator::from_config(registry, &config));

    if once {
        let opportunities = aggregator.run_scan().await?;
        println!("{}", serde_json::to_string_pretty(&opportunities)?);
        return Ok(());
    }

    let state = AppState { aggregator };
    server::serve(state, config.listen_addr(), &config.static_dir).await?;
    Ok(())
}
