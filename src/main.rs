// =============================================================================
// Coinbase VWAP Engine — Main Entry Point
// =============================================================================
//
// One processor per trading pair consumes the Coinbase matches channel and
// reports a sliding-window VWAP on every trade.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod coinbase;
mod runtime_config;
mod types;
mod vwap;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::coinbase::ProcessorMap;
use crate::runtime_config::RuntimeConfig;
use crate::types::TradingPair;
use crate::vwap::VwapProcessor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Coinbase VWAP Engine — Starting Up");

    let mut config = RuntimeConfig::load("vwap_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Override products from env if available.
    if let Ok(ids) = std::env::var("VWAP_PRODUCTS") {
        let products: Vec<TradingPair> = ids
            .split(',')
            .filter_map(|id| TradingPair::from_id(id.trim()))
            .collect();
        if products.is_empty() {
            warn!(value = %ids, "VWAP_PRODUCTS contains no known products, keeping config");
        } else {
            config.products = products;
        }
    }

    // Override window size from env if available.
    if let Ok(size) = std::env::var("VWAP_WINDOW_SIZE") {
        match size.trim().parse::<usize>() {
            Ok(n) if n > 0 => config.window_size = n,
            _ => warn!(value = %size, "ignoring invalid VWAP_WINDOW_SIZE"),
        }
    }

    info!(
        products = ?config.products,
        window_size = config.window_size,
        "Configured trading pairs"
    );

    // ── 2. Build the processor map ───────────────────────────────────────
    // One processor per product, constructed once and shared with the feed
    // task. The map itself is never mutated after startup.
    let mut processors: ProcessorMap = HashMap::new();
    for product in &config.products {
        processors.insert(
            *product,
            Arc::new(VwapProcessor::new(*product, config.window_size)),
        );
    }
    let processors = Arc::new(processors);

    // ── 3. Spawn the match stream ────────────────────────────────────────
    let feed_processors = processors.clone();
    let url = config.ws_url.clone();
    let products = config.products.clone();
    tokio::spawn(async move {
        loop {
            if let Err(e) =
                coinbase::run_match_stream(&url, &products, &feed_processors).await
            {
                error!(error = %e, "Match stream error — reconnecting in 5s");
            }
            tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
        }
    });

    info!(count = processors.len(), "Market data stream launched");

    // ── 4. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping");

    Ok(())
}
