// =============================================================================
// Runtime Configuration — engine settings loaded at startup
// =============================================================================
//
// Every field carries `#[serde(default)]` so that adding new fields never
// breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::TradingPair;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_products() -> Vec<TradingPair> {
    TradingPair::ALL.to_vec()
}

fn default_window_size() -> usize {
    5
}

fn default_ws_url() -> String {
    "wss://ws-feed.exchange.coinbase.com".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the VWAP engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Trading pairs the engine subscribes to and tracks.
    #[serde(default = "default_products")]
    pub products: Vec<TradingPair>,

    /// Number of trades each sliding window holds.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Coinbase WebSocket feed endpoint.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            products: default_products(),
            window_size: default_window_size(),
            ws_url: default_ws_url(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        ensure!(config.window_size > 0, "window_size must be at least 1");
        ensure!(!config.products.is_empty(), "products must not be empty");

        info!(
            path = %path.display(),
            products = ?config.products,
            window_size = config.window_size,
            "runtime config loaded"
        );

        Ok(config)
    }
}
