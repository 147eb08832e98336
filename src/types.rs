// =============================================================================
// Shared types used across the VWAP engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Trading pairs the engine knows how to track.
///
/// Serialises to the exchange's wire spelling (`BTC-USD`, ...), which is also
/// what the feed sends back in `product_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradingPair {
    #[serde(rename = "BTC-USD")]
    BtcUsd,
    #[serde(rename = "ETH-USD")]
    EthUsd,
    #[serde(rename = "ETH-BTC")]
    EthBtc,
}

impl TradingPair {
    /// Every pair the engine supports, in subscription order.
    pub const ALL: [TradingPair; 3] = [
        TradingPair::BtcUsd,
        TradingPair::EthUsd,
        TradingPair::EthBtc,
    ];

    /// Exchange wire spelling of this pair.
    pub fn id(&self) -> &'static str {
        match self {
            Self::BtcUsd => "BTC-USD",
            Self::EthUsd => "ETH-USD",
            Self::EthBtc => "ETH-BTC",
        }
    }

    /// Parse an exchange product id. Returns `None` for anything outside the
    /// supported set.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "BTC-USD" => Some(Self::BtcUsd),
            "ETH-USD" => Some(Self::EthUsd),
            "ETH-BTC" => Some(Self::EthBtc),
            _ => None,
        }
    }
}

impl std::fmt::Display for TradingPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_to_wire_spelling() {
        let json = serde_json::to_string(&TradingPair::BtcUsd).unwrap();
        assert_eq!(json, r#""BTC-USD""#);
    }

    #[test]
    fn deserialises_from_wire_spelling() {
        let pair: TradingPair = serde_json::from_str(r#""ETH-BTC""#).unwrap();
        assert_eq!(pair, TradingPair::EthBtc);
    }

    #[test]
    fn from_id_rejects_unknown_products() {
        assert_eq!(TradingPair::from_id("BTC-USD"), Some(TradingPair::BtcUsd));
        assert_eq!(TradingPair::from_id("EUR-USD"), None);
        assert_eq!(TradingPair::from_id("btc-usd"), None);
    }

    #[test]
    fn display_matches_id() {
        for pair in TradingPair::ALL {
            assert_eq!(pair.to_string(), pair.id());
        }
    }
}
