// =============================================================================
// Coinbase feed messages — subscribe request and inbound schema
// =============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::TradingPair;
use crate::vwap::TradeRecord;

/// Channel carrying individual trade executions.
pub const MATCHES_CHANNEL: &str = "matches";

/// Smallest accepted price or size (one hundred-millionth).
fn min_quote() -> Decimal {
    Decimal::new(1, 8)
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Subscription request sent once after connecting.
///
/// Serialises to
/// `{"type":"subscribe","channels":["matches"],"product_ids":["BTC-USD",...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    #[serde(rename = "type")]
    kind: &'static str,
    channels: Vec<String>,
    product_ids: Vec<TradingPair>,
}

impl SubscribeRequest {
    /// Subscribe the given products to the matches channel.
    pub fn matches(products: &[TradingPair]) -> Self {
        Self {
            kind: "subscribe",
            channels: vec![MATCHES_CHANNEL.to_string()],
            product_ids: products.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Inbound feed message, discriminated by the `type` field.
///
/// Anything that is not a subscription ack, a feed error, or a match falls
/// into `Other` and is skipped by the consumer (heartbeats, `last_match`,
/// future message types).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    Subscriptions {},
    Error { message: String },
    Match(MatchMessage),
    #[serde(other)]
    Other,
}

/// A single execution on the matches channel.
///
/// Price and size arrive as decimal strings and are parsed exactly; fields
/// the engine does not use (`trade_id`, order ids, `side`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchMessage {
    pub product_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub size: Decimal,
    pub sequence: u64,
    pub time: DateTime<Utc>,
}

/// Validation failures for an otherwise well-formed match message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidMatch {
    #[error("unknown product id: {0}")]
    UnknownProduct(String),
    #[error("price {0} below minimum quote")]
    PriceTooSmall(Decimal),
    #[error("size {0} below minimum quote")]
    SizeTooSmall(Decimal),
}

impl MatchMessage {
    /// Validate the message and convert it into a routing key plus the core's
    /// trade record.
    pub fn into_trade(self) -> Result<(TradingPair, TradeRecord), InvalidMatch> {
        let product = TradingPair::from_id(&self.product_id)
            .ok_or_else(|| InvalidMatch::UnknownProduct(self.product_id.clone()))?;

        if self.price < min_quote() {
            return Err(InvalidMatch::PriceTooSmall(self.price));
        }
        if self.size < min_quote() {
            return Err(InvalidMatch::SizeTooSmall(self.size));
        }

        Ok((
            product,
            TradeRecord {
                sequence: self.sequence,
                price: self.price,
                size: self.size,
                time: self.time,
            },
        ))
    }
}
