// =============================================================================
// Coinbase match stream — subscribe and feed trades into the processors
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::types::TradingPair;
use crate::vwap::VwapProcessor;

use super::messages::{FeedMessage, MatchMessage, SubscribeRequest, MATCHES_CHANNEL};

/// Routing table from product to its processor. Built once by the composition
/// root and never mutated afterwards.
pub type ProcessorMap = HashMap<TradingPair, Arc<VwapProcessor>>;

/// Connect to the feed, subscribe to the matches channel for every configured
/// product, and consume until the stream ends or errors.
///
/// Runs until the connection drops; the caller (main.rs) owns the reconnect
/// policy.
pub async fn run_match_stream(
    url: &str,
    products: &[TradingPair],
    processors: &Arc<ProcessorMap>,
) -> Result<()> {
    info!(url = %url, products = ?products, "connecting to Coinbase WebSocket feed");

    let (ws_stream, _response) = connect_async(url)
        .await
        .context("failed to connect to Coinbase WebSocket feed")?;

    info!(channel = MATCHES_CHANNEL, "feed connected, subscribing");
    let (mut write, mut read) = ws_stream.split();

    let subscribe = serde_json::to_string(&SubscribeRequest::matches(products))
        .context("failed to serialise subscribe request")?;
    write
        .send(Message::Text(subscribe))
        .await
        .context("failed to send subscribe request")?;

    loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => handle_message(&text, processors)?,
            Some(Ok(Message::Close(frame))) => {
                warn!(frame = ?frame, "feed closed the connection");
                return Ok(());
            }
            Some(Ok(_)) => {
                // Ping/pong/binary frames -- tungstenite answers pings itself.
            }
            Some(Err(e)) => {
                error!(error = %e, "feed read error");
                return Err(e.into());
            }
            None => {
                warn!("feed stream ended");
                return Ok(());
            }
        }
    }
}

/// Classify and process one text frame.
///
/// Returns an error only for an `error` message from the feed, which drops
/// the connection so the supervisor can resubscribe. Malformed or unexpected
/// frames are skipped.
fn handle_message(text: &str, processors: &ProcessorMap) -> Result<()> {
    let message: FeedMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "skipping malformed feed message");
            return Ok(());
        }
    };

    match message {
        FeedMessage::Subscriptions {} => {
            info!(channel = MATCHES_CHANNEL, "successfully subscribed");
        }
        FeedMessage::Error { message } => {
            warn!(message = %message, channel = MATCHES_CHANNEL, "feed error, closing connection");
            anyhow::bail!("feed error on the {MATCHES_CHANNEL} channel: {message}");
        }
        FeedMessage::Match(message) => process_match(message, processors),
        FeedMessage::Other => {
            debug!("ignoring non-match message");
        }
    }

    Ok(())
}

/// Validate one match, route it to the owning processor, and report the
/// refreshed VWAP.
fn process_match(message: MatchMessage, processors: &ProcessorMap) {
    let (product, record) = match message.into_trade() {
        Ok(validated) => validated,
        Err(e) => {
            warn!(error = %e, "skipping match message");
            return;
        }
    };

    let processor = match processors.get(&product) {
        Some(processor) => processor,
        None => {
            // Subscribed set and processor map are built from the same config,
            // so this only fires if the feed sends a product we never asked for.
            debug!(product = %product, "no processor registered for product");
            return;
        }
    };

    processor.add_trade(record);
    match processor.current_vwap() {
        Ok(vwap) => info!(product = %processor.product(), vwap = %vwap, "vwap"),
        Err(e) => warn!(product = %processor.product(), error = %e, "vwap unavailable"),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn processor_map(products: &[TradingPair], window_size: usize) -> Arc<ProcessorMap> {
        let mut map = ProcessorMap::new();
        for product in products {
            map.insert(
                *product,
                Arc::new(VwapProcessor::new(*product, window_size)),
            );
        }
        Arc::new(map)
    }

    fn match_json(product: &str, sequence: u64, price: &str, size: &str) -> String {
        format!(
            r#"{{"type": "match", "product_id": "{product}", "price": "{price}",
                 "size": "{size}", "sequence": {sequence},
                 "time": "2021-04-01T18:19:16.243055Z"}}"#
        )
    }

    #[test]
    fn match_messages_reach_the_owning_processor() {
        let processors = processor_map(&[TradingPair::BtcUsd, TradingPair::EthUsd], 5);

        handle_message(
            &match_json("BTC-USD", 100, "58050.02", "0.0241"),
            &processors,
        )
        .unwrap();
        handle_message(&match_json("BTC-USD", 101, "58051.00", "0.5"), &processors).unwrap();
        handle_message(&match_json("ETH-USD", 7, "2000.00", "1"), &processors).unwrap();

        assert_eq!(processors[&TradingPair::BtcUsd].trade_count(), 2);
        assert_eq!(processors[&TradingPair::EthUsd].trade_count(), 1);
        assert_eq!(
            processors[&TradingPair::EthUsd]
                .current_vwap()
                .unwrap()
                .to_string(),
            "2000.00000000"
        );
    }

    #[test]
    fn invalid_matches_are_skipped_without_failing_the_stream() {
        let processors = processor_map(&[TradingPair::BtcUsd], 5);

        // Unknown product, zero size, malformed JSON: all skipped.
        handle_message(&match_json("EUR-USD", 1, "10", "1"), &processors).unwrap();
        handle_message(&match_json("BTC-USD", 2, "10", "0"), &processors).unwrap();
        handle_message("not json at all", &processors).unwrap();

        assert_eq!(processors[&TradingPair::BtcUsd].trade_count(), 0);
    }

    #[test]
    fn subscription_ack_and_unknown_types_are_accepted() {
        let processors = processor_map(&[TradingPair::BtcUsd], 5);

        handle_message(
            r#"{"type": "subscriptions", "channels": []}"#,
            &processors,
        )
        .unwrap();
        handle_message(r#"{"type": "heartbeat", "sequence": 90}"#, &processors).unwrap();

        assert_eq!(processors[&TradingPair::BtcUsd].trade_count(), 0);
    }

    #[test]
    fn feed_error_drops_the_connection() {
        let processors = processor_map(&[TradingPair::BtcUsd], 5);

        let result = handle_message(
            r#"{"type": "error", "message": "Failed to subscribe"}"#,
            &processors,
        );
        assert!(result.is_err());
    }
}
