// =============================================================================
// VWAP Processor — per-product facade over window + accumulator
// =============================================================================

use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::types::TradingPair;

use super::aggregator::{VwapAccumulator, VwapError};
use super::window::{TradeRecord, TradeWindow};

/// Window and sums mutate together; a single lock keeps the pair consistent.
struct ProcessorState {
    window: TradeWindow,
    accumulator: VwapAccumulator,
}

/// Owns the sliding window and running sums for one trading pair.
///
/// One processor exists per configured pair for the lifetime of the process.
/// It is shared as `Arc<VwapProcessor>` between the feed task and any readers;
/// all mutation happens inside [`add_trade`](Self::add_trade) under the write
/// lock, so concurrent delivery from multiple connections stays serialised.
pub struct VwapProcessor {
    product: TradingPair,
    state: RwLock<ProcessorState>,
}

impl VwapProcessor {
    pub fn new(product: TradingPair, window_size: usize) -> Self {
        Self {
            product,
            state: RwLock::new(ProcessorState {
                window: TradeWindow::new(window_size),
                accumulator: VwapAccumulator::new(),
            }),
        }
    }

    /// Record a trade: fold it into the sums, insert it into the window, and
    /// remove the contribution of whatever the insertion evicted.
    ///
    /// A trade older than everything in a full window nets out to a no-op:
    /// the record is inserted, immediately evicted, and its own contribution
    /// subtracted again.
    pub fn add_trade(&self, record: TradeRecord) {
        let mut state = self.state.write();
        state.accumulator.on_insert(&record);
        if let Some(evicted) = state.window.insert(record) {
            state.accumulator.on_evict(&evicted);
        }
    }

    /// VWAP over the trades currently in the window.
    pub fn current_vwap(&self) -> Result<Decimal, VwapError> {
        self.state.read().accumulator.vwap()
    }

    pub fn product(&self) -> TradingPair {
        self.product
    }

    /// Number of trades currently held in the window.
    pub fn trade_count(&self) -> usize {
        self.state.read().window.len()
    }
}
