// =============================================================================
// VWAP Accumulator — incremental Σ(price·size) and Σ(size) over the window
// =============================================================================

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use super::window::TradeRecord;

/// Fractional digits in a reported VWAP.
const VWAP_SCALE: u32 = 8;

/// Errors from the VWAP computation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VwapError {
    /// No volume has been accumulated yet, so the quotient is undefined.
    /// Callers must not query before the first trade has been recorded.
    #[error("vwap is undefined before the first trade is recorded")]
    DivisionUndefined,
}

/// Running sums kept in lockstep with a `TradeWindow`'s contents.
///
/// `cumulative_value` is Σ(price × size) and `cumulative_volume` is Σ(size)
/// over exactly the trades currently in the window. The sums are only ever
/// adjusted incrementally via [`on_insert`](Self::on_insert) and
/// [`on_evict`](Self::on_evict); [`from_records`](Self::from_records) rebuilds
/// them from scratch as a verification path.
///
/// All arithmetic is exact fixed-point. Binary floats would drift across many
/// insert/evict cycles.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VwapAccumulator {
    cumulative_value: Decimal,
    cumulative_volume: Decimal,
}

impl VwapAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the sums directly from a set of trades.
    pub fn from_records<'a>(records: impl Iterator<Item = &'a TradeRecord>) -> Self {
        let mut accumulator = Self::new();
        for record in records {
            accumulator.on_insert(record);
        }
        accumulator
    }

    /// Fold an inserted trade into the sums. Called for every insertion, even
    /// one whose record is evicted by the same call.
    pub fn on_insert(&mut self, record: &TradeRecord) {
        self.cumulative_value += record.price * record.size;
        self.cumulative_volume += record.size;
    }

    /// Remove an evicted trade's contribution.
    ///
    /// Subtracts the evicted record's own price × size and size. Using the
    /// incoming trade's size here desynchronises `cumulative_value` from the
    /// window whenever the two sizes differ.
    pub fn on_evict(&mut self, evicted: &TradeRecord) {
        self.cumulative_value -= evicted.price * evicted.size;
        self.cumulative_volume -= evicted.size;
    }

    /// Current VWAP, quantized to 8 fractional digits with ties rounded away
    /// from zero.
    pub fn vwap(&self) -> Result<Decimal, VwapError> {
        if self.cumulative_volume.is_zero() {
            return Err(VwapError::DivisionUndefined);
        }

        let mut vwap = (self.cumulative_value / self.cumulative_volume)
            .round_dp_with_strategy(VWAP_SCALE, RoundingStrategy::MidpointAwayFromZero);
        vwap.rescale(VWAP_SCALE);
        Ok(vwap)
    }

    pub fn cumulative_value(&self) -> Decimal {
        self.cumulative_value
    }

    pub fn cumulative_volume(&self) -> Decimal {
        self.cumulative_volume
    }
}
