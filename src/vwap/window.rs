// =============================================================================
// Trade Window — bounded sliding window of trades ordered by sequence
// =============================================================================

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A single validated trade from the matches feed.
///
/// `sequence` is the exchange-assigned ordering key; trades may arrive out of
/// order over the transport. `time` is carried for display only and plays no
/// part in ordering or eviction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecord {
    pub sequence: u64,
    pub price: Decimal,
    pub size: Decimal,
    pub time: DateTime<Utc>,
}

/// Heap entry ordered by sequence number alone.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BySequence(TradeRecord);

impl Ord for BySequence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.sequence.cmp(&other.0.sequence)
    }
}

impl PartialOrd for BySequence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Bounded container holding the `capacity` most recent trades by sequence
/// number.
///
/// Backed by a min-heap keyed on `sequence`, so the eviction candidate (the
/// smallest sequence held) sits at the top and insert/evict are O(log K).
#[derive(Debug)]
pub struct TradeWindow {
    heap: BinaryHeap<Reverse<BySequence>>,
    capacity: usize,
}

impl TradeWindow {
    /// Create a window holding at most `capacity` trades. `capacity` must be
    /// at least 1; the config layer enforces this before construction.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert a trade, evicting and returning the minimum-sequence trade when
    /// the window would otherwise exceed its capacity.
    ///
    /// The incoming trade is always inserted first. A trade with a sequence
    /// lower than everything held in a full window is therefore evicted right
    /// back out, leaving the contents unchanged. Duplicate sequence numbers
    /// are kept as independent records; the feed does not promise uniqueness
    /// and silently deduplicating would change the sums.
    pub fn insert(&mut self, record: TradeRecord) -> Option<TradeRecord> {
        self.heap.push(Reverse(BySequence(record)));
        if self.heap.len() > self.capacity {
            self.heap.pop().map(|Reverse(BySequence(trade))| trade)
        } else {
            None
        }
    }

    /// Number of trades currently held.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Smallest sequence currently held, i.e. the next eviction candidate.
    pub fn min_sequence(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(BySequence(trade))| trade.sequence)
    }

    /// Iterate over the trades currently held, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TradeRecord> {
        self.heap.iter().map(|Reverse(BySequence(trade))| trade)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn trade(sequence: u64) -> TradeRecord {
        TradeRecord {
            sequence,
            price: dec!(10),
            size: dec!(1),
            time: Utc.with_ymd_and_hms(2021, 4, 1, 18, 19, 16).unwrap(),
        }
    }

    fn sequences(window: &TradeWindow) -> Vec<u64> {
        let mut seqs: Vec<u64> = window.iter().map(|t| t.sequence).collect();
        seqs.sort_unstable();
        seqs
    }

    #[test]
    fn stays_within_capacity() {
        let mut window = TradeWindow::new(5);
        for seq in 1..=20 {
            window.insert(trade(seq));
            assert!(window.len() <= 5);
        }
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn evicts_minimum_sequence() {
        let mut window = TradeWindow::new(5);
        for seq in [10, 20, 30, 40, 50] {
            assert!(window.insert(trade(seq)).is_none());
        }

        let evicted = window.insert(trade(1000)).expect("window was full");
        assert_eq!(evicted.sequence, 10);
        assert_eq!(window.len(), 5);
        assert_eq!(sequences(&window), vec![20, 30, 40, 50, 1000]);
    }

    #[test]
    fn out_of_order_arrival_keeps_highest_sequences() {
        // Interleaved low/high sequences, as in the upstream fixture:
        // 10, 1, 30, 3, 50 all fit; the next insert drops the global minimum.
        let mut window = TradeWindow::new(5);
        for seq in [10, 1, 30, 3, 50] {
            window.insert(trade(seq));
        }
        assert_eq!(window.len(), 5);

        let evicted = window.insert(trade(1000)).expect("window was full");
        assert_eq!(evicted.sequence, 1);
        assert_eq!(sequences(&window), vec![3, 10, 30, 50, 1000]);
    }

    #[test]
    fn stale_trade_is_evicted_straight_back_out() {
        let mut window = TradeWindow::new(5);
        for seq in [20, 30, 40, 50, 1000] {
            window.insert(trade(seq));
        }
        let before = sequences(&window);

        // Sequence 2 is below the current minimum of 20, so the speculative
        // insert returns it immediately.
        let evicted = window.insert(trade(2)).expect("window was full");
        assert_eq!(evicted.sequence, 2);
        assert_eq!(sequences(&window), before);
    }

    #[test]
    fn duplicate_sequences_are_kept_as_independent_records() {
        let mut window = TradeWindow::new(5);
        window.insert(trade(7));
        window.insert(trade(7));
        assert_eq!(window.len(), 2);
        assert_eq!(sequences(&window), vec![7, 7]);
    }

    #[test]
    fn min_sequence_tracks_eviction_candidate() {
        let mut window = TradeWindow::new(3);
        assert_eq!(window.min_sequence(), None);
        window.insert(trade(42));
        window.insert(trade(17));
        assert_eq!(window.min_sequence(), Some(17));
    }
}
