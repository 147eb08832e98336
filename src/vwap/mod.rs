pub mod aggregator;
pub mod processor;
pub mod window;

// Re-export the core types for convenient access (e.g. `use crate::vwap::VwapProcessor`).
pub use aggregator::{VwapAccumulator, VwapError};
pub use processor::VwapProcessor;
pub use window::{TradeRecord, TradeWindow};
