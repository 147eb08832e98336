pub mod messages;
pub mod stream;

pub use stream::{run_match_stream, ProcessorMap};
