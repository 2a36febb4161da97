//! uirec-core - event model and streaming combiners for GUI recording
//!
//! Raw UI events enter a two-stage reducer and come out as a much smaller
//! stream of replayable actions:
//!
//! ```text
//! recorder → LowLevelCombiner → HighLevelCombiner → sink
//! ```
//!
//! - The low-level stage coalesces mouse-move and resize storms.
//! - The high-level stage reduces key press/release pairs into `Type` events
//!   and mouse press/release pairs into `Click` events.
//!
//! Everything runs synchronously on the dispatch thread. Each stage holds a
//! small bounded buffer and releases it on `flush()`.

pub mod address;
pub mod error;
pub mod event;
pub mod handler;
pub mod high_level;
pub mod low_level;
pub mod pipeline;
pub mod sink;

#[cfg(test)]
mod testing;

pub use address::{Address, AddressSegment};
pub use error::{Error, ErrorCode, Result};
pub use event::*;
pub use handler::EventHandler;
pub use high_level::{HighLevelCombiner, RunStack};
pub use low_level::LowLevelCombiner;
pub use pipeline::{pipeline, Pipeline, PipelineOptions, Stage};
pub use sink::{ChannelSink, CollectingSink, JsonLinesSink, LogSink};

pub mod prelude {
    pub use crate::address::{Address, AddressSegment};
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::event::*;
    pub use crate::handler::EventHandler;
    pub use crate::high_level::HighLevelCombiner;
    pub use crate::low_level::LowLevelCombiner;
    pub use crate::pipeline::{pipeline, Pipeline, PipelineOptions, Stage};
    pub use crate::sink::{ChannelSink, CollectingSink, JsonLinesSink, LogSink};
}
