//! uirec-recorder - capture GUI input as addressed events
//!
//! Bridges a widget toolkit to the combining pipeline in `uirec-core`:
//!
//! - [`tree::WidgetTree`] abstracts the host's widget hierarchy
//! - [`address::address_of`] computes stable, cycle-safe widget addresses
//! - [`recorder::EventRecorder`] filters raw input, detects probe gestures
//!   and feeds the handler chain
//! - [`storage::SessionStorage`] persists finished sessions as JSON lines

pub mod address;
pub mod arena;
pub mod config;
pub mod probe;
pub mod recorder;
pub mod storage;
pub mod tree;

pub use address::address_of;
pub use arena::{WidgetArena, WidgetId, WidgetSpec};
pub use config::RecorderConfig;
pub use probe::{probe_ancestors, standard_probe};
pub use recorder::{is_recordable, key_codes, EventRecorder, RawInput};
pub use storage::{RecordedSession, SessionStorage};
pub use tree::{Capabilities, WidgetRole, WidgetTree};

pub mod prelude {
    pub use crate::address::address_of;
    pub use crate::arena::{WidgetArena, WidgetSpec};
    pub use crate::config::RecorderConfig;
    pub use crate::recorder::{EventRecorder, RawInput};
    pub use crate::storage::{RecordedSession, SessionStorage};
    pub use crate::tree::{Capabilities, WidgetRole, WidgetTree};
    pub use uirec_core::prelude::*;
}
