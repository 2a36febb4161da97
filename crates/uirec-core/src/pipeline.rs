//! Pipeline assembly: recorder → low-level → high-level → sink

use crate::handler::EventHandler;
use crate::high_level::HighLevelCombiner;
use crate::low_level::LowLevelCombiner;
use serde::{Deserialize, Serialize};

/// The full two-stage chain in front of `sink`
pub type Pipeline<S> = LowLevelCombiner<HighLevelCombiner<S>>;

/// A combining stage that can be bypassed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    LowLevel,
    HighLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub low_level: bool,
    pub high_level: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            low_level: true,
            high_level: true,
        }
    }
}

impl PipelineOptions {
    pub fn without(mut self, stage: Stage) -> Self {
        match stage {
            Stage::LowLevel => self.low_level = false,
            Stage::HighLevel => self.high_level = false,
        }
        self
    }
}

pub fn pipeline<S: EventHandler>(sink: S) -> Pipeline<S> {
    LowLevelCombiner::new(HighLevelCombiner::new(sink))
}

/// Build a chain with only the enabled stages
pub fn build<S: EventHandler + 'static>(sink: S, options: PipelineOptions) -> Box<dyn EventHandler> {
    tracing::debug!(?options, "building pipeline");
    match (options.low_level, options.high_level) {
        (true, true) => Box::new(pipeline(sink)),
        (true, false) => Box::new(LowLevelCombiner::new(sink)),
        (false, true) => Box::new(HighLevelCombiner::new(sink)),
        (false, false) => Box::new(sink),
    }
}
