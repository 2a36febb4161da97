//! Recorder configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uirec_core::PipelineOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Record mouse moves (coalesced by the low-level stage)
    pub record_mouse_moves: bool,
    /// Record resizes of top-level widgets
    pub record_resizes: bool,
    /// Alt/Ctrl + left click captures a widget value instead of clicking
    pub probe_enabled: bool,
    /// Drop key presses of bare Shift/Ctrl/Alt/Meta
    pub skip_modifier_keys: bool,
    pub low_level_combining: bool,
    pub high_level_combining: bool,
    /// Bound of the channel between input reader and pipeline
    pub channel_capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            record_mouse_moves: true,
            record_resizes: true,
            probe_enabled: true,
            skip_modifier_keys: true,
            low_level_combining: true,
            high_level_combining: true,
            channel_capacity: 10000,
        }
    }
}

impl RecorderConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        if config.channel_capacity == 0 {
            return Err(uirec_core::Error::config("channel_capacity must be at least 1").into());
        }
        Ok(config)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            low_level: self.low_level_combining,
            high_level: self.high_level_combining,
        }
    }
}
