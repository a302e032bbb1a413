//! Event fan-out configuration from TOML (`[broadcast]` section)

use crate::config::issue::ConfigIssue;
use roundtable_application::BroadcastSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBroadcastConfig {
    /// Events buffered per subscriber.
    pub buffer: usize,
    /// How long a publish waits on a full subscriber before dropping it.
    pub delivery_timeout_ms: u64,
}

impl Default for FileBroadcastConfig {
    fn default() -> Self {
        let defaults = BroadcastSettings::default();
        Self {
            buffer: defaults.buffer,
            delivery_timeout_ms: defaults.delivery_timeout.as_millis() as u64,
        }
    }
}

impl FileBroadcastConfig {
    pub fn to_settings(&self) -> BroadcastSettings {
        BroadcastSettings::default()
            .with_buffer(self.buffer)
            .with_delivery_timeout(Duration::from_millis(self.delivery_timeout_ms))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.buffer == 0 {
            issues.push(ConfigIssue::warning("broadcast.buffer", "0 is raised to 1"));
        }
        issues
    }
}
