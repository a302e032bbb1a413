//! Turn loop configuration from TOML (`[conversation]` section)

use crate::config::issue::ConfigIssue;
use roundtable_application::ConversationSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// # Example
///
/// ```toml
/// [conversation]
/// default_turn_limit = 10     # 0 = unlimited
/// turn_interval_secs = 2.0
/// context_window = 10         # 0 = whole history
/// streaming = true
/// generation_timeout_secs = 120
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConversationConfig {
    pub default_turn_limit: i64,
    pub turn_interval_secs: f64,
    pub context_window: usize,
    pub streaming: bool,
    pub generation_timeout_secs: u64,
}

impl Default for FileConversationConfig {
    fn default() -> Self {
        Self {
            default_turn_limit: 10,
            turn_interval_secs: 2.0,
            context_window: 10,
            streaming: true,
            generation_timeout_secs: 120,
        }
    }
}

impl FileConversationConfig {
    pub fn to_settings(&self) -> ConversationSettings {
        let interval = if self.turn_interval_secs.is_finite() && self.turn_interval_secs > 0.0 {
            Duration::from_secs_f64(self.turn_interval_secs)
        } else {
            Duration::ZERO
        };
        ConversationSettings::default()
            .with_turn_interval(interval)
            .with_context_window(self.context_window)
            .with_streaming(self.streaming)
            .with_generation_timeout(Duration::from_secs(self.generation_timeout_secs.max(1)))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if !self.turn_interval_secs.is_finite() || self.turn_interval_secs < 0.0 {
            issues.push(ConfigIssue::error(
                "conversation.turn_interval_secs",
                format!("must be a non-negative number, got {}", self.turn_interval_secs),
            ));
        }
        if self.generation_timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                "conversation.generation_timeout_secs",
                "0 is not a usable timeout, using 1 second",
            ));
        }
        issues
    }
}
