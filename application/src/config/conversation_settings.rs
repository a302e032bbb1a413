//! Conversation settings: turn loop control.
//!
//! [`ConversationSettings`] groups the static parameters that control how
//! an orchestrator runs turns. These are application-layer concerns, not
//! domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Turn loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSettings {
    /// Pause between two autonomous turns.
    pub turn_interval: Duration,
    /// Number of most recent messages shown to the backend (0 = all).
    pub context_window: usize,
    /// Stream partial output as it is generated.
    pub streaming: bool,
    /// Upper bound for one generation call, stream consumption included.
    pub generation_timeout: Duration,
    /// Keep talking after the first message without being asked.
    pub autonomous: bool,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            turn_interval: Duration::from_secs(2),
            context_window: 10,
            streaming: true,
            generation_timeout: Duration::from_secs(120),
            autonomous: true,
        }
    }
}

impl ConversationSettings {
    // ==================== Builder Methods ====================

    pub fn with_turn_interval(mut self, interval: Duration) -> Self {
        self.turn_interval = interval;
        self
    }

    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Only advance on explicit continue requests.
    pub fn manual(mut self) -> Self {
        self.autonomous = false;
        self
    }

    /// Context window as a history limit (`None` = unbounded).
    pub fn history_limit(&self) -> Option<usize> {
        (self.context_window > 0).then_some(self.context_window)
    }
}
