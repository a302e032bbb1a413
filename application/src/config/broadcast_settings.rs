//! Event fan-out settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Buffering and delivery bound for event subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastSettings {
    /// Events buffered per subscriber before delivery starts waiting.
    pub buffer: usize,
    /// How long `publish` waits on a full subscriber before dropping it.
    pub delivery_timeout: Duration,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self {
            buffer: 256,
            delivery_timeout: Duration::from_millis(250),
        }
    }
}

impl BroadcastSettings {
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        // mpsc channels panic on a zero capacity
        self.buffer = buffer.max(1);
        self
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }
}
