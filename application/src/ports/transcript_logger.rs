//! Port for structured transcript logging.
//!
//! Records lifecycle changes, generated messages and generation metrics as
//! machine-readable records (JSONL). This is separate from `tracing`-based
//! operation logs, which carry human-readable diagnostics.

use serde_json::Value;

/// A structured transcript record.
pub struct TranscriptRecord {
    /// Record type identifier (e.g., "message", "status_changed", "generation").
    pub event_type: &'static str,
    /// JSON payload with record-specific data.
    pub payload: Value,
}

impl TranscriptRecord {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging transcript records.
///
/// The `log` method is synchronous and non-fallible so it can never
/// interrupt a turn; implementations swallow their own write failures.
pub trait TranscriptLogger: Send + Sync {
    fn log(&self, record: TranscriptRecord);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoTranscriptLogger;

impl TranscriptLogger for NoTranscriptLogger {
    fn log(&self, _record: TranscriptRecord) {}
}
