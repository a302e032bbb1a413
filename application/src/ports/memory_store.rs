//! Memory store port
//!
//! Durable record of participant messages per conversation. The orchestrator
//! reads recent history from here when composing a prompt, so the store is
//! on the critical path of every turn.

use async_trait::async_trait;
use roundtable_domain::{MemoryEntry, keywords};
use thiserror::Error;

/// Errors that can occur while reading or writing memory
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt memory record for {conversation_id}: {reason}")]
    Corrupt {
        conversation_id: String,
        reason: String,
    },
}

impl From<std::io::Error> for MemoryError {
    fn from(error: std::io::Error) -> Self {
        MemoryError::Unavailable(error.to_string())
    }
}

/// Port for storing and recalling conversation messages.
///
/// Entries of one conversation are kept in insertion order. Writes to a
/// single conversation are serialized by the implementation; different
/// conversations never contend.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Append one entry.
    async fn store(&self, entry: MemoryEntry) -> Result<(), MemoryError>;

    /// The most recent `limit` entries (all when `None`), oldest first.
    async fn history(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryEntry>, MemoryError>;

    /// Like [`history`](Self::history) restricted to one participant.
    async fn participant_history(
        &self,
        conversation_id: &str,
        participant_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryEntry>, MemoryError>;

    /// Entries containing any word of `query`, most recent first.
    async fn relevant(
        &self,
        conversation_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError>;

    /// Forget everything about one conversation.
    async fn clear(&self, conversation_id: &str) -> Result<(), MemoryError>;

    /// Short backend identifier for logs.
    fn backend_name(&self) -> &'static str;
}

/// Keep the last `limit` entries of a chronological list.
pub fn recent_window(mut entries: Vec<MemoryEntry>, limit: Option<usize>) -> Vec<MemoryEntry> {
    if let Some(limit) = limit
        && entries.len() > limit
    {
        entries.drain(..entries.len() - limit);
    }
    entries
}

/// Keyword search over a chronological list, newest match first.
pub fn relevant_entries<'a>(
    entries: impl DoubleEndedIterator<Item = &'a MemoryEntry>,
    query: &str,
    limit: usize,
) -> Vec<MemoryEntry> {
    let words = keywords(query);
    if words.is_empty() {
        return Vec::new();
    }
    entries
        .rev()
        .filter(|entry| entry.matches_any(&words))
        .take(limit)
        .cloned()
        .collect()
}
