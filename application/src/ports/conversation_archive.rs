//! Conversation archive port
//!
//! Snapshots of conversations persisted outside the process, so finished
//! conversations can be listed and read back later.

use async_trait::async_trait;
use roundtable_domain::Conversation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait ConversationArchive: Send + Sync {
    /// Replace the stored snapshot of `conversation`.
    async fn save(&self, conversation: &Conversation) -> Result<(), ArchiveError>;

    async fn load(&self, conversation_id: &str) -> Result<Option<Conversation>, ArchiveError>;

    /// All archived conversations, newest first.
    async fn list(&self) -> Result<Vec<Conversation>, ArchiveError>;

    /// Returns whether a snapshot existed.
    async fn delete(&self, conversation_id: &str) -> Result<bool, ArchiveError>;
}

/// Archive that keeps nothing.
pub struct NoArchive;

#[async_trait]
impl ConversationArchive for NoArchive {
    async fn save(&self, _conversation: &Conversation) -> Result<(), ArchiveError> {
        Ok(())
    }

    async fn load(&self, _conversation_id: &str) -> Result<Option<Conversation>, ArchiveError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Conversation>, ArchiveError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _conversation_id: &str) -> Result<bool, ArchiveError> {
        Ok(false)
    }
}
