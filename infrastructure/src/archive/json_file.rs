//! One pretty-printed JSON snapshot per conversation.
//!
//! Writes go to a temporary sibling first and are renamed into place, so
//! a crash never leaves a half-written snapshot behind.

use crate::file_names::escape_id;
use async_trait::async_trait;
use roundtable_application::{ArchiveError, ConversationArchive};
use roundtable_domain::Conversation;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct JsonFileConversationArchive {
    directory: PathBuf,
}

impl JsonFileConversationArchive {
    pub async fn open(directory: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, conversation_id: &str) -> PathBuf {
        self.directory
            .join(format!("{}.json", escape_id(conversation_id)))
    }

    async fn read(path: &Path) -> Result<Conversation, ArchiveError> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| ArchiveError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl ConversationArchive for JsonFileConversationArchive {
    async fn save(&self, conversation: &Conversation) -> Result<(), ArchiveError> {
        let json = serde_json::to_string_pretty(conversation)
            .map_err(|e| ArchiveError::Serialization(e.to_string()))?;
        let path = self.path_for(conversation.id());
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("Archived {} to {}", conversation.id(), path.display());
        Ok(())
    }

    async fn load(&self, conversation_id: &str) -> Result<Option<Conversation>, ArchiveError> {
        match Self::read(&self.path_for(conversation_id)).await {
            Ok(conversation) => Ok(Some(conversation)),
            Err(ArchiveError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list(&self) -> Result<Vec<Conversation>, ArchiveError> {
        let mut conversations = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read(&path).await {
                Ok(conversation) => conversations.push(conversation),
                Err(e) => warn!("Skipping unreadable snapshot {}: {}", path.display(), e),
            }
        }
        conversations.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(conversations)
    }

    async fn delete(&self, conversation_id: &str) -> Result<bool, ArchiveError> {
        match tokio::fs::remove_file(self.path_for(conversation_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
