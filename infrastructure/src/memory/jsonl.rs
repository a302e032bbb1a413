//! File-backed memory store: `<directory>/<conversation id>.jsonl`.

use super::Namespaces;
use crate::file_names::escape_id;
use async_trait::async_trait;
use roundtable_application::ports::memory_store::{recent_window, relevant_entries};
use roundtable_application::{MemoryError, MemoryStore};
use roundtable_domain::MemoryEntry;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub struct JsonlMemoryStore {
    directory: PathBuf,
    namespaces: Namespaces<()>,
}

impl JsonlMemoryStore {
    /// Creates `directory` if needed.
    pub async fn open(directory: impl Into<PathBuf>) -> Result<Self, MemoryError> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await?;
        debug!("Memory store at {}", directory.display());
        Ok(Self {
            directory,
            namespaces: Namespaces::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_for(&self, conversation_id: &str) -> PathBuf {
        self.directory
            .join(format!("{}.jsonl", escape_id(conversation_id)))
    }

    /// Every entry of a conversation, in append order.
    async fn read_all(&self, conversation_id: &str) -> Result<Vec<MemoryEntry>, MemoryError> {
        let content = match tokio::fs::read_to_string(self.file_for(conversation_id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| MemoryError::Corrupt {
                    conversation_id: conversation_id.to_string(),
                    reason: format!("line {}: {}", n + 1, e),
                })
            })
            .collect()
    }
}

#[async_trait]
impl MemoryStore for JsonlMemoryStore {
    async fn store(&self, entry: MemoryEntry) -> Result<(), MemoryError> {
        let mut line = serde_json::to_string(&entry)
            .map_err(|e| MemoryError::Unavailable(e.to_string()))?;
        line.push('\n');

        let namespace = self.namespaces.get(&entry.conversation_id);
        let _guard = namespace.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(&entry.conversation_id))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn history(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let namespace = self.namespaces.get(conversation_id);
        let _guard = namespace.lock().await;
        Ok(recent_window(self.read_all(conversation_id).await?, limit))
    }

    async fn participant_history(
        &self,
        conversation_id: &str,
        participant_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let namespace = self.namespaces.get(conversation_id);
        let _guard = namespace.lock().await;
        let own = self
            .read_all(conversation_id)
            .await?
            .into_iter()
            .filter(|e| e.participant_id.as_deref() == Some(participant_id))
            .collect();
        Ok(recent_window(own, limit))
    }

    async fn relevant(
        &self,
        conversation_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let namespace = self.namespaces.get(conversation_id);
        let _guard = namespace.lock().await;
        let entries = self.read_all(conversation_id).await?;
        Ok(relevant_entries(entries.iter(), query, limit))
    }

    async fn clear(&self, conversation_id: &str) -> Result<(), MemoryError> {
        let namespace = self.namespaces.get(conversation_id);
        let _guard = namespace.lock().await;
        match tokio::fs::remove_file(self.file_for(conversation_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "jsonl"
    }
}
