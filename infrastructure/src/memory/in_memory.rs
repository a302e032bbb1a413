//! Process-local memory store.

use super::Namespaces;
use async_trait::async_trait;
use roundtable_application::ports::memory_store::{recent_window, relevant_entries};
use roundtable_application::{MemoryError, MemoryStore};
use roundtable_domain::MemoryEntry;

pub struct InMemoryMemoryStore {
    namespaces: Namespaces<Vec<MemoryEntry>>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self {
            namespaces: Namespaces::new(),
        }
    }
}

impl Default for InMemoryMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn store(&self, entry: MemoryEntry) -> Result<(), MemoryError> {
        let namespace = self.namespaces.get(&entry.conversation_id);
        namespace.lock().await.push(entry);
        Ok(())
    }

    async fn history(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let namespace = self.namespaces.get(conversation_id);
        let entries = namespace.lock().await.clone();
        Ok(recent_window(entries, limit))
    }

    async fn participant_history(
        &self,
        conversation_id: &str,
        participant_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let namespace = self.namespaces.get(conversation_id);
        let own: Vec<MemoryEntry> = namespace
            .lock()
            .await
            .iter()
            .filter(|e| e.participant_id.as_deref() == Some(participant_id))
            .cloned()
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
        let entries = namespace.lock().await;
        Ok(relevant_entries(entries.iter(), query, limit))
    }

    async fn clear(&self, conversation_id: &str) -> Result<(), MemoryError> {
        let namespace = self.namespaces.get(conversation_id);
        namespace.lock().await.clear();
        self.namespaces.remove(conversation_id);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}
