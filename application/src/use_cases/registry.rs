//! Conversation registry
//!
//! Process-wide table of live conversations. Exclusive access is only taken
//! to insert or remove an entry; control operations on one conversation go
//! through its [`ConversationOrchestrator`] and never block the others.

use crate::error::ConversationError;
use crate::events::EventBroadcaster;
use crate::ports::transcript_logger::TranscriptRecord;
use crate::use_cases::orchestrator::{ConversationOrchestrator, LoopExit, TurnOutcome};
use crate::use_cases::services::ConversationServices;
use chrono::Utc;
use roundtable_domain::{Conversation, ConversationStatus, ParticipantRegistry};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Process-wide sequence so ids stay unique within one second.
static SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Parameters of [`ConversationRegistry::create`].
#[derive(Debug, Clone)]
pub struct CreateConversation {
    pub topic: String,
    pub participant_ids: Vec<String>,
    /// `<= 0` means unlimited.
    pub turn_limit: i64,
    pub title: Option<String>,
}

impl CreateConversation {
    pub fn new(topic: impl Into<String>, participant_ids: Vec<String>) -> Self {
        Self {
            topic: topic.into(),
            participant_ids,
            turn_limit: 0,
            title: None,
        }
    }

    pub fn with_turn_limit(mut self, turn_limit: i64) -> Self {
        self.turn_limit = turn_limit;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Cheap to clone; clones share the same table.
#[derive(Clone)]
pub struct ConversationRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    services: Arc<ConversationServices>,
    conversations: RwLock<HashMap<String, Arc<ConversationOrchestrator>>>,
}

impl ConversationRegistry {
    pub fn new(services: ConversationServices) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                services: Arc::new(services),
                conversations: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn services(&self) -> &ConversationServices {
        &self.inner.services
    }

    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.inner.services.broadcaster
    }

    pub fn participants(&self) -> &ParticipantRegistry {
        &self.inner.services.participants
    }

    /// Create an idle conversation.
    pub async fn create(&self, request: CreateConversation) -> Result<Conversation, ConversationError> {
        self.participants()
            .resolve_roster(&request.participant_ids)?;

        let id = next_conversation_id();
        let mut conversation = Conversation::new(
            &id,
            request.topic,
            request.participant_ids,
            request.turn_limit,
        )?;
        if let Some(title) = request.title {
            conversation = conversation.with_title(title);
        }

        let services = &self.inner.services;
        let orchestrator = Arc::new(ConversationOrchestrator::new(
            conversation.clone(),
            Arc::clone(services),
        ));
        self.inner
            .write_table()
            .insert(id.clone(), orchestrator);

        info!(
            "Created conversation {} with {} participants ({} turns)",
            id,
            conversation.participant_ids().len(),
            conversation.turn_budget()
        );
        services.transcript.log(TranscriptRecord::new(
            "conversation_created",
            json!({
                "conversation_id": id,
                "topic": conversation.topic(),
                "title": conversation.title(),
                "participants": conversation.participant_ids(),
                "turn_limit": conversation.turn_limit(),
            }),
        ));
        if let Err(e) = services.archive.save(&conversation).await {
            warn!("Failed to archive conversation {}: {}", id, e);
        }
        Ok(conversation)
    }

    /// Activate, produce the first message, then keep talking in the background.
    ///
    /// Fails with `GenerationFailed` when the first message cannot be
    /// produced; the conversation is then in `error`.
    pub async fn start(&self, id: &str) -> Result<Conversation, ConversationError> {
        let orchestrator = self.require(id)?;
        orchestrator.activate().await?;

        match orchestrator.run_turn().await {
            Ok(TurnOutcome::Completed { .. }) => {}
            Ok(TurnOutcome::LimitReached) => {
                self.end(id).await;
            }
            // Stopped or ended while the first message was generated.
            Err(ConversationError::InvalidState { .. }) => return Ok(orchestrator.snapshot()),
            Err(e) => return Err(e),
        }

        if orchestrator.status() == ConversationStatus::Active {
            if orchestrator.turn_limit_reached() {
                self.end(id).await;
            } else if self.inner.services.settings.autonomous {
                let registry = self.clone();
                let driven = Arc::clone(&orchestrator);
                let handle = tokio::spawn(async move { registry.drive(driven).await });
                orchestrator.attach_loop(handle);
            }
        }
        Ok(orchestrator.snapshot())
    }

    /// One manual turn.
    ///
    /// Returns `false` when the turn limit was already met, in which case
    /// the conversation is ended.
    pub async fn continue_conversation(&self, id: &str) -> Result<bool, ConversationError> {
        let orchestrator = self.require(id)?;
        match orchestrator.run_turn().await? {
            TurnOutcome::Completed { .. } => Ok(true),
            TurnOutcome::LimitReached => {
                self.end(id).await;
                Ok(false)
            }
        }
    }

    pub async fn stop(&self, id: &str) -> Result<Conversation, ConversationError> {
        self.require(id)?.stop().await
    }

    /// End and forget a conversation.
    ///
    /// Subscribers see `ended` while the conversation is still registered;
    /// it is removed afterwards. Returns the final snapshot, or `None` if it
    /// was not registered or is already ending.
    pub async fn end(&self, id: &str) -> Option<Conversation> {
        let orchestrator = self.orchestrator(id)?;
        let snapshot = orchestrator.finish().await?;
        self.inner.write_table().remove(id);
        self.inner.services.transcript.log(TranscriptRecord::new(
            "conversation_ended",
            json!({
                "conversation_id": id,
                "turns": snapshot.current_turn(),
                "messages": snapshot.messages().len(),
            }),
        ));
        Some(snapshot)
    }

    /// Drop a conversation together with its memory and archive.
    ///
    /// A turn in flight completes first; no turn runs after the memory is
    /// cleared. Returns `false` if it was not registered.
    pub async fn delete(&self, id: &str) -> Result<bool, ConversationError> {
        let Some(orchestrator) = self.orchestrator(id) else {
            return Ok(false);
        };
        let services = &self.inner.services;
        let _retired = orchestrator.retire().await;
        services.memory.clear(id).await?;
        if let Err(e) = services.archive.delete(id).await {
            warn!("Failed to delete archive of {}: {}", id, e);
        }
        self.inner.write_table().remove(id);
        info!("Deleted conversation {}", id);
        Ok(true)
    }

    pub async fn set_turn_limit(&self, id: &str, turn_limit: i64) -> Result<Conversation, ConversationError> {
        self.require(id)?.set_turn_limit(turn_limit).await
    }

    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.orchestrator(id).map(|o| o.snapshot())
    }

    /// Snapshots of every registered conversation, oldest first.
    pub fn list(&self) -> Vec<Conversation> {
        let mut conversations: Vec<Conversation> = self
            .inner
            .read_table()
            .values()
            .map(|o| o.snapshot())
            .collect();
        conversations.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        conversations
    }

    pub fn orchestrator(&self, id: &str) -> Option<Arc<ConversationOrchestrator>> {
        self.inner.read_table().get(id).cloned()
    }

    /// End every registered conversation.
    pub async fn shutdown(&self) {
        let ids: Vec<String> = self.inner.read_table().keys().cloned().collect();
        for id in ids {
            self.end(&id).await;
        }
    }

    fn require(&self, id: &str) -> Result<Arc<ConversationOrchestrator>, ConversationError> {
        self.orchestrator(id)
            .ok_or_else(|| ConversationError::NotFound(id.to_string()))
    }

    /// Autonomous loop: a pause, one turn, repeat until told otherwise.
    ///
    /// `start` has already produced the first message, so every iteration
    /// begins with the inter-turn pause. Cancellation cuts the pause short.
    async fn drive(&self, orchestrator: Arc<ConversationOrchestrator>) -> LoopExit {
        let cancel = orchestrator.cancellation_token();
        let interval = self.inner.services.settings.turn_interval;
        let id = orchestrator.id().to_string();
        debug!("Loop of {} running every {:?}", id, interval);

        let exit = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    break LoopExit::from_status(orchestrator.status());
                }
                _ = tokio::time::sleep(interval) => {}
            }

            match orchestrator.run_turn().await {
                Ok(TurnOutcome::Completed { .. }) => {
                    if orchestrator.turn_limit_reached() {
                        self.end(&id).await;
                        break LoopExit::LimitReached;
                    }
                }
                Ok(TurnOutcome::LimitReached) => {
                    self.end(&id).await;
                    break LoopExit::LimitReached;
                }
                Err(ConversationError::InvalidState { status, .. }) => {
                    break LoopExit::from_status(status);
                }
                // Deleted while waiting for the turn.
                Err(ConversationError::NotFound(_)) => break LoopExit::Cancelled,
                Err(_) => break LoopExit::Failed,
            }
        };

        debug!("Loop of {} exited: {:?}", id, exit);
        exit
    }
}

impl RegistryInner {
    fn read_table(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<ConversationOrchestrator>>> {
        self.conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<ConversationOrchestrator>>> {
        self.conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// `conv_<YYYYmmdd_HHMMSS>_<seq>`
fn next_conversation_id() -> String {
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("conv_{}_{}", Utc::now().format("%Y%m%d_%H%M%S"), sequence)
}
