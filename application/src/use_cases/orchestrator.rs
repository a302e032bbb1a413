//! Conversation orchestrator
//!
//! Drives one conversation: lifecycle transitions, turn execution and the
//! events each step emits. The registry owns one orchestrator per live
//! conversation and spawns the autonomous loop on top of it.
//!
//! Locking:
//! - `state` is a short-lived `RwLock` around the aggregate. It is never
//!   held across an await, so snapshots are always cheap and consistent.
//! - `turn_guard` serializes turns. A manual continue issued while the loop
//!   is mid-turn waits for that turn instead of racing it.
//! - `stop`/`finish` do not take `turn_guard`; they flip the status and
//!   cancel the loop token. A turn already in flight still lands in the log.
//! - `retire` does take `turn_guard`, and every turn that acquires it
//!   afterwards is refused, so nothing is written once deletion begins.

use crate::error::ConversationError;
use crate::ports::generation_gateway::GenerationRequest;
use crate::ports::transcript_logger::TranscriptRecord;
use crate::use_cases::services::ConversationServices;
use roundtable_domain::{
    Conversation, ConversationEvent, ConversationPromptTemplate, ConversationStatus, MemoryEntry,
    Message, Participant, StreamEvent, TranscriptLine,
};
use serde_json::json;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Result of asking for one more turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A participant message was appended with this turn number.
    Completed { turn: u32 },
    /// The turn limit was already met; nothing was generated.
    LimitReached,
}

/// Why the autonomous loop of a conversation returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    LimitReached,
    Stopped,
    Ended,
    Failed,
    Cancelled,
}

impl LoopExit {
    /// Exit reason implied by a status observed after cancellation.
    pub fn from_status(status: ConversationStatus) -> Self {
        match status {
            ConversationStatus::Stopped => LoopExit::Stopped,
            ConversationStatus::Ended => LoopExit::Ended,
            ConversationStatus::Error => LoopExit::Failed,
            ConversationStatus::Idle | ConversationStatus::Active => LoopExit::Cancelled,
        }
    }
}

pub struct ConversationOrchestrator {
    id: String,
    state: RwLock<Conversation>,
    turn_guard: tokio::sync::Mutex<()>,
    retired: AtomicBool,
    cancel: CancellationToken,
    loop_task: Mutex<Option<JoinHandle<LoopExit>>>,
    services: Arc<ConversationServices>,
}

impl ConversationOrchestrator {
    pub fn new(conversation: Conversation, services: Arc<ConversationServices>) -> Self {
        Self {
            id: conversation.id().to_string(),
            state: RwLock::new(conversation),
            turn_guard: tokio::sync::Mutex::new(()),
            retired: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            loop_task: Mutex::new(None),
            services,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Consistent copy of the conversation.
    pub fn snapshot(&self) -> Conversation {
        self.read_state().clone()
    }

    pub fn status(&self) -> ConversationStatus {
        self.read_state().status()
    }

    pub fn turn_limit_reached(&self) -> bool {
        self.read_state().turn_limit_reached()
    }

    /// Token observed by the autonomous loop.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Refuse further turns and wait for the one in flight.
    ///
    /// Holding the returned guard keeps turns out while the caller tears the
    /// conversation's storage down.
    pub async fn retire(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.retired.store(true, Ordering::SeqCst);
        self.cancel.cancel();
        self.turn_guard.lock().await
    }

    pub(crate) fn attach_loop(&self, handle: JoinHandle<LoopExit>) {
        let mut slot = self.loop_task.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(handle);
    }

    /// Wait for the autonomous loop to return.
    ///
    /// `None` when no loop was spawned or it was already awaited.
    pub async fn wait_for_loop(&self) -> Option<LoopExit> {
        let handle = self
            .loop_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        match handle.await {
            Ok(exit) => Some(exit),
            Err(e) => {
                warn!("Loop task of {} did not finish cleanly: {}", self.id, e);
                Some(LoopExit::Cancelled)
            }
        }
    }

    /// `idle → active`, announcing the topic.
    pub async fn activate(&self) -> Result<(), ConversationError> {
        let (from, message) = {
            let mut state = self.write_state();
            let from = state
                .transition(ConversationStatus::Active)
                .map_err(|_| self.invalid_state("start", state.status()))?;
            let notice = ConversationPromptTemplate::started_notice(state.topic());
            (from, state.append_system_message(notice))
        };

        info!("Conversation {} started", self.id);
        self.announce_status(from, ConversationStatus::Active).await;
        self.announce_message(message).await;
        self.archive().await;
        Ok(())
    }

    /// `active → stopped`. The loop notices at its next check.
    pub async fn stop(&self) -> Result<Conversation, ConversationError> {
        let (from, message) = {
            let mut state = self.write_state();
            let from = state
                .transition(ConversationStatus::Stopped)
                .map_err(|_| self.invalid_state("stop", state.status()))?;
            (
                from,
                state.append_system_message(ConversationPromptTemplate::stopped_notice()),
            )
        };
        self.cancel.cancel();

        info!("Conversation {} stopped", self.id);
        self.announce_status(from, ConversationStatus::Stopped).await;
        self.announce_message(message).await;
        self.archive().await;
        Ok(self.snapshot())
    }

    /// Move to `ended` from any other status.
    ///
    /// Returns the final snapshot once the `ended` status and notice have
    /// been published, or `None` if the conversation had already ended.
    pub async fn finish(&self) -> Option<Conversation> {
        let ended = {
            let mut state = self.write_state();
            match state.transition(ConversationStatus::Ended) {
                Ok(from) => Some((
                    from,
                    state.append_system_message(ConversationPromptTemplate::ended_notice()),
                )),
                Err(_) => None,
            }
        };
        self.cancel.cancel();

        let (from, message) = ended?;
        info!("Conversation {} ended", self.id);
        self.announce_status(from, ConversationStatus::Ended).await;
        self.announce_message(message).await;
        self.archive().await;
        Some(self.snapshot())
    }

    /// Replace the turn limit. Not allowed once ended.
    pub async fn set_turn_limit(&self, turn_limit: i64) -> Result<Conversation, ConversationError> {
        {
            let mut state = self.write_state();
            if state.status() == ConversationStatus::Ended {
                return Err(self.invalid_state("change the turn limit of", state.status()));
            }
            state.set_turn_limit(turn_limit);
        }
        debug!("Conversation {} turn limit set to {}", self.id, turn_limit);
        self.archive().await;
        Ok(self.snapshot())
    }

    /// Run exactly one turn.
    ///
    /// Turns are serialized; a caller arriving mid-turn waits. Generation or
    /// storage failures move an active conversation to `error` before the
    /// error is returned.
    pub async fn run_turn(&self) -> Result<TurnOutcome, ConversationError> {
        let _turn = self.turn_guard.lock().await;
        if self.retired.load(Ordering::SeqCst) {
            return Err(ConversationError::NotFound(self.id.clone()));
        }

        let (conversation, speaker_id) = {
            let state = self.read_state();
            if !state.status().accepts_turns() {
                return Err(self.invalid_state("continue", state.status()));
            }
            if state.turn_limit_reached() {
                return Ok(TurnOutcome::LimitReached);
            }
            let speaker = self.services.scheduler.next_speaker(&state).to_string();
            (state.clone(), speaker)
        };

        let Some(participant) = self.services.participants.get(&speaker_id).cloned() else {
            return Err(ConversationError::InvalidInput(format!(
                "scheduled speaker {} is not a known participant",
                speaker_id
            )));
        };

        match self.produce_message(&conversation, &participant).await {
            Ok(message) => {
                let turn = message.turn_number;
                {
                    let mut state = self.write_state();
                    state
                        .record_turn(message.clone())
                        .map_err(|_| self.invalid_state("record a turn of", state.status()))?;
                }
                debug!(
                    "Conversation {} turn {} by {}",
                    self.id,
                    turn,
                    participant.id()
                );
                self.services.transcript.log(TranscriptRecord::new(
                    "message",
                    json!({
                        "conversation_id": self.id,
                        "turn": turn,
                        "speaker": message.speaker,
                        "participant_id": participant.id(),
                        "content": message.content,
                    }),
                ));
                self.announce_message(message).await;
                self.archive().await;
                Ok(TurnOutcome::Completed { turn })
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    /// Generate, persist and return the next participant message.
    async fn produce_message(
        &self,
        conversation: &Conversation,
        participant: &Participant,
    ) -> Result<Message, ConversationError> {
        let settings = &self.services.settings;
        let turn_number = conversation.next_turn_number();

        let history = self
            .services
            .memory
            .history(conversation.id(), settings.history_limit())
            .await?;
        let request = self.compose_request(conversation, participant, &history);

        let started = Instant::now();
        let content = self.generate(&request, participant, turn_number).await?;
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(ConversationError::GenerationFailed(format!(
                "{} produced an empty message",
                participant.name()
            )));
        }

        self.services.transcript.log(TranscriptRecord::new(
            "generation",
            json!({
                "conversation_id": self.id,
                "turn": turn_number,
                "participant_id": participant.id(),
                "backend": self.services.gateway.name(),
                "streaming": settings.streaming,
                "latency_ms": started.elapsed().as_millis() as u64,
                "chars": content.chars().count(),
            }),
        ));

        let message = Message::spoken(participant, content, turn_number);
        let entry = MemoryEntry::new(conversation.id(), message.clone())
            .with_context("topic", conversation.topic())
            .with_context("turn", turn_number);
        self.services.memory.store(entry).await?;
        Ok(message)
    }

    fn compose_request(
        &self,
        conversation: &Conversation,
        participant: &Participant,
        history: &[MemoryEntry],
    ) -> GenerationRequest {
        let participants = &self.services.participants;
        let roster: Vec<&str> = conversation
            .participant_ids()
            .iter()
            .map(|id| participants.display_name(id))
            .collect();
        GenerationRequest::new(
            participant.name(),
            ConversationPromptTemplate::system_prompt(conversation, &roster, participant.persona()),
            TranscriptLine::from_messages(history.iter().map(|entry| &entry.message)),
        )
    }

    /// Ask the gateway for text, relaying stream fragments as they arrive.
    ///
    /// `generation_timeout` bounds the time spent waiting on the backend.
    /// Delivering fragments to slow subscribers is not charged to it.
    async fn generate(
        &self,
        request: &GenerationRequest,
        participant: &Participant,
        turn_number: u32,
    ) -> Result<String, ConversationError> {
        let gateway = &self.services.gateway;
        let limit = self.services.settings.generation_timeout;
        let timed_out = || {
            ConversationError::GenerationFailed(format!(
                "no reply from {} within {:?}",
                participant.name(),
                limit
            ))
        };
        let mut budget = limit;

        if !self.services.settings.streaming {
            let reply = within_budget(&mut budget, gateway.generate(request))
                .await
                .ok_or_else(timed_out)?;
            return Ok(reply?);
        }

        let mut handle = within_budget(&mut budget, gateway.generate_streaming(request))
            .await
            .ok_or_else(timed_out)??;
        let mut content = String::new();
        while let Some(event) = within_budget(&mut budget, handle.receiver.recv())
            .await
            .ok_or_else(timed_out)?
        {
            match event {
                StreamEvent::Delta(chunk) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    content.push_str(&chunk);
                    let partial = Message::partial(participant, content.clone(), turn_number);
                    self.services
                        .broadcaster
                        .publish(ConversationEvent::stream_delta(&self.id, partial))
                        .await;
                }
                StreamEvent::Completed(text) => {
                    return Ok(if text.is_empty() { content } else { text });
                }
                StreamEvent::Error(e) => return Err(ConversationError::GenerationFailed(e)),
            }
        }
        Err(ConversationError::GenerationFailed(
            "stream closed before the message completed".to_string(),
        ))
    }

    /// Record a turn failure. Only an active conversation moves to `error`.
    async fn fail(&self, cause: &ConversationError) {
        let failed = {
            let mut state = self.write_state();
            if state.status() == ConversationStatus::Active {
                state.transition(ConversationStatus::Error).ok().map(|from| {
                    let notice = ConversationPromptTemplate::failure_notice(&cause.to_string());
                    (from, state.append_system_message(notice))
                })
            } else {
                None
            }
        };

        match failed {
            Some((from, message)) => {
                error!("Conversation {} failed: {}", self.id, cause);
                self.cancel.cancel();
                self.announce_status(from, ConversationStatus::Error).await;
                self.announce_message(message).await;
                self.archive().await;
            }
            None => warn!(
                "Turn of {} failed after it left the active state: {}",
                self.id, cause
            ),
        }
    }

    async fn announce_status(&self, from: ConversationStatus, to: ConversationStatus) {
        self.services.transcript.log(TranscriptRecord::new(
            "status_changed",
            json!({ "conversation_id": self.id, "from": from, "to": to }),
        ));
        self.services
            .broadcaster
            .publish(ConversationEvent::status_changed(&self.id, from, to))
            .await;
    }

    async fn announce_message(&self, message: Message) {
        self.services
            .broadcaster
            .publish(ConversationEvent::message_appended(&self.id, message))
            .await;
    }

    async fn archive(&self) {
        let snapshot = self.snapshot();
        if let Err(e) = self.services.archive.save(&snapshot).await {
            warn!("Failed to archive conversation {}: {}", self.id, e);
        }
    }

    fn invalid_state(&self, operation: &'static str, status: ConversationStatus) -> ConversationError {
        ConversationError::invalid_state(&self.id, operation, status)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Conversation> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Conversation> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Await `future` for at most `budget`, then deduct the time it took.
async fn within_budget<F: Future>(budget: &mut Duration, future: F) -> Option<F::Output> {
    let started = Instant::now();
    let output = tokio::time::timeout(*budget, future).await.ok();
    *budget = budget.saturating_sub(started.elapsed());
    output
}
