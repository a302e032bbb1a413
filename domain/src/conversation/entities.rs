//! Conversation domain entities

use super::status::ConversationStatus;
use crate::core::error::DomainError;
use crate::participant::entities::Participant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker label used for engine-generated control messages.
pub const SYSTEM_SPEAKER: &str = "System";

/// A single entry of a conversation log (Entity)
///
/// `participant_id` is `None` for system messages. A message with
/// `streaming == true` is a partial rendering that only travels inside
/// stream-delta events; the log only ever holds final messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub turn_number: u32,
    #[serde(default)]
    pub streaming: bool,
}

impl Message {
    pub fn system(content: impl Into<String>, turn_number: u32) -> Self {
        Self {
            speaker: SYSTEM_SPEAKER.to_string(),
            participant_id: None,
            content: content.into(),
            timestamp: Utc::now(),
            turn_number,
            streaming: false,
        }
    }

    /// A final message spoken by a participant.
    pub fn spoken(participant: &Participant, content: impl Into<String>, turn_number: u32) -> Self {
        Self {
            speaker: participant.name().to_string(),
            participant_id: Some(participant.id().to_string()),
            content: content.into(),
            timestamp: Utc::now(),
            turn_number,
            streaming: false,
        }
    }

    /// A partial rendering of a message still being generated.
    pub fn partial(participant: &Participant, content: impl Into<String>, turn_number: u32) -> Self {
        Self {
            streaming: true,
            ..Self::spoken(participant, content, turn_number)
        }
    }

    pub fn is_system(&self) -> bool {
        self.participant_id.is_none()
    }
}

/// A multi-party conversation (Aggregate root)
///
/// Serializes to the persisted snapshot form; a serialize/deserialize
/// round-trip reproduces an identical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    participant_ids: Vec<String>,
    /// `<= 0` means unlimited
    turn_limit: i64,
    current_turn: u32,
    status: ConversationStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ended_at: Option<DateTime<Utc>>,
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an idle conversation with an empty log.
    ///
    /// Only checks the shape of the request; whether the participant ids
    /// exist is the participant registry's concern.
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        participant_ids: Vec<String>,
        turn_limit: i64,
    ) -> Result<Self, DomainError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(DomainError::EmptyTopic);
        }
        if participant_ids.is_empty() {
            return Err(DomainError::EmptyRoster);
        }
        let now = Utc::now();
        Ok(Self {
            id: id.into(),
            topic,
            title: None,
            participant_ids,
            turn_limit,
            current_turn: 0,
            status: ConversationStatus::Idle,
            created_at: now,
            updated_at: now,
            ended_at: None,
            messages: Vec::new(),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn participant_ids(&self) -> &[String] {
        &self.participant_ids
    }

    pub fn turn_limit(&self) -> i64 {
        self.turn_limit
    }

    pub fn is_unlimited(&self) -> bool {
        self.turn_limit <= 0
    }

    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages spoken by participants.
    pub fn participant_message_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_system()).count()
    }

    /// Turn number the next participant message will carry.
    pub fn next_turn_number(&self) -> u32 {
        self.current_turn + 1
    }

    /// `turn_limit > 0 && current_turn >= turn_limit`
    pub fn turn_limit_reached(&self) -> bool {
        self.turn_limit > 0 && i64::from(self.current_turn) >= self.turn_limit
    }

    /// Move to `next`, returning the previous status.
    pub fn transition(
        &mut self,
        next: ConversationStatus,
    ) -> Result<ConversationStatus, DomainError> {
        let previous = self.status;
        if !previous.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: previous,
                to: next,
            });
        }
        self.status = next;
        self.touch();
        if next == ConversationStatus::Ended {
            self.ended_at = Some(self.updated_at);
        }
        Ok(previous)
    }

    /// Append a system message tagged with the last completed turn.
    pub fn append_system_message(&mut self, content: impl Into<String>) -> Message {
        let message = Message::system(content, self.current_turn);
        self.messages.push(message.clone());
        self.touch();
        message
    }

    /// Append a completed participant message and advance the turn counter.
    pub fn record_turn(&mut self, message: Message) -> Result<(), DomainError> {
        if message.is_system() {
            return Err(DomainError::InvalidTurn(
                "system messages do not count as turns".to_string(),
            ));
        }
        if message.streaming {
            return Err(DomainError::InvalidTurn(
                "a streaming message cannot complete a turn".to_string(),
            ));
        }
        if message.turn_number != self.next_turn_number() {
            return Err(DomainError::InvalidTurn(format!(
                "expected turn {}, got {}",
                self.next_turn_number(),
                message.turn_number
            )));
        }
        self.messages.push(message);
        self.current_turn += 1;
        self.touch();
        Ok(())
    }

    pub fn set_turn_limit(&mut self, turn_limit: i64) {
        self.turn_limit = turn_limit;
        self.touch();
    }

    /// Human readable turn budget, e.g. `3/10` or `3/unlimited`.
    pub fn turn_budget(&self) -> String {
        if self.is_unlimited() {
            format!("{}/unlimited", self.current_turn)
        } else {
            format!("{}/{}", self.current_turn, self.turn_limit)
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
