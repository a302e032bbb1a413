//! Events emitted by a conversation's orchestrator.
//!
//! [`ConversationEvent`]s are ephemeral: they are fanned out to live
//! subscribers and never persisted.

use super::entities::Message;
use super::status::ConversationStatus;
use serde::{Deserialize, Serialize};

/// A state change or message of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// A final message was appended to the log.
    MessageAppended {
        conversation_id: String,
        message: Message,
    },
    /// A message is still being generated; `message.content` holds
    /// everything received so far and `message.streaming` is true.
    StreamDelta {
        conversation_id: String,
        message: Message,
    },
    /// The lifecycle status changed.
    StatusChanged {
        conversation_id: String,
        from: ConversationStatus,
        to: ConversationStatus,
    },
}

impl ConversationEvent {
    pub fn message_appended(conversation_id: impl Into<String>, message: Message) -> Self {
        ConversationEvent::MessageAppended {
            conversation_id: conversation_id.into(),
            message,
        }
    }

    pub fn stream_delta(conversation_id: impl Into<String>, message: Message) -> Self {
        ConversationEvent::StreamDelta {
            conversation_id: conversation_id.into(),
            message,
        }
    }

    pub fn status_changed(
        conversation_id: impl Into<String>,
        from: ConversationStatus,
        to: ConversationStatus,
    ) -> Self {
        ConversationEvent::StatusChanged {
            conversation_id: conversation_id.into(),
            from,
            to,
        }
    }

    pub fn conversation_id(&self) -> &str {
        match self {
            ConversationEvent::MessageAppended {
                conversation_id, ..
            }
            | ConversationEvent::StreamDelta {
                conversation_id, ..
            }
            | ConversationEvent::StatusChanged {
                conversation_id, ..
            } => conversation_id,
        }
    }

    /// The carried message, for message and delta events.
    pub fn message(&self) -> Option<&Message> {
        match self {
            ConversationEvent::MessageAppended { message, .. }
            | ConversationEvent::StreamDelta { message, .. } => Some(message),
            ConversationEvent::StatusChanged { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConversationEvent::MessageAppended { .. } => "message_appended",
            ConversationEvent::StreamDelta { .. } => "stream_delta",
            ConversationEvent::StatusChanged { .. } => "status_changed",
        }
    }
}
