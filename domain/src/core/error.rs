//! Domain error types

use crate::conversation::status::ConversationStatus;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("A conversation needs at least one participant")]
    EmptyRoster,

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Participant is not active: {0}")]
    InactiveParticipant(String),

    #[error("Topic cannot be empty")]
    EmptyTopic,

    #[error("Invalid participant definition: {0}")]
    InvalidParticipant(String),

    #[error("Invalid turn: {0}")]
    InvalidTurn(String),

    #[error("Cannot move conversation from {from} to {to}")]
    InvalidTransition {
        from: ConversationStatus,
        to: ConversationStatus,
    },
}

impl DomainError {
    /// Whether this error describes a malformed request rather than a
    /// lifecycle violation.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, DomainError::InvalidTransition { .. })
    }
}
