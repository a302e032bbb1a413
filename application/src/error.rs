//! Errors reported by conversation control operations.

use crate::ports::generation_gateway::GatewayError;
use crate::ports::memory_store::MemoryError;
use roundtable_domain::{ConversationStatus, DomainError};
use thiserror::Error;

/// Coarse classification of a [`ConversationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    InvalidState,
    GenerationFailed,
    StorageUnavailable,
}

/// Errors that can occur while creating or driving a conversation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("Cannot {operation} conversation {id} while it is {status}")]
    InvalidState {
        id: String,
        operation: &'static str,
        status: ConversationStatus,
    },

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ConversationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversationError::InvalidInput(_) => ErrorKind::InvalidInput,
            ConversationError::NotFound(_) => ErrorKind::NotFound,
            ConversationError::InvalidState { .. } => ErrorKind::InvalidState,
            ConversationError::GenerationFailed(_) => ErrorKind::GenerationFailed,
            ConversationError::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
        }
    }

    pub fn invalid_state(
        id: impl Into<String>,
        operation: &'static str,
        status: ConversationStatus,
    ) -> Self {
        ConversationError::InvalidState {
            id: id.into(),
            operation,
            status,
        }
    }

    /// Whether the failure ended the conversation (turn-level failures).
    pub fn is_turn_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::GenerationFailed | ErrorKind::StorageUnavailable
        )
    }
}

impl From<GatewayError> for ConversationError {
    fn from(error: GatewayError) -> Self {
        ConversationError::GenerationFailed(error.to_string())
    }
}

impl From<MemoryError> for ConversationError {
    fn from(error: MemoryError) -> Self {
        ConversationError::StorageUnavailable(error.to_string())
    }
}

impl From<DomainError> for ConversationError {
    fn from(error: DomainError) -> Self {
        ConversationError::InvalidInput(error.to_string())
    }
}
