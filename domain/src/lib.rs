//! Domain layer for roundtable
//!
//! This crate contains the core entities, value objects and policies of a
//! multi-party synthetic conversation. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Participant**: a named persona taking part in conversations
//! - **Conversation**: the aggregate holding roster, turn counter, lifecycle
//!   status and the append-only message log
//! - **Turn**: one participant's completed contribution
//! - **Scheduler**: the policy choosing who speaks next

pub mod conversation;
pub mod core;
pub mod generation;
pub mod memory;
pub mod participant;
pub mod prompt;
pub mod scheduler;

// Re-export commonly used types
pub use conversation::{
    entities::{Conversation, Message, SYSTEM_SPEAKER},
    event::ConversationEvent,
    status::ConversationStatus,
};
pub use crate::core::{
    error::DomainError,
    string::{keywords, truncate},
};
pub use generation::stream::StreamEvent;
pub use memory::entities::{DEFAULT_IMPORTANCE, MemoryEntry};
pub use participant::{entities::Participant, registry::ParticipantRegistry};
pub use prompt::{ConversationPromptTemplate, TranscriptLine};
pub use scheduler::{RoundRobinScheduler, TurnScheduler};
