//! Prompt composition for conversation turns.

pub mod template;

pub use template::{ConversationPromptTemplate, TranscriptLine};
