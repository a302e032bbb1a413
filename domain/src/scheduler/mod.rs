//! Turn scheduling policy.
//!
//! A [`TurnScheduler`] decides who speaks next. Policies are pure functions
//! of the conversation state, so the orchestrator can swap them without
//! changing anything else.

use crate::conversation::entities::Conversation;

/// Picks the next speaker of a conversation.
pub trait TurnScheduler: Send + Sync {
    /// Participant id of the next speaker.
    ///
    /// Conversations always have a non-empty roster, so a policy never
    /// has to fail.
    fn next_speaker<'a>(&self, conversation: &'a Conversation) -> &'a str;

    fn name(&self) -> &'static str;
}

/// `participant_ids[current_turn mod len]`
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinScheduler;

impl TurnScheduler for RoundRobinScheduler {
    fn next_speaker<'a>(&self, conversation: &'a Conversation) -> &'a str {
        let roster = conversation.participant_ids();
        let index = conversation.current_turn() as usize % roster.len();
        &roster[index]
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}
