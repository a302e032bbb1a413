//! Conversation lifecycle state machine

use serde::{Deserialize, Serialize};

/// Lifecycle status of a conversation
///
/// ```text
/// idle ──► active ──► stopped ──► ended
///   │        ├──────► error ────► ended
///   │        └──────────────────► ended
///   └───────────────────────────► ended
/// ```
///
/// `stopped` and `error` accept no further turns; `ended` accepts nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// Created, not yet started
    Idle,
    /// Turns are being produced
    Active,
    /// Halted by an explicit stop
    Stopped,
    /// Finished and removed from the live registry
    Ended,
    /// Halted by a generation or storage failure
    Error,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Idle => "idle",
            ConversationStatus::Active => "active",
            ConversationStatus::Stopped => "stopped",
            ConversationStatus::Ended => "ended",
            ConversationStatus::Error => "error",
        }
    }

    /// Whether `next` is a legal successor of this status.
    pub fn can_transition_to(self, next: ConversationStatus) -> bool {
        use ConversationStatus::*;
        matches!(
            (self, next),
            (Idle, Active)
                | (Idle, Ended)
                | (Active, Stopped)
                | (Active, Ended)
                | (Active, Error)
                | (Stopped, Ended)
                | (Error, Ended)
        )
    }

    /// No further turns can be produced in this status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ConversationStatus::Stopped | ConversationStatus::Ended | ConversationStatus::Error
        )
    }

    pub fn accepts_turns(self) -> bool {
        self == ConversationStatus::Active
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(ConversationStatus::Idle),
            "active" => Ok(ConversationStatus::Active),
            "stopped" => Ok(ConversationStatus::Stopped),
            "ended" => Ok(ConversationStatus::Ended),
            "error" => Ok(ConversationStatus::Error),
            other => Err(format!("unknown conversation status: {}", other)),
        }
    }
}
