//! Application layer for roundtable
//!
//! This crate contains the conversation engine (registry, orchestrator and
//! autonomous loop), the event broadcaster, port definitions and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod error;
pub mod events;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BroadcastSettings, ConversationSettings};
pub use error::{ConversationError, ErrorKind};
pub use events::{EventBroadcaster, Subscription, SubscriptionId};
pub use ports::{
    conversation_archive::{ArchiveError, ConversationArchive, NoArchive},
    generation_gateway::{
        BackendStatus, GatewayError, GenerationGateway, GenerationRequest, StreamHandle,
    },
    memory_store::{MemoryError, MemoryStore},
    transcript_logger::{NoTranscriptLogger, TranscriptLogger, TranscriptRecord},
};
pub use use_cases::orchestrator::{ConversationOrchestrator, LoopExit, TurnOutcome};
pub use use_cases::registry::{ConversationRegistry, CreateConversation};
pub use use_cases::services::ConversationServices;
