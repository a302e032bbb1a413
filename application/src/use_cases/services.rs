//! Collaborators shared by every conversation of a registry.

use crate::config::ConversationSettings;
use crate::events::EventBroadcaster;
use crate::ports::conversation_archive::{ConversationArchive, NoArchive};
use crate::ports::generation_gateway::GenerationGateway;
use crate::ports::memory_store::MemoryStore;
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptLogger};
use roundtable_domain::{ParticipantRegistry, RoundRobinScheduler, TurnScheduler};
use std::sync::Arc;

/// Injected dependencies of the conversation engine.
///
/// Archive, transcript logger, scheduler and broadcaster have inert or
/// default implementations; the participant registry, memory store and
/// generation gateway must be supplied.
#[derive(Clone)]
pub struct ConversationServices {
    pub participants: Arc<ParticipantRegistry>,
    pub memory: Arc<dyn MemoryStore>,
    pub gateway: Arc<dyn GenerationGateway>,
    pub broadcaster: Arc<EventBroadcaster>,
    pub scheduler: Arc<dyn TurnScheduler>,
    pub archive: Arc<dyn ConversationArchive>,
    pub transcript: Arc<dyn TranscriptLogger>,
    pub settings: ConversationSettings,
}

impl ConversationServices {
    pub fn new(
        participants: Arc<ParticipantRegistry>,
        memory: Arc<dyn MemoryStore>,
        gateway: Arc<dyn GenerationGateway>,
    ) -> Self {
        Self {
            participants,
            memory,
            gateway,
            broadcaster: Arc::new(EventBroadcaster::default()),
            scheduler: Arc::new(RoundRobinScheduler),
            archive: Arc::new(NoArchive),
            transcript: Arc::new(NoTranscriptLogger),
            settings: ConversationSettings::default(),
        }
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<EventBroadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn TurnScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_archive(mut self, archive: Arc<dyn ConversationArchive>) -> Self {
        self.archive = archive;
        self
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptLogger>) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn with_settings(mut self, settings: ConversationSettings) -> Self {
        self.settings = settings;
        self
    }
}
