//! Wiring configuration into the conversation engine

use anyhow::{Context, Result, bail};
use roundtable_application::{
    ConversationArchive, ConversationRegistry, ConversationServices, EventBroadcaster,
    GenerationGateway, MemoryStore,
};
use roundtable_domain::ParticipantRegistry;
use roundtable_infrastructure::config::FileConfig;
use roundtable_infrastructure::{
    InMemoryMemoryStore, JsonFileConversationArchive, JsonlMemoryStore, JsonlTranscriptLogger,
    MemoryBackend, OpenAiCompatGateway, build_participant_registry,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Report config issues; fail on any error-level one.
pub fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("config: {}", issue);
    }
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.to_string())
        .collect();
    if !errors.is_empty() {
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(())
}

pub fn participants(config: &FileConfig) -> Result<Arc<ParticipantRegistry>> {
    Ok(Arc::new(build_participant_registry(config)?))
}

pub fn gateway(config: &FileConfig) -> Result<Arc<OpenAiCompatGateway>> {
    let (gateway_config, issues) = config.generation.to_gateway_config();
    for issue in issues {
        warn!("config: {}", issue);
    }
    info!(
        "Generation backend {} (model {})",
        gateway_config.base_url, gateway_config.model
    );
    Ok(Arc::new(OpenAiCompatGateway::new(gateway_config)?))
}

async fn memory(config: &FileConfig) -> Result<Arc<dyn MemoryStore>> {
    match config.memory.parse_backend().0 {
        Some(MemoryBackend::Jsonl) => {
            let directory = config.memory.resolved_directory();
            let store = JsonlMemoryStore::open(&directory)
                .await
                .with_context(|| format!("opening memory directory {}", directory.display()))?;
            Ok(Arc::new(store))
        }
        Some(MemoryBackend::InMemory) => Ok(Arc::new(InMemoryMemoryStore::default())),
        None => bail!("unknown memory backend '{}'", config.memory.backend),
    }
}

pub async fn archive(config: &FileConfig) -> Result<JsonFileConversationArchive> {
    let directory = config.archive.resolved_directory();
    JsonFileConversationArchive::open(&directory)
        .await
        .with_context(|| format!("opening archive directory {}", directory.display()))
}

/// Assemble the registry with every collaborator the config asks for.
pub async fn registry(
    config: &FileConfig,
    participants: Arc<ParticipantRegistry>,
    gateway: Arc<dyn GenerationGateway>,
    streaming: Option<bool>,
    manual: bool,
) -> Result<ConversationRegistry> {
    let mut settings = config.conversation.to_settings();
    if let Some(streaming) = streaming {
        settings = settings.with_streaming(streaming);
    }
    if manual {
        settings = settings.manual();
    }

    let memory = memory(config).await?;
    info!("Memory backend: {}", memory.backend_name());

    let broadcaster = Arc::new(EventBroadcaster::new(config.broadcast.to_settings()));
    let mut services = ConversationServices::new(participants, memory, gateway)
        .with_broadcaster(broadcaster)
        .with_settings(settings);

    if config.archive.enabled {
        let archive: Arc<dyn ConversationArchive> = Arc::new(archive(config).await?);
        services = services.with_archive(archive);
    }

    if config.logging.transcript {
        match JsonlTranscriptLogger::in_directory(config.logging.transcript_directory()) {
            Some(logger) => {
                info!("Transcript: {}", logger.path().display());
                services = services.with_transcript(Arc::new(logger));
            }
            None => warn!("Transcript logging disabled: could not open transcript file"),
        }
    }

    Ok(ConversationRegistry::new(services))
}
