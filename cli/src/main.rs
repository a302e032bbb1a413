//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod bootstrap;
mod logging;

use anyhow::{Result, bail};
use clap::Parser;
use roundtable_application::{
    ConversationArchive, ConversationRegistry, CreateConversation, GenerationGateway, LoopExit,
};
use roundtable_infrastructure::{ConfigLoader, FileConfig};
use roundtable_presentation::{Cli, ConsoleFormatter, ConversationRepl, LiveView, LiveViewer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let _log_guard = logging::init(cli.verbose, cli.quiet, config.logging.directory.as_deref());
    info!("Starting roundtable");

    bootstrap::check_config(&config)?;
    let participants = bootstrap::participants(&config)?;

    if cli.list_participants {
        print!("{}", ConsoleFormatter::participants(&participants.list()));
        return Ok(());
    }

    if cli.archived {
        return list_archived(&config).await;
    }

    let gateway = bootstrap::gateway(&config)?;

    if cli.check_backend {
        let status = gateway.health_check().await?;
        println!("Backend: {}", status.backend);
        if status.models.is_empty() {
            println!("No models reported");
        } else {
            println!("Models:");
            for model in status.models {
                println!("  - {}", model);
            }
        }
        return Ok(());
    }

    let Some(topic) = cli.topic.clone() else {
        bail!("A topic is required. Use --list-participants to see who can join.");
    };
    if cli.participants.is_empty() {
        bail!("Seat at least one participant with -p <ID>. Use --list-participants to see them.");
    }

    let registry = bootstrap::registry(
        &config,
        Arc::clone(&participants),
        gateway,
        cli.streaming(),
        cli.manual,
    )
    .await?;

    let mut request = CreateConversation::new(topic, cli.participants.clone())
        .with_turn_limit(cli.turns.unwrap_or(config.conversation.default_turn_limit));
    if let Some(title) = &cli.title {
        request = request.with_title(title);
    }
    let conversation = registry.create(request).await?;
    let id = conversation.id().to_string();

    let roster = participants.resolve_roster(conversation.participant_ids())?;
    if !cli.quiet {
        println!("{}", ConsoleFormatter::header(&conversation, &roster));
    }
    let names = roster.iter().map(|p| p.name().to_string()).collect();
    let subscription = registry.broadcaster().subscribe_to(&id).await;
    let viewer = LiveViewer::new(LiveView::new(conversation, names), !cli.quiet).spawn(subscription);

    let Some(orchestrator) = registry.orchestrator(&id) else {
        bail!("conversation {} vanished before it started", id);
    };

    match registry.start(&id).await {
        Ok(_) if cli.manual => {
            ConversationRepl::new(registry.clone(), &id).run().await?;
        }
        Ok(_) => {
            let exit = tokio::select! {
                exit = orchestrator.wait_for_loop() => exit,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping conversation {}", id);
                    if let Err(e) = registry.stop(&id).await {
                        debug!("Stop after interrupt: {}", e);
                    }
                    orchestrator.wait_for_loop().await
                }
            };
            debug!("Loop exit: {:?}", exit);
            if exit == Some(LoopExit::Failed) {
                warn!("Conversation {} stopped after a failed turn", id);
            }
        }
        Err(e) => eprintln!("Error: {}", e),
    }

    finish(&registry, &id).await;
    if tokio::time::timeout(Duration::from_secs(2), viewer).await.is_err() {
        debug!("Viewer did not finish in time");
    }

    if !cli.quiet {
        print!("{}", ConsoleFormatter::summary(&orchestrator.snapshot()));
    }
    Ok(())
}

/// End the conversation if it is still registered, then anything else.
async fn finish(registry: &ConversationRegistry, id: &str) {
    if registry.end(id).await.is_some() {
        debug!("Ended conversation {}", id);
    }
    registry.shutdown().await;
}

async fn list_archived(config: &FileConfig) -> Result<()> {
    let archive = bootstrap::archive(config).await?;
    let conversations = archive.list().await?;
    if conversations.is_empty() {
        println!("No archived conversations in {}", archive.directory().display());
        return Ok(());
    }
    for conversation in conversations {
        println!("{}", ConsoleFormatter::conversation_line(&conversation));
    }
    Ok(())
}
