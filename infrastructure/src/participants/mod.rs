//! Participant catalog assembly
//!
//! The catalog is the agents file when one is configured, the built-in set
//! otherwise. Inline `[[participants]]` entries are layered on top and
//! replace catalog entries with the same id.

mod agents_file;
mod builtin;

pub use agents_file::load_agents_file;
pub use builtin::builtin_participants;

use crate::config::{ConfigError, FileConfig};
use roundtable_domain::{Participant, ParticipantRegistry};
use tracing::{debug, info};

pub fn build_participant_registry(config: &FileConfig) -> Result<ParticipantRegistry, ConfigError> {
    let mut participants = match &config.participants_file {
        Some(path) => {
            let loaded = load_agents_file(path)?;
            info!("Loaded {} participants from {}", loaded.len(), path.display());
            loaded
        }
        None => builtin_participants()
            .map_err(|e| ConfigError::InvalidParticipant(e.to_string()))?,
    };

    for inline in &config.participants {
        let participant = inline
            .to_participant()
            .map_err(|e| ConfigError::InvalidParticipant(e.to_string()))?;
        merge(&mut participants, participant);
    }

    ParticipantRegistry::new(participants)
        .map_err(|e| ConfigError::InvalidParticipant(e.to_string()))
}

fn merge(participants: &mut Vec<Participant>, participant: Participant) {
    match participants.iter_mut().find(|p| p.id() == participant.id()) {
        Some(existing) => {
            debug!("Inline participant {} replaces catalog entry", participant.id());
            *existing = participant;
        }
        None => participants.push(participant),
    }
}
