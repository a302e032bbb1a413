//! Inline participant definitions from TOML (`[[participants]]`)

use roundtable_domain::{DomainError, Participant};
use serde::{Deserialize, Serialize};

/// ```toml
/// [[participants]]
/// id = "ada"
/// name = "Ada"
/// persona = "You are Ada Lovelace. Think in terms of engines and patterns."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileParticipantConfig {
    pub id: String,
    pub name: String,
    #[serde(alias = "system_prompt")]
    pub persona: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl FileParticipantConfig {
    pub fn to_participant(&self) -> Result<Participant, DomainError> {
        let mut participant = Participant::new(&self.id, &self.name, &self.persona)?;
        if let Some(description) = &self.description {
            participant = participant.with_description(description);
        }
        if let Some(personality) = &self.personality {
            participant = participant.with_personality(personality);
        }
        if !self.active {
            participant = participant.inactive();
        }
        Ok(participant)
    }
}
