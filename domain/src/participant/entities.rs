//! Participant entity

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A conversation participant (Entity)
///
/// Immutable once loaded into a [`ParticipantRegistry`](super::registry::ParticipantRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: String,
    name: String,
    persona: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    personality: Option<String>,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl Participant {
    /// Create an active participant.
    ///
    /// Fails when the id or display name is blank.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        persona: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidParticipant(
                "participant id cannot be empty".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(DomainError::InvalidParticipant(format!(
                "participant '{}' has an empty name",
                id
            )));
        }
        Ok(Self {
            id,
            name,
            persona: persona.into(),
            description: None,
            personality: None,
            active: true,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Persona prompt appended to the conversation instructions.
    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn personality(&self) -> Option<&str> {
        self.personality.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_participant_is_active() {
        let p = Participant::new("socrates", "Socrates", "You ask questions.").unwrap();
        assert!(p.is_active());
        assert_eq!(p.to_string(), "Socrates (socrates)");
    }

    #[test]
    fn test_blank_id_rejected() {
        assert!(matches!(
            Participant::new(" ", "Nobody", ""),
            Err(DomainError::InvalidParticipant(_))
        ));
        assert!(Participant::new("x", "", "").is_err());
    }

    #[test]
    fn test_deserialize_defaults_active() {
        let p: Participant =
            serde_json::from_str(r#"{"id":"a","name":"A","persona":"p"}"#).unwrap();
        assert!(p.is_active());
        assert!(p.description().is_none());
    }
}
