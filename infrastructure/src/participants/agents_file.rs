//! JSON participants file
//!
//! ```json
//! {
//!   "agents": {
//!     "philosopher": {
//!       "name": "Sophia",
//!       "personality": "philosopher",
//!       "description": "Questions assumptions",
//!       "system_prompt": "You are Sophia, a philosopher..."
//!     }
//!   }
//! }
//! ```

use crate::config::ConfigError;
use roundtable_domain::Participant;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct AgentsFile {
    agents: BTreeMap<String, AgentEntry>,
}

#[derive(Debug, Deserialize)]
struct AgentEntry {
    name: String,
    system_prompt: String,
    #[serde(default)]
    personality: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_active")]
    is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Participants of an agents file, ordered by id.
pub fn load_agents_file(path: &Path) -> Result<Vec<Participant>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParticipantsFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_agents(&content).map_err(|reason| ConfigError::ParticipantsFile {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_agents(content: &str) -> Result<Vec<Participant>, String> {
    let file: AgentsFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
    file.agents
        .into_iter()
        .map(|(id, entry)| {
            let mut participant =
                Participant::new(id, entry.name, entry.system_prompt).map_err(|e| e.to_string())?;
            if let Some(personality) = entry.personality {
                participant = participant.with_personality(personality);
            }
            if let Some(description) = entry.description {
                participant = participant.with_description(description);
            }
            if !entry.is_active {
                participant = participant.inactive();
            }
            Ok(participant)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "agents": {
            "scientist": {
                "name": "Marie",
                "personality": "scientist",
                "description": "Evidence first",
                "system_prompt": "You are Marie."
            },
            "artist": {
                "name": "Frida",
                "system_prompt": "You are Frida.",
                "is_active": false
            }
        }
    }"#;

    #[test]
    fn test_parse_agents() {
        let participants = parse_agents(SAMPLE).unwrap();
        assert_eq!(participants.len(), 2);
        assert_eq!(participants[0].id(), "artist");
        assert!(!participants[0].is_active());
        assert_eq!(participants[1].name(), "Marie");
        assert_eq!(participants[1].description(), Some("Evidence first"));
        assert_eq!(participants[1].persona(), "You are Marie.");
    }

    #[test]
    fn test_missing_agents_key() {
        assert!(parse_agents(r#"{"participants": {}}"#).is_err());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let err = parse_agents(r#"{"agents": {"x": {"name": " ", "system_prompt": "p"}}}"#)
            .unwrap_err();
        assert!(err.contains("empty name"));
    }

    #[test]
    fn test_load_agents_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let participants = load_agents_file(file.path()).unwrap();
        assert_eq!(participants.len(), 2);

        let missing = load_agents_file(Path::new("/no/such/agents.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::ParticipantsFile { .. }));
    }
}
