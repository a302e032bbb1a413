//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout one to one. Conversion into
//! runtime settings happens through each section's `to_*` method so that
//! parsing problems surface as [`ConfigIssue`]s instead of load failures.

mod archive;
mod broadcast;
mod conversation;
mod generation;
mod logging;
mod memory;
mod participants;

pub use archive::FileArchiveConfig;
pub use broadcast::FileBroadcastConfig;
pub use conversation::FileConversationConfig;
pub use generation::FileGenerationConfig;
pub use logging::FileLoggingConfig;
pub use memory::{FileMemoryConfig, MemoryBackend};
pub use participants::FileParticipantConfig;

use super::issue::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub conversation: FileConversationConfig,
    pub generation: FileGenerationConfig,
    pub memory: FileMemoryConfig,
    pub broadcast: FileBroadcastConfig,
    pub archive: FileArchiveConfig,
    pub logging: FileLoggingConfig,
    /// JSON participants file (`{"agents": {...}}`), replaces the built-in set.
    pub participants_file: Option<PathBuf>,
    /// Inline participants, added on top of the file or built-in set.
    pub participants: Vec<FileParticipantConfig>,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.conversation.validate());
        issues.extend(self.generation.validate());
        issues.extend(self.memory.parse_backend().1);
        issues.extend(self.broadcast.validate());

        let mut seen = HashSet::new();
        for participant in &self.participants {
            if !seen.insert(participant.id.as_str()) {
                issues.push(ConfigIssue::error(
                    "participants",
                    format!("participant '{}' is defined twice", participant.id),
                ));
            }
            if let Err(e) = participant.to_participant() {
                issues.push(ConfigIssue::error("participants", e.to_string()));
            }
        }

        if let Some(path) = &self.participants_file
            && !path.exists()
        {
            issues.push(ConfigIssue::error(
                "participants_file",
                format!("{} does not exist", path.display()),
            ));
        }

        issues
    }
}
