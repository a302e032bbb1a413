//! Memory store configuration from TOML (`[memory]` section)

use crate::config::issue::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryBackend {
    #[default]
    InMemory,
    Jsonl,
}

impl std::str::FromStr for MemoryBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "in_memory" | "memory" => Ok(MemoryBackend::InMemory),
            "jsonl" | "file" => Ok(MemoryBackend::Jsonl),
            other => Err(format!("unknown memory backend '{}'", other)),
        }
    }
}

/// ```toml
/// [memory]
/// backend = "jsonl"          # or "in_memory"
/// directory = "./memory"     # jsonl only
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    pub backend: String,
    pub directory: Option<PathBuf>,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            directory: None,
        }
    }
}

impl FileMemoryConfig {
    pub fn parse_backend(&self) -> (Option<MemoryBackend>, Vec<ConfigIssue>) {
        match self.backend.parse() {
            Ok(backend) => (Some(backend), Vec::new()),
            Err(e) => (
                None,
                vec![ConfigIssue::error(
                    "memory.backend",
                    format!("{} (valid: in_memory, jsonl)", e),
                )],
            ),
        }
    }

    /// Directory of the jsonl backend.
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| crate::config::default_data_dir().join("memory"))
    }
}
