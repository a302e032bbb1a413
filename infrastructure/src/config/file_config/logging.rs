//! Log output configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ```toml
/// [logging]
/// directory = "./logs"   # daily rolling roundtable.log
/// transcript = true      # JSONL transcript next to it
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub directory: Option<PathBuf>,
    pub transcript: bool,
}

impl FileLoggingConfig {
    /// Where the transcript goes: the log directory, or the data directory.
    pub fn transcript_directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| crate::config::default_data_dir().join("transcripts"))
    }
}
