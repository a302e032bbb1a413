//! Conversation archive configuration from TOML (`[archive]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileArchiveConfig {
    /// Keep a JSON snapshot of every conversation.
    pub enabled: bool,
    pub directory: Option<PathBuf>,
}

impl FileArchiveConfig {
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| crate::config::default_data_dir().join("conversations"))
    }
}
