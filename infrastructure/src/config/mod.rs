//! Configuration file loading for roundtable
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. Environment: `ROUNDTABLE_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./roundtable.toml` or `./.roundtable.toml`
//! 4. Global: `~/.config/roundtable/config.toml`
//! 5. Default values

mod error;
mod file_config;
mod issue;
mod loader;

pub use error::ConfigError;
pub use file_config::{
    FileArchiveConfig, FileBroadcastConfig, FileConfig, FileConversationConfig,
    FileGenerationConfig, FileLoggingConfig, FileMemoryConfig, FileParticipantConfig,
    MemoryBackend,
};
pub use issue::{ConfigIssue, Severity};
pub use loader::ConfigLoader;

use std::path::PathBuf;

/// `<platform data dir>/roundtable`, e.g. `~/.local/share/roundtable`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roundtable")
}
