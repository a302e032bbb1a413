//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod archive;
pub mod config;
mod file_names;
pub mod logging;
pub mod memory;
pub mod participants;
pub mod providers;

// Re-export commonly used types
pub use archive::JsonFileConversationArchive;
pub use config::{ConfigError, ConfigIssue, ConfigLoader, FileConfig, MemoryBackend, Severity};
pub use logging::JsonlTranscriptLogger;
pub use memory::{InMemoryMemoryStore, JsonlMemoryStore};
pub use participants::build_participant_registry;
pub use providers::{OpenAiCompatConfig, OpenAiCompatGateway, PromptStyle};
