use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Failed to read participants file {path}: {reason}")]
    ParticipantsFile { path: PathBuf, reason: String },

    #[error("Invalid participant configuration: {0}")]
    InvalidParticipant(String),
}
