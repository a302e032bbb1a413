//! Conversation snapshot archive.

mod json_file;

pub use json_file::JsonFileConversationArchive;
