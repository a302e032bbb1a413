//! Presentation layer for roundtable
//!
//! This crate contains the CLI definition, console formatting, the live
//! event viewer and the interactive prompt for manual conversations.

pub mod cli;
pub mod output;
pub mod progress;
pub mod repl;
pub mod viewer;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use output::console::ConsoleFormatter;
pub use progress::spinner::TurnSpinner;
pub use repl::{ConversationRepl, ReplCommand};
pub use viewer::{LiveView, LiveViewer};
