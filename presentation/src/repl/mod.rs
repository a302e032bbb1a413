//! Interactive prompt for manual conversations

mod command;

pub use command::ReplCommand;

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use roundtable_application::{ConversationRegistry, ErrorKind};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Drives one manual conversation from slash commands.
///
/// Messages are printed by the live viewer; the prompt only reports
/// command results.
pub struct ConversationRepl {
    registry: ConversationRegistry,
    conversation_id: String,
}

impl ConversationRepl {
    pub fn new(registry: ConversationRegistry, conversation_id: impl Into<String>) -> Self {
        Self {
            registry,
            conversation_id: conversation_id.into(),
        }
    }

    /// Run until `/end`, `/quit`, EOF, or the conversation ends on its own.
    pub async fn run(&self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = dirs::data_dir().map(|p| p.join("roundtable").join("history.txt"));
        if let Some(path) = &history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        println!("{}\n", ReplCommand::help().dimmed());

        loop {
            if self.registry.get(&self.conversation_id).is_none() {
                break;
            }
            // readline blocks; keep the runtime's other workers going
            let line = tokio::task::block_in_place(|| rl.readline("roundtable> "));
            match line {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        let _ = rl.add_history_entry(line);
                    }
                    match ReplCommand::parse(line) {
                        Ok(command) => {
                            if self.execute(command).await {
                                break;
                            }
                        }
                        Err(message) => {
                            println!("{}", message.yellow());
                            println!("Type /help for available commands");
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    self.registry.end(&self.conversation_id).await;
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(path) = &history_path {
            let _ = rl.save_history(path);
        }
        Ok(())
    }

    /// Returns true when the prompt should exit.
    async fn execute(&self, command: ReplCommand) -> bool {
        let id = self.conversation_id.as_str();
        match command {
            ReplCommand::Continue => match self.registry.continue_conversation(id).await {
                Ok(true) => false,
                Ok(false) => {
                    println!("{}", "Turn limit reached, conversation ended.".dimmed());
                    true
                }
                Err(e) if e.kind() == ErrorKind::NotFound => true,
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    false
                }
            },
            ReplCommand::Stop => {
                if let Err(e) = self.registry.stop(id).await {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                }
                false
            }
            ReplCommand::End | ReplCommand::Quit => {
                self.registry.end(id).await;
                true
            }
            ReplCommand::Status => {
                match self.registry.get(id) {
                    Some(conversation) => {
                        println!("{}", ConsoleFormatter::conversation_line(&conversation))
                    }
                    None => println!("Conversation {} is gone", id),
                }
                false
            }
            ReplCommand::Turns(limit) => {
                match self.registry.set_turn_limit(id, limit).await {
                    Ok(conversation) => {
                        println!("Turns: {}", conversation.turn_budget())
                    }
                    Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
                }
                false
            }
            ReplCommand::Help => {
                println!("{}", ReplCommand::help());
                false
            }
        }
    }
}
