//! Live rendering of conversation events to the terminal

use crate::output::console::ConsoleFormatter;
use crate::progress::spinner::TurnSpinner;
use colored::Colorize;
use roundtable_application::Subscription;
use roundtable_domain::{Conversation, ConversationEvent, ConversationStatus, Message};
use std::io::Write;
use tokio::task::JoinHandle;

/// Turns events into terminal text.
///
/// Stream deltas carry the whole message so far; only the unseen suffix is
/// printed, and the final message then completes the line instead of
/// repeating it.
pub struct LiveView {
    conversation: Conversation,
    names: Vec<String>,
    spoken: usize,
    status: ConversationStatus,
    /// (turn number, bytes printed) of the message being streamed
    streaming: Option<(u32, usize)>,
}

impl LiveView {
    /// `names` are the display names in roster order.
    pub fn new(conversation: Conversation, names: Vec<String>) -> Self {
        Self {
            spoken: conversation.participant_message_count(),
            status: conversation.status(),
            conversation,
            names,
            streaming: None,
        }
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    /// Display name of whoever speaks next.
    pub fn next_speaker(&self) -> Option<&str> {
        if self.names.is_empty() {
            return None;
        }
        Some(self.names[self.spoken % self.names.len()].as_str())
    }

    pub fn render(&mut self, event: &ConversationEvent) -> String {
        match event {
            ConversationEvent::StreamDelta { message, .. } => self.render_delta(message),
            ConversationEvent::MessageAppended { message, .. } => self.render_message(message),
            ConversationEvent::StatusChanged { from, to, .. } => {
                self.status = *to;
                let mut text = self.close_stream();
                text.push_str(&format!(
                    "{}\n",
                    format!("-- {} -> {}", from, to).dimmed()
                ));
                if *to == ConversationStatus::Ended {
                    text.push('\n');
                }
                text
            }
        }
    }

    fn render_delta(&mut self, message: &Message) -> String {
        let mut text = String::new();
        let printed = match self.streaming {
            Some((turn, printed)) if turn == message.turn_number => printed,
            _ => {
                text.push_str(&self.close_stream());
                text.push_str(&ConsoleFormatter::speaker_label(&self.conversation, message));
                text.push_str("\n  ");
                0
            }
        };
        let suffix = message.content.get(printed..).unwrap_or_default();
        text.push_str(&suffix.replace('\n', "\n  "));
        self.streaming = Some((message.turn_number, message.content.len().max(printed)));
        text
    }

    fn render_message(&mut self, message: &Message) -> String {
        if !message.is_system() {
            self.spoken += 1;
        }
        match self.streaming.take() {
            Some((turn, printed)) if turn == message.turn_number && !message.is_system() => {
                let suffix = message.content.get(printed..).unwrap_or_default();
                format!("{}\n\n", suffix.replace('\n', "\n  "))
            }
            stale => {
                let mut text = if stale.is_some() { "\n".to_string() } else { String::new() };
                text.push_str(&ConsoleFormatter::message(&self.conversation, message));
                text.push('\n');
                text
            }
        }
    }

    /// Terminate a half-printed streamed message.
    fn close_stream(&mut self) -> String {
        match self.streaming.take() {
            Some(_) => "\n".to_string(),
            None => String::new(),
        }
    }
}

/// Prints a conversation's events until it ends or the subscription closes.
pub struct LiveViewer {
    view: LiveView,
    spinner: TurnSpinner,
}

impl LiveViewer {
    pub fn new(view: LiveView, show_progress: bool) -> Self {
        Self {
            view,
            spinner: TurnSpinner::new(show_progress),
        }
    }

    pub fn spawn(self, subscription: Subscription) -> JoinHandle<()> {
        tokio::spawn(self.run(subscription))
    }

    pub async fn run(mut self, mut subscription: Subscription) {
        self.update_spinner();
        while let Some(event) = subscription.recv().await {
            self.spinner.clear();
            let text = self.view.render(&event);
            print!("{}", text);
            let _ = std::io::stdout().flush();

            if self.view.status() == ConversationStatus::Ended {
                break;
            }
            if !matches!(event, ConversationEvent::StreamDelta { .. }) {
                self.update_spinner();
            }
        }
        self.spinner.clear();
    }

    fn update_spinner(&mut self) {
        if self.view.status() != ConversationStatus::Active {
            return;
        }
        if let Some(next) = self.view.next_speaker() {
            self.spinner.start(format!("{} is thinking...", next));
        }
    }
}
