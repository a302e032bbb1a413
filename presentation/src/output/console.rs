//! Console output formatting for conversations

use colored::{Color, Colorize};
use roundtable_domain::{Conversation, ConversationStatus, Message, Participant};

/// Colours cycled across participants by roster position.
const SPEAKER_COLORS: [Color; 6] = [
    Color::Yellow,
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Blue,
    Color::BrightRed,
];

/// Formats conversations, messages and catalogs for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn speaker_color(conversation: &Conversation, participant_id: Option<&str>) -> Color {
        participant_id
            .and_then(|id| conversation.participant_ids().iter().position(|p| p == id))
            .map(|i| SPEAKER_COLORS[i % SPEAKER_COLORS.len()])
            .unwrap_or(Color::White)
    }

    /// `[3] Ada:` in the speaker's colour, or a dimmed system marker.
    pub fn speaker_label(conversation: &Conversation, message: &Message) -> String {
        if message.is_system() {
            return format!("[{}] --", message.turn_number).dimmed().to_string();
        }
        let color = Self::speaker_color(conversation, message.participant_id.as_deref());
        format!("[{}] {}:", message.turn_number, message.speaker)
            .color(color)
            .bold()
            .to_string()
    }

    /// One complete message.
    pub fn message(conversation: &Conversation, message: &Message) -> String {
        if message.is_system() {
            return format!(
                "{} {}",
                Self::speaker_label(conversation, message),
                message.content.dimmed().italic()
            );
        }
        format!(
            "{}\n{}\n",
            Self::speaker_label(conversation, message),
            Self::indent(&message.content, "  ")
        )
    }

    pub fn status(status: ConversationStatus) -> String {
        let label = status.as_str();
        match status {
            ConversationStatus::Active => label.green().bold().to_string(),
            ConversationStatus::Idle => label.cyan().to_string(),
            ConversationStatus::Stopped => label.yellow().to_string(),
            ConversationStatus::Ended => label.dimmed().to_string(),
            ConversationStatus::Error => label.red().bold().to_string(),
        }
    }

    pub fn header(conversation: &Conversation, roster: &[&Participant]) -> String {
        let mut output = String::new();
        output.push_str(&Self::rule());
        output.push('\n');
        let title = conversation.title().unwrap_or(conversation.topic());
        output.push_str(&format!("{:^60}\n", title.bold()));
        output.push_str(&Self::rule());
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Topic:".cyan().bold(), conversation.topic()));
        let names: Vec<String> = roster
            .iter()
            .map(|p| {
                p.name()
                    .color(Self::speaker_color(conversation, Some(p.id())))
                    .to_string()
            })
            .collect();
        output.push_str(&format!("{} {}\n", "Seated:".cyan().bold(), names.join(", ")));
        let limit = if conversation.is_unlimited() {
            "unlimited".to_string()
        } else {
            conversation.turn_limit().to_string()
        };
        output.push_str(&format!("{} {}\n", "Turns:".cyan().bold(), limit));
        output
    }

    /// Closing summary after a conversation ended.
    pub fn summary(conversation: &Conversation) -> String {
        format!(
            "\n{}\n{} {}  {} {}  {} {}\n",
            Self::rule(),
            "Status:".cyan().bold(),
            Self::status(conversation.status()),
            "Turns:".cyan().bold(),
            conversation.turn_budget(),
            "Messages:".cyan().bold(),
            conversation.messages().len()
        )
    }

    /// One line per conversation: id, status, turn budget, topic.
    pub fn conversation_line(conversation: &Conversation) -> String {
        format!(
            "{}  {:<8} {:>14}  {}",
            conversation.id().bold(),
            Self::status(conversation.status()),
            conversation.turn_budget(),
            conversation.title().unwrap_or(conversation.topic())
        )
    }

    pub fn participants(participants: &[&Participant]) -> String {
        let mut output = format!("{}\n", "Available participants:".cyan().bold());
        for participant in participants {
            let mut line = format!("  {:<14} {}", participant.id().bold(), participant.name());
            if let Some(description) = participant.description() {
                line.push_str(&format!(" - {}", description.dimmed()));
            }
            if !participant.is_active() {
                line.push_str(&format!(" {}", "(inactive)".yellow()));
            }
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    fn rule() -> String {
        "=".repeat(60).cyan().to_string()
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
