//! Prompt templates for conversation turns

use crate::conversation::entities::{Conversation, Message};
use serde::{Deserialize, Serialize};

/// One line of the transcript shown to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub speaker: String,
    pub content: String,
}

impl TranscriptLine {
    pub fn new(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
        }
    }

    /// Transcript lines for the participant messages, system messages dropped.
    pub fn from_messages<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<Self> {
        messages
            .into_iter()
            .filter(|m| !m.is_system())
            .map(|m| Self::new(m.speaker.clone(), m.content.clone()))
            .collect()
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.speaker, self.content)
    }
}

/// Templates for the text sent to the generation backend
pub struct ConversationPromptTemplate;

impl ConversationPromptTemplate {
    /// Conversation-level instruction block shared by every speaker.
    pub fn instructions(conversation: &Conversation, roster: &[&str]) -> String {
        let topic = conversation.topic();
        format!(
            r#"You are a participant in a multi-party conversation.

Conversation:
- Topic: {topic}
- Turn: {budget}
- Participants: {participants}

Ground rules:
1. Stay focused on the topic "{topic}" and keep the discussion relevant.
2. Respond to what the other participants said without drifting off topic.
3. Go into depth rather than restating earlier points.
4. If the conversation has no turn limit, take your time; do not rush to a conclusion.
5. Do not keep repeating your own name.
6. Do not prefix your reply with your name (for example "Ada:").
7. Speak naturally, as yourself.

Read the conversation so far and give a reply that fits the topic."#,
            topic = topic,
            budget = conversation.turn_budget(),
            participants = roster.join(", "),
        )
    }

    /// Instruction block followed by the speaker's persona prompt.
    pub fn system_prompt(conversation: &Conversation, roster: &[&str], persona: &str) -> String {
        let instructions = Self::instructions(conversation, roster);
        if persona.trim().is_empty() {
            instructions
        } else {
            format!("{}\n\n{}", instructions, persona.trim())
        }
    }

    /// Closing cue telling the backend whose turn it is.
    pub fn turn_cue(speaker: &str) -> String {
        format!("It is now {}'s turn. Reply as {}.", speaker, speaker)
    }

    /// Single-message layout: instructions and transcript in one block.
    pub fn combined(system_prompt: &str, transcript: &[TranscriptLine], speaker: &str) -> String {
        let mut prompt = String::with_capacity(system_prompt.len() + 256);
        prompt.push_str(system_prompt);
        prompt.push_str("\n\n");
        for line in transcript {
            prompt.push_str(&line.render());
            prompt.push('\n');
        }
        prompt.push_str(&Self::turn_cue(speaker));
        prompt
    }

    pub fn started_notice(topic: &str) -> String {
        format!("Conversation started. Topic: {}", topic)
    }

    pub fn stopped_notice() -> &'static str {
        "Conversation stopped."
    }

    pub fn ended_notice() -> &'static str {
        "Conversation ended."
    }

    pub fn failure_notice(reason: &str) -> String {
        format!("Conversation halted after a failure: {}", reason)
    }
}
