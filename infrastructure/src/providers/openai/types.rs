//! Wire types of the chat-completions API and prompt layout.

use roundtable_application::GenerationRequest;
use roundtable_domain::ConversationPromptTemplate;
use serde::{Deserialize, Serialize};

/// How a [`GenerationRequest`] is laid out as chat messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    /// System message, one user message per transcript line, then the turn cue.
    #[default]
    Chat,
    /// Everything in a single user message. Some vLLM chat templates reject
    /// system messages or consecutive user messages.
    Combined,
}

impl std::str::FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(PromptStyle::Chat),
            "combined" | "vllm" => Ok(PromptStyle::Combined),
            other => Err(format!("unknown prompt style '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Lay out a generation request in the given style.
pub fn build_messages(request: &GenerationRequest, style: PromptStyle) -> Vec<ChatMessage> {
    match style {
        PromptStyle::Chat => {
            let mut messages = Vec::with_capacity(request.transcript.len() + 2);
            if !request.system_prompt.is_empty() {
                messages.push(ChatMessage::system(request.system_prompt.clone()));
            }
            messages.extend(
                request
                    .transcript
                    .iter()
                    .map(|line| ChatMessage::user(line.render())),
            );
            messages.push(ChatMessage::user(ConversationPromptTemplate::turn_cue(
                &request.speaker,
            )));
            messages
        }
        PromptStyle::Combined => vec![ChatMessage::user(ConversationPromptTemplate::combined(
            &request.system_prompt,
            &request.transcript,
            &request.speaker,
        ))],
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    pub fn text(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// One `data:` payload of a streamed completion.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl ChatCompletionChunk {
    pub fn delta(&self) -> Option<&str> {
        self.choices.first()?.delta.content.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.choices.iter().any(|c| c.finish_reason.is_some())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}
