//! Memory store entities

use crate::conversation::entities::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Importance assigned when nothing better is known.
pub const DEFAULT_IMPORTANCE: f32 = 0.5;

/// A message as remembered by the memory store (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    pub message: Message,
    /// Free-form context (topic, speaker metadata, ...)
    #[serde(default)]
    pub context: BTreeMap<String, serde_json::Value>,
    /// Always within `[0, 1]`
    pub importance: f32,
    pub created_at: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(conversation_id: impl Into<String>, message: Message) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            participant_id: message.participant_id.clone(),
            message,
            context: BTreeMap::new(),
            importance: DEFAULT_IMPORTANCE,
            created_at: Utc::now(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Set the importance score, clamped to `[0, 1]`.
    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = if importance.is_nan() {
            DEFAULT_IMPORTANCE
        } else {
            importance.clamp(0.0, 1.0)
        };
        self
    }

    /// Case-insensitive match of any keyword against the message content.
    ///
    /// `keywords` must already be lowercase.
    pub fn matches_any(&self, keywords: &[String]) -> bool {
        let content = self.message.content.to_lowercase();
        keywords.iter().any(|k| content.contains(k.as_str()))
    }
}
