//! Generation gateway port
//!
//! Defines the interface for asking a text-generation backend to produce
//! the next message of a conversation.

use async_trait::async_trait;
use roundtable_domain::{StreamEvent, TranscriptLine};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during generation gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Transport closed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

/// Everything a backend needs to produce one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Display name of the participant who speaks next.
    pub speaker: String,
    /// Instructions plus the speaker's persona.
    pub system_prompt: String,
    /// Recent participant messages, oldest first.
    pub transcript: Vec<TranscriptLine>,
}

impl GenerationRequest {
    pub fn new(
        speaker: impl Into<String>,
        system_prompt: impl Into<String>,
        transcript: Vec<TranscriptLine>,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            system_prompt: system_prompt.into(),
            transcript,
        }
    }
}

/// What a backend reports about itself on a health check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendStatus {
    pub backend: String,
    pub models: Vec<String>,
}

/// Handle for receiving streaming events from a backend.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Wrap an already complete text in a one-event stream.
    pub fn completed(text: String) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 and a fresh channel: this never waits.
        let _ = tx.try_send(StreamEvent::Completed(text));
        Self::new(rx)
    }

    /// Consume the stream and collect all text into a single string.
    ///
    /// A stream that closes without a `Completed` event is an error: the
    /// message would otherwise be silently truncated.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if text.is_empty() {
                        return Ok(full_text);
                    }
                    return Ok(text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        Err(GatewayError::TransportClosed)
    }
}

/// Gateway for text generation
///
/// This port defines how the application layer talks to a generation
/// backend. Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Produce the complete next message.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError>;

    /// Produce the next message as a stream of fragments.
    ///
    /// Default implementation calls `generate()` and wraps the result in a
    /// single `Completed` event.
    async fn generate_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let text = self.generate(request).await?;
        Ok(StreamHandle::completed(text))
    }

    /// Probe the backend without generating anything.
    async fn health_check(&self) -> Result<BackendStatus, GatewayError> {
        Ok(BackendStatus {
            backend: self.name().to_string(),
            models: Vec::new(),
        })
    }

    /// Short backend identifier for logs.
    fn name(&self) -> &str;
}
