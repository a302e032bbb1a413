//! [`GenerationGateway`] over an OpenAI-compatible HTTP API.

use super::sse::{SseFrame, SseLineBuffer};
use super::types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ModelList, PromptStyle,
    build_messages,
};
use async_trait::async_trait;
use futures::StreamExt;
use roundtable_application::{
    BackendStatus, GatewayError, GenerationGateway, GenerationRequest, StreamHandle,
};
use roundtable_domain::{StreamEvent, truncate};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Connection and sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiCompatConfig {
    /// Up to and including the version segment, e.g. `http://localhost:8000/v1`.
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub prompt_style: PromptStyle,
    pub connect_timeout: Duration,
}

impl Default for OpenAiCompatConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/v1".to_string(),
            model: "default".to_string(),
            api_key: None,
            max_tokens: 512,
            temperature: 0.7,
            top_p: 0.9,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            prompt_style: PromptStyle::Chat,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

pub struct OpenAiCompatGateway {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatGateway {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiCompatConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn body(&self, request: &GenerationRequest, stream: bool) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: build_messages(request, self.config.prompt_style),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            frequency_penalty: self.config.frequency_penalty,
            presence_penalty: self.config.presence_penalty,
            stream,
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) if !key.is_empty() => builder.bearer_auth(key),
            _ => builder,
        }
    }

    /// POST a completion request, mapping transport and HTTP failures.
    async fn post(
        &self,
        request: &GenerationRequest,
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let body = self.body(request, stream);
        debug!(
            model = %self.config.model,
            messages = body.messages.len(),
            stream,
            "Sending chat completion request"
        );
        let response = self
            .authorize(self.client.post(self.endpoint("chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;
        check_status(response).await
    }
}

#[async_trait]
impl GenerationGateway for OpenAiCompatGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        let response = self.post(request, false).await?;
        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        completion
            .text()
            .ok_or_else(|| GatewayError::MalformedResponse("no choices in response".to_string()))
    }

    async fn generate_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let response = self.post(request, true).await?;
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut lines = SseLineBuffer::new();
            let mut text = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                for frame in lines.push(&chunk) {
                    match relay_frame(frame, &mut text, &tx).await {
                        Relay::Continue => {}
                        Relay::Finished | Relay::ReceiverGone => return,
                    }
                }
            }

            if let Some(frame) = lines.finish()
                && !matches!(relay_frame(frame, &mut text, &tx).await, Relay::Continue)
            {
                return;
            }
            let _ = tx
                .send(StreamEvent::Error(
                    "stream ended without a completion marker".to_string(),
                ))
                .await;
        });

        Ok(StreamHandle::new(rx))
    }

    async fn health_check(&self) -> Result<BackendStatus, GatewayError> {
        let response = self
            .authorize(self.client.get(self.endpoint("models")))
            .send()
            .await
            .map_err(map_transport_error)?;
        let models: ModelList = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        Ok(BackendStatus {
            backend: format!("openai-compatible at {}", self.config.base_url),
            models: models.data.into_iter().map(|m| m.id).collect(),
        })
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

enum Relay {
    Continue,
    Finished,
    ReceiverGone,
}

/// Forward one SSE frame to the stream receiver.
async fn relay_frame(
    frame: SseFrame,
    text: &mut String,
    tx: &mpsc::Sender<StreamEvent>,
) -> Relay {
    let data = match frame {
        SseFrame::Done => {
            let _ = tx.send(StreamEvent::Completed(std::mem::take(text))).await;
            return Relay::Finished;
        }
        SseFrame::Data(data) => data,
    };

    let chunk: ChatCompletionChunk = match serde_json::from_str(&data) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!("Aborting stream on unparseable chunk: {}", e);
            let _ = tx
                .send(StreamEvent::Error(format!("malformed stream chunk: {}", e)))
                .await;
            return Relay::Finished;
        }
    };
    if let Some(error) = chunk.error {
        let _ = tx.send(StreamEvent::Error(error.message)).await;
        return Relay::Finished;
    }
    if let Some(delta) = chunk.delta()
        && !delta.is_empty()
    {
        text.push_str(delta);
        if tx.send(StreamEvent::Delta(delta.to_string())).await.is_err() {
            return Relay::ReceiverGone;
        }
    }
    if chunk.is_finished() {
        let _ = tx.send(StreamEvent::Completed(std::mem::take(text))).await;
        return Relay::Finished;
    }
    Relay::Continue
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::RequestFailed(format!(
        "HTTP {}: {}",
        status,
        truncate(body.trim(), 300)
    )))
}
