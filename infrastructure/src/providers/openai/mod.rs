//! OpenAI-compatible chat-completions backend (vLLM, Ollama, llama.cpp
//! server, hosted OpenAI, ...).

mod gateway;
mod sse;
mod types;

pub use gateway::{OpenAiCompatConfig, OpenAiCompatGateway};
pub use sse::{SseFrame, SseLineBuffer};
pub use types::{PromptStyle, build_messages};
