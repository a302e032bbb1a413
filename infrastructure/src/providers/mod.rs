//! Generation backends

pub mod openai;

pub use openai::{OpenAiCompatConfig, OpenAiCompatGateway, PromptStyle};
