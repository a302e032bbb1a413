//! Generation backend configuration from TOML (`[generation]` section)

use crate::config::issue::ConfigIssue;
use crate::providers::{OpenAiCompatConfig, PromptStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Any OpenAI-compatible chat-completions endpoint.
///
/// # Example
///
/// ```toml
/// [generation]
/// base_url = "http://localhost:8000/v1"
/// model = "Qwen/Qwen2.5-7B-Instruct"
/// api_key_env = "OPENAI_API_KEY"
/// max_tokens = 512
/// temperature = 0.7
/// prompt_style = "combined"   # or "chat"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Direct API key (not recommended; use the env var instead).
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub prompt_style: String,
    pub connect_timeout_secs: u64,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let defaults = OpenAiCompatConfig::default();
        Self {
            base_url: defaults.base_url,
            model: defaults.model,
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            top_p: defaults.top_p,
            frequency_penalty: defaults.frequency_penalty,
            presence_penalty: defaults.presence_penalty,
            prompt_style: "chat".to_string(),
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
        }
    }
}

impl FileGenerationConfig {
    /// The direct key wins over the environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty()))
    }

    pub fn parse_prompt_style(&self) -> (PromptStyle, Vec<ConfigIssue>) {
        match self.prompt_style.parse() {
            Ok(style) => (style, Vec::new()),
            Err(e) => (
                PromptStyle::default(),
                vec![ConfigIssue::warning(
                    "generation.prompt_style",
                    format!("{}, falling back to 'chat'", e),
                )],
            ),
        }
    }

    pub fn to_gateway_config(&self) -> (OpenAiCompatConfig, Vec<ConfigIssue>) {
        let (prompt_style, issues) = self.parse_prompt_style();
        let config = OpenAiCompatConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key: self.resolve_api_key(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            frequency_penalty: self.frequency_penalty,
            presence_penalty: self.presence_penalty,
            prompt_style,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
        };
        (config, issues)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_prompt_style().1;
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            issues.push(ConfigIssue::error(
                "generation.base_url",
                format!("'{}' is not an http(s) URL", self.base_url),
            ));
        }
        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::error("generation.model", "model name cannot be empty"));
        }
        if self.max_tokens == 0 {
            issues.push(ConfigIssue::error("generation.max_tokens", "must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::warning(
                "generation.temperature",
                format!("{} is outside the usual range 0.0-2.0", self.temperature),
            ));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            issues.push(ConfigIssue::warning(
                "generation.top_p",
                format!("{} is outside the range (0.0, 1.0]", self.top_p),
            ));
        }
        for (field, value) in [
            ("generation.frequency_penalty", self.frequency_penalty),
            ("generation.presence_penalty", self.presence_penalty),
        ] {
            if !(-2.0..=2.0).contains(&value) {
                issues.push(ConfigIssue::warning(
                    field,
                    format!("{} is outside the range -2.0-2.0", value),
                ));
            }
        }
        issues
    }
}
