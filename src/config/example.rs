use crate::chat::{completions_url, ChatMessage, ChatRequest};
use anyhow::{Context, Result};
use derive_builder::Builder;

pub const DEFAULT_MODEL: &str = "cortecs/Llama-3.3-70B-Instruct-FP8-Dynamic";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
pub const DEFAULT_PROMPT: &str = "How many rs in strawberry?";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Settings of a single chat-completion call made by the example.
#[derive(Builder, Clone, Debug)]
pub struct ExampleConfig {
    /// Deployment URL, without the API route
    #[builder(setter(into))]
    pub deployment_url: String,
    /// API key sent as a bearer token
    #[builder(setter(into))]
    pub api_key: String,
    #[builder(setter(into), default = "DEFAULT_MODEL.to_string()")]
    pub model_id: String,
    #[builder(setter(into), default = "DEFAULT_SYSTEM_PROMPT.to_string()")]
    pub system_prompt: String,
    #[builder(setter(into), default = "DEFAULT_PROMPT.to_string()")]
    pub prompt: String,
    #[builder(default = "DEFAULT_TEMPERATURE")]
    pub temperature: f64,
    #[builder(default = "DEFAULT_MAX_TOKENS")]
    pub max_tokens: u32,
    /// Ask for a streamed answer and print it as it arrives
    #[builder(default = "true")]
    pub stream: bool,
}

impl ExampleConfig {
    pub fn builder() -> ExampleConfigBuilder {
        ExampleConfigBuilder::default()
    }

    pub fn url(&self) -> String {
        completions_url(&self.deployment_url)
    }

    pub fn chat_request(&self) -> Result<ChatRequest> {
        ChatRequest::builder()
            .model(self.model_id.as_str())
            .messages(vec![
                ChatMessage::system(&self.system_prompt),
                ChatMessage::user(&self.prompt),
            ])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .stream(self.stream)
            .build()
            .context("Failed to build chat request")
    }
}
