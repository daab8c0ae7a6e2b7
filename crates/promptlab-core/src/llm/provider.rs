//! HTTP provider for the text-generation capability
//!
//! Speaks the OpenAI-compatible chat-completions wire format, which covers
//! the hosted backends the coach is deployed against.

use crate::llm::generator::{GenerationError, TextGenerator};
use crate::llm::messages::{Generation, GenerationRequest, TokenUsage};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP generator
#[derive(Debug, Clone)]
pub struct HttpGeneratorConfig {
    /// Chat-completions endpoint, e.g. `https://api.openai.com/v1/chat/completions`
    pub base_url: String,
    /// Bearer API key
    pub api_key: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Connection timeout for the underlying HTTP client
    pub connect_timeout: Duration,
}

impl HttpGeneratorConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// OpenAI-compatible HTTP implementation of [`TextGenerator`]
pub struct HttpTextGenerator {
    config: HttpGeneratorConfig,
    client: reqwest::Client,
}

impl HttpTextGenerator {
    /// Create a new HTTP generator
    pub fn new(config: HttpGeneratorConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GenerationError::Provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// The model this generator is configured for
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerationError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": request.messages,
            "max_tokens": request.options.max_tokens,
            "temperature": request.options.temperature,
        });

        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    GenerationError::Timeout(self.config.connect_timeout)
                } else {
                    GenerationError::Provider(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(GenerationError::RateLimited(format!(
                "{} from {}",
                status, self.config.base_url
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Provider(format!("{status}: {text}")));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Provider(format!("malformed completion: {e}")))?;

        let text = completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| GenerationError::Provider("completion had no choices".to_string()))?;

        debug!(model = %self.config.model, chars = text.len(), "generation completed");

        let mut generation = Generation::new(text);
        if let Some(model) = completion.model {
            generation = generation.with_model(model);
        }
        if let Some(usage) = completion.usage {
            generation = generation.with_usage(TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            });
        }
        Ok(generation)
    }
}
