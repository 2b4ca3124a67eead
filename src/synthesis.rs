//! Answer-synthesis boundary.
//!
//! [`Synthesizer`] is the narrow interface the retrieval service uses to
//! turn a system instruction plus user prompt into answer text.
//! [`OpenAiSynthesizer`] calls the chat completions API with a fixed low
//! temperature and bounded output length; there is no streaming.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SynthesisConfig;
use crate::error::{DocketError, Result};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Single-completion text generation.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, system: &str, user: &str) -> Result<String>;
}

/// Synthesis client for the OpenAI chat completions API.
pub struct OpenAiSynthesizer {
    model: String,
    temperature: f64,
    max_tokens: u32,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiSynthesizer {
    /// Build a client from configuration, reading `OPENAI_API_KEY` from the
    /// environment.
    pub fn new(config: &SynthesisConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| DocketError::Config("OPENAI_API_KEY not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocketError::SynthesisUnavailable(e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key,
            client,
        })
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl Synthesizer for OpenAiSynthesizer {
    async fn synthesize(&self, system: &str, user: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DocketError::SynthesisUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(DocketError::SynthesisUnavailable(format!(
                "API error {}: {}",
                status, body_text
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DocketError::SynthesisUnavailable(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DocketError::SynthesisUnavailable("empty completion".to_string()))
    }
}
