use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    GenerationSettings, Provider, build_http_client, classify_transport, decode_json, ensure_success, normalize_endpoint,
};
use crate::errors::ProviderError;

const API_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API
pub struct Anthropic {
    client: Client,
    api_key: String,
    endpoint: String,
    settings: GenerationSettings,
}

impl std::fmt::Debug for Anthropic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anthropic")
            .field("endpoint", &self.endpoint)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Body of a `/v1/messages` call carrying one user turn
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [UserTurn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> MessagesRequest<'a> {
    fn for_prompt(settings: &'a GenerationSettings, prompt: &'a str) -> Self {
        Self {
            model: &settings.model,
            max_tokens: settings.max_output_tokens,
            temperature: settings.temperature,
            messages: [UserTurn { role: "user", content: prompt }],
        }
    }
}

/// Messages API answer; only the parts the translator reads
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

impl Anthropic {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: &str,
        settings: GenerationSettings,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ProviderError::Configuration(
                "No Anthropic API key configured (set ANTHROPIC_API_KEY)".to_string(),
            ));
        }

        Ok(Self {
            endpoint: normalize_endpoint(endpoint)?,
            client: build_http_client(timeout)?,
            api_key,
            settings,
        })
    }

    /// Concatenate the text blocks of an answer, skipping tool and thinking blocks
    pub fn extract_text_from_response(response: &AnthropicResponse) -> String {
        let mut text = String::new();
        for block in response.content.iter().filter(|block| block.kind == "text") {
            text.push_str(&block.text);
        }
        text
    }
}

#[async_trait]
impl Provider for Anthropic {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = MessagesRequest::for_prompt(&self.settings, prompt);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let response = ensure_success(self.name(), response).await?;
        let answer: AnthropicResponse = decode_json(self.name(), response).await?;

        if answer.stop_reason.as_deref() == Some("max_tokens") {
            warn!("Anthropic stopped at max_tokens; the chunk may be cut short");
        }

        Ok(Self::extract_text_from_response(&answer))
    }

    fn name(&self) -> &str {
        "Anthropic"
    }
}
