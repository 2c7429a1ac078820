use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    GenerationSettings, Provider, build_http_client, classify_transport, decode_json, ensure_success, normalize_endpoint,
};
use crate::errors::ProviderError;

/// Client for a local Ollama server, using non-streaming `/api/generate`
#[derive(Debug)]
pub struct Ollama {
    base_url: String,
    client: Client,
    settings: GenerationSettings,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: SamplingOptions,
}

/// Subset of Ollama's model options the translator sets
#[derive(Debug, Serialize)]
struct SamplingOptions {
    temperature: f32,
    num_predict: u32,
}

impl<'a> GenerateBody<'a> {
    fn for_prompt(settings: &'a GenerationSettings, prompt: &'a str) -> Self {
        Self {
            model: &settings.model,
            prompt,
            stream: false,
            options: SamplingOptions {
                temperature: settings.temperature,
                num_predict: settings.max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done_reason: Option<String>,
}

impl Ollama {
    pub fn new(endpoint: &str, settings: GenerationSettings, timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = normalize_endpoint(endpoint)?;
        let client = build_http_client(timeout)?;
        Ok(Self { base_url, client, settings })
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = GenerateBody::for_prompt(&self.settings, prompt);

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let response = ensure_success(self.name(), response).await?;
        let reply: GenerateReply = decode_json(self.name(), response).await?;
        if let Some(reason) = &reply.done_reason {
            debug!("Ollama finished with reason '{}'", reason);
        }

        Ok(reply.response)
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
